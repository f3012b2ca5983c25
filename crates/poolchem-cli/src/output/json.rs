use poolchem_core::error::PoolChemError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), PoolChemError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
