use poolchem_core::error::PoolChemError;
use poolchem_core::rules::builtin;
use poolchem_core::store::PoolStore;

use super::Context;
use crate::output;

pub fn list() -> Result<(), PoolChemError> {
    println!("Bundled reference pools:\n");
    for name in builtin::PRESETS {
        let doc = builtin::load_preset(name)?;
        println!("  {:<12} {} ({} pool(s))", name, doc.name, doc.num_pools);
    }
    println!();
    println!("Install one with `poolchem presets install <name>` so new pools start from it.");
    Ok(())
}

pub fn explain(ctx: &Context, name: &str) -> Result<(), PoolChemError> {
    let doc = builtin::load_preset(name)?;
    if ctx.json() {
        return output::json::print(&doc);
    }

    println!("{}\n", doc.name);
    println!(
        "Readings fall into the bucket whose key contains them: 'a-b' covers a up to\n\
         but not including b, '<a' anything below a, 'a+' a and above.\n"
    );
    output::table::print_pool(&doc, &ctx.config.layout);
    Ok(())
}

pub async fn install(ctx: &Context, name: &str) -> Result<(), PoolChemError> {
    let doc = builtin::load_preset(name)?;
    let key = &ctx.config.editor.preset_pool_id;
    let id = ctx.store()?.save(key, &doc).await?;
    tracing::info!(preset = name, id = %id, "installed reference pool");
    println!("Installed '{}' as reference pool {}", doc.name, id);
    Ok(())
}
