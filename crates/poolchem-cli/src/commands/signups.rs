use chrono::Utc;
use poolchem_core::error::PoolChemError;
use poolchem_core::store::SignupStore;
use poolchem_core::training::TrainingSignupDraft;

use super::Context;
use crate::output;

pub async fn signup(
    ctx: &Context,
    name: String,
    email: String,
    market: String,
    session: String,
) -> Result<(), PoolChemError> {
    let draft = TrainingSignupDraft {
        name: Some(name),
        email: Some(email),
        market: Some(market),
        session: Some(session),
    };
    let signup = draft.validate(Utc::now())?;
    let id = ctx.store()?.add_signup(signup.clone()).await?;
    tracing::info!(id = %id, session = %signup.session, "recorded training signup");

    println!("Signed up {} for {} ({})", signup.name, signup.session, id);
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<(), PoolChemError> {
    let signups = ctx.store()?.list_signups().await?;
    if ctx.json() {
        output::json::print(&signups)
    } else {
        output::table::print_signups(&signups);
        Ok(())
    }
}
