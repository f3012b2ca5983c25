use poolchem_core::editor::EditorController;
use poolchem_core::error::PoolChemError;
use poolchem_core::notify::TracingNotifier;
use poolchem_core::rules::{self, schema::PoolDocument};
use poolchem_core::store::PoolStore;
use std::path::Path;

use super::Context;
use crate::output;

pub async fn list(ctx: &Context) -> Result<(), PoolChemError> {
    let store = ctx.store()?;
    let mut pools = store.list().await?;
    pools.sort_by_key(|p| p.name.to_lowercase());

    if ctx.json() {
        output::json::print(&pools)
    } else {
        output::table::print_pool_list(&pools);
        Ok(())
    }
}

pub(crate) fn find<'a>(pools: &'a [PoolDocument], id: &str) -> Result<&'a PoolDocument, PoolChemError> {
    pools
        .iter()
        .find(|p| p.id == id)
        .or_else(|| pools.iter().find(|p| p.name.eq_ignore_ascii_case(id)))
        .ok_or_else(|| PoolChemError::PoolNotFound { id: id.to_string() })
}

pub async fn show(ctx: &Context, id: &str) -> Result<(), PoolChemError> {
    let pools = ctx.store()?.list().await?;
    let pool = find(&pools, id)?;

    if ctx.json() {
        output::json::print(pool)
    } else {
        output::table::print_pool(pool, &ctx.config.layout);
        Ok(())
    }
}

pub fn validate(path: &Path) -> Result<(), PoolChemError> {
    let doc = rules::load_document(path)?;
    println!(
        "Valid pool document: {} ({} pool(s), {} stored rule set(s))",
        doc.name,
        doc.num_pools,
        doc.rules.pools.len()
    );
    if doc.rules.pools.len() < doc.num_pools {
        println!(
            "  Note: pools {}-{} have no rules yet",
            doc.rules.pools.len() + 1,
            doc.num_pools
        );
    }
    Ok(())
}

pub async fn import(ctx: &Context, path: &Path, id: Option<String>) -> Result<(), PoolChemError> {
    let doc = rules::load_document(path)?;
    let key = id
        .or_else(|| Some(doc.id.clone()).filter(|id| !id.trim().is_empty()))
        .unwrap_or_else(|| doc.name.clone());

    let stored = ctx.store()?.save(&key, &doc).await?;
    tracing::info!(id = %stored, path = %path.display(), "imported pool document");
    println!("Imported '{}' as {}", doc.name, stored);
    Ok(())
}

/// Same path as the editor's add mode: defaults, then the reference pool's
/// rules, then the caller's overrides.
pub async fn create(
    ctx: &Context,
    name: &str,
    count: Option<usize>,
    markets: Vec<String>,
) -> Result<(), PoolChemError> {
    let mut editor = EditorController::new(ctx.store()?, TracingNotifier, &ctx.config);
    editor.start().await?;
    editor.enter_add_mode().await?;

    editor.set_name(name)?;
    if let Some(count) = count {
        editor.set_pool_count(count)?;
    }
    if !markets.is_empty() {
        let defaults: Vec<String> = editor.form().metadata.markets.iter().cloned().collect();
        for market in &defaults {
            editor.set_market(market, false)?;
        }
        for market in &markets {
            editor.set_market(market.trim(), true)?;
        }
    }

    let id = editor.save().await?;
    println!("Created pool '{}' as {}", name.trim(), id);
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, yes: bool) -> Result<(), PoolChemError> {
    if !yes {
        return Err(PoolChemError::Validation(format!(
            "refusing to delete '{id}' without --yes"
        )));
    }

    let mut editor = EditorController::new(ctx.store()?, TracingNotifier, &ctx.config);
    editor.start().await?;
    editor.select_pool(id)?;
    if !editor.request_delete() {
        return Err(PoolChemError::Validation(format!("'{id}' is not loaded")));
    }

    if !editor.confirm_delete().await? {
        return Err(PoolChemError::Store(format!("'{id}' was not deleted")));
    }
    println!("Deleted {id}");
    Ok(())
}
