use chrono::Utc;
use clap::Args;
use poolchem_core::error::PoolChemError;
use poolchem_core::model::{ConcernLevel, SanitationMethod};
use poolchem_core::store::{PoolStore, SubmissionStore};
use poolchem_core::submissions::dashboard::{Dashboard, SubmissionFilter};
use poolchem_core::submissions::{self, SubmissionDraft};
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::Context;
use crate::output;

/// A reading as given on the command line.
pub struct Reading {
    pub staff: String,
    pub market: String,
    pub pool: String,
    pub pool_number: usize,
    pub method: String,
    pub ph: Decimal,
    pub cl: Decimal,
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub market: Option<String>,

    /// Pool name
    #[arg(long)]
    pub pool: Option<String>,

    /// Only readings at or above this concern level (yellow or red)
    #[arg(long, value_name = "LEVEL")]
    pub min_concern: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> SubmissionFilter {
        SubmissionFilter {
            market: self.market.clone(),
            pool: self.pool.clone(),
            min_concern: self.min_concern.as_deref().map(ConcernLevel::from_str_loose),
            ..Default::default()
        }
    }
}

pub async fn submit(ctx: &Context, reading: Reading) -> Result<(), PoolChemError> {
    let method = SanitationMethod::from_str_loose(&reading.method).ok_or_else(|| {
        PoolChemError::Validation(format!(
            "unknown sanitation method '{}'. Use bleach or granular",
            reading.method
        ))
    })?;
    if reading.pool_number == 0 {
        return Err(PoolChemError::Validation("pool numbers start at 1".into()));
    }

    let draft = SubmissionDraft {
        staff: Some(reading.staff),
        market: Some(reading.market),
        pool: Some(reading.pool),
        slot: Some(reading.pool_number - 1),
        method: Some(method),
        ph: Some(reading.ph),
        cl: Some(reading.cl),
        notes: reading.notes,
    };

    let store = ctx.store()?;
    let pools = store.list().await?;
    let (submission, assessment) =
        submissions::record(store.as_ref(), &pools, &draft, Utc::now()).await?;

    if ctx.json() {
        output::json::print(&serde_json::json!({
            "submission": submission,
            "assessment": assessment,
        }))
    } else {
        output::table::print_assessment(&submission, &assessment);
        Ok(())
    }
}

async fn dashboard(ctx: &Context, filter: &FilterArgs) -> Result<Dashboard, PoolChemError> {
    let rows = ctx.store()?.list_submissions().await?;
    let mut dashboard = Dashboard::new(ctx.config.dashboard.page_size);
    dashboard.apply_snapshot(rows);
    dashboard.set_filter(filter.to_filter());
    Ok(dashboard)
}

pub async fn list(ctx: &Context, filter: FilterArgs, page: usize) -> Result<(), PoolChemError> {
    let mut dashboard = dashboard(ctx, &filter).await?;
    dashboard.set_page(page.saturating_sub(1));
    let page = dashboard.current_page();

    if ctx.json() {
        output::json::print(&page.rows)
    } else {
        output::table::print_submissions(&page);
        Ok(())
    }
}

pub async fn export(
    ctx: &Context,
    filter: FilterArgs,
    out: Option<PathBuf>,
) -> Result<(), PoolChemError> {
    let dashboard = dashboard(ctx, &filter).await?;
    let csv = dashboard.export_csv();

    match out {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            eprintln!(
                "Wrote {} reading(s) to {}",
                dashboard.filtered().len(),
                path.display()
            );
        }
        None => print!("{csv}"),
    }
    Ok(())
}
