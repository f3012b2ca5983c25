pub mod dashboard;

use crate::error::PoolChemError;
use crate::guidance::{self, Assessment};
use crate::model::{ConcernLevel, SanitationMethod};
use crate::rules::schema::PoolDocument;
use crate::store::SubmissionStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A reading as entered on the staff form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub staff: Option<String>,
    pub market: Option<String>,
    /// Pool document id or name.
    pub pool: Option<String>,
    pub slot: Option<usize>,
    pub method: Option<SanitationMethod>,
    pub ph: Option<Decimal>,
    pub cl: Option<Decimal>,
    pub notes: Option<String>,
}

/// A stored chemistry reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    pub staff: String,
    pub market: String,
    pub pool: String,
    pub slot: usize,
    pub method: SanitationMethod,
    pub ph: Decimal,
    pub cl: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub concern: ConcernLevel,
}

fn required(value: &Option<String>, field: &str) -> Result<String, PoolChemError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(PoolChemError::Validation(format!("{field} is required"))),
    }
}

impl SubmissionDraft {
    /// Check required fields and build a submission timestamped `at`.
    /// The concern level is filled in once the pool's rules are known.
    pub fn validate(&self, at: DateTime<Utc>) -> Result<Submission, PoolChemError> {
        let staff = required(&self.staff, "staff name")?;
        let market = required(&self.market, "market")?;
        let pool = required(&self.pool, "pool")?;
        let ph = self
            .ph
            .ok_or_else(|| PoolChemError::Validation("pH reading is required".into()))?;
        let cl = self
            .cl
            .ok_or_else(|| PoolChemError::Validation("chlorine reading is required".into()))?;

        if ph < Decimal::ZERO || ph > Decimal::from(14) {
            return Err(PoolChemError::Validation(format!(
                "pH reading {ph} is outside 0-14"
            )));
        }
        if cl < Decimal::ZERO {
            return Err(PoolChemError::Validation(format!(
                "chlorine reading {cl} is negative"
            )));
        }

        Ok(Submission {
            id: String::new(),
            submitted_at: at,
            staff,
            market,
            pool,
            slot: self.slot.unwrap_or(0),
            method: self.method.unwrap_or_default(),
            ph,
            cl,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            concern: ConcernLevel::None,
        })
    }
}

/// Validate a reading, grade it against its pool's rules and store it.
pub async fn record<S>(
    store: &S,
    pools: &[PoolDocument],
    draft: &SubmissionDraft,
    at: DateTime<Utc>,
) -> Result<(Submission, Assessment), PoolChemError>
where
    S: SubmissionStore + ?Sized,
{
    let mut submission = draft.validate(at)?;

    let pool = pools
        .iter()
        .find(|p| p.id == submission.pool || p.name == submission.pool)
        .ok_or_else(|| PoolChemError::PoolNotFound {
            id: submission.pool.clone(),
        })?;

    if submission.slot >= pool.num_pools {
        return Err(PoolChemError::Validation(format!(
            "{} has {} pool(s); pool {} does not exist",
            pool.name,
            pool.num_pools,
            submission.slot + 1
        )));
    }

    let rule_set = pool
        .rule_sets()
        .into_iter()
        .nth(submission.slot)
        .unwrap_or_default();
    let assessment = guidance::assess(
        rule_set.method(submission.method),
        submission.ph,
        submission.cl,
    );

    submission.pool = pool.name.clone();
    submission.concern = assessment.concern;
    submission.id = store.add_submission(submission.clone()).await?;

    tracing::info!(
        id = %submission.id,
        pool = %submission.pool,
        concern = %submission.concern,
        "recorded submission"
    );
    Ok((submission, assessment))
}
