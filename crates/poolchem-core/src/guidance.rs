//! Match readings against a pool's rule table.
//!
//! Value keys double as measurement buckets:
//! - `"7.2-7.6"` covers `7.2 <= v < 7.6`
//! - `"<7.2"` covers `v < 7.2`
//! - `"7.8+"` covers `v >= 7.8`
//! - `"3"` covers exactly `v == 3`
//!
//! Keys in any other form are free labels and never match a reading.

use crate::model::{ConcernLevel, MeasurementType, MethodRules, RuleEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Range { low: Decimal, high: Decimal },
    Below(Decimal),
    AtLeast(Decimal),
    Exact(Decimal),
}

impl Bucket {
    /// Parse a value key. `None` for keys that are not numeric buckets.
    pub fn parse(key: &str) -> Option<Bucket> {
        let key = key.trim();

        if let Some(rest) = key.strip_prefix('<') {
            return parse_decimal(rest).map(Bucket::Below);
        }

        if let Some(rest) = key.strip_suffix('+') {
            return parse_decimal(rest).map(Bucket::AtLeast);
        }

        if let Some((low, high)) = key.split_once('-') {
            let low = parse_decimal(low)?;
            let high = parse_decimal(high)?;
            if low >= high {
                return None;
            }
            return Some(Bucket::Range { low, high });
        }

        parse_decimal(key).map(Bucket::Exact)
    }

    pub fn contains(&self, value: Decimal) -> bool {
        match *self {
            Bucket::Range { low, high } => value >= low && value < high,
            Bucket::Below(limit) => value < limit,
            Bucket::AtLeast(limit) => value >= limit,
            Bucket::Exact(v) => value == v,
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s.replace(',', ".")).ok()
}

/// The rule that applies to one reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub measurement: MeasurementType,
    pub value: Decimal,
    pub value_key: String,
    pub entry: RuleEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub ph: Option<Guidance>,
    pub cl: Option<Guidance>,
    /// Worst concern level across both readings.
    pub concern: ConcernLevel,
}

/// Find the rule whose bucket contains `value`. When buckets overlap the
/// first matching key in key order wins.
pub fn lookup(rules: &MethodRules, measurement: MeasurementType, value: Decimal) -> Option<Guidance> {
    rules
        .get(measurement)
        .iter()
        .find(|(key, _)| Bucket::parse(key).is_some_and(|b| b.contains(value)))
        .map(|(key, entry)| Guidance {
            measurement,
            value,
            value_key: key.clone(),
            entry: entry.clone(),
        })
}

/// Look up both readings and combine their concern levels.
pub fn assess(rules: &MethodRules, ph: Decimal, cl: Decimal) -> Assessment {
    let ph = lookup(rules, MeasurementType::Ph, ph);
    let cl = lookup(rules, MeasurementType::Cl, cl);
    let concern = [ph.as_ref(), cl.as_ref()]
        .into_iter()
        .flatten()
        .map(|g| g.entry.concern_level)
        .max()
        .unwrap_or_default();
    Assessment { ph, cl, concern }
}
