use crate::error::PoolChemError;
use crate::model::ConcernLevel;
use crate::store::SubmissionStore;
use crate::submissions::Submission;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

pub const CSV_HEADER: &[&str] = &[
    "id",
    "submitted_at",
    "staff",
    "market",
    "pool",
    "pool_number",
    "method",
    "ph",
    "chlorine",
    "concern",
    "notes",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilter {
    pub market: Option<String>,
    pub pool: Option<String>,
    /// Keep rows at or above this concern level.
    pub min_concern: Option<ConcernLevel>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SubmissionFilter {
    pub fn matches(&self, s: &Submission) -> bool {
        let eq = |want: &Option<String>, have: &str| {
            want.as_deref()
                .map_or(true, |w| w.trim().eq_ignore_ascii_case(have))
        };
        eq(&self.market, &s.market)
            && eq(&self.pool, &s.pool)
            && self.min_concern.map_or(true, |c| s.concern >= c)
            && self.from.map_or(true, |from| s.submitted_at >= from)
            && self.to.map_or(true, |to| s.submitted_at <= to)
    }
}

/// One page of filtered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Zero-based page index.
    pub index: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<&'a Submission>,
}

/// Supervisor view over all submissions, newest first.
#[derive(Debug, Clone)]
pub struct Dashboard {
    rows: Vec<Submission>,
    filter: SubmissionFilter,
    page_size: usize,
    page: usize,
}

impl Dashboard {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            filter: SubmissionFilter::default(),
            page_size: page_size.max(1),
            page: 0,
        }
    }

    /// Subscribe a shared dashboard to the store's live submission feed.
    pub fn live<S>(store: &S, page_size: usize) -> Result<Arc<RwLock<Dashboard>>, PoolChemError>
    where
        S: SubmissionStore + ?Sized,
    {
        let dashboard = Arc::new(RwLock::new(Dashboard::new(page_size)));
        let target = Arc::clone(&dashboard);
        store.subscribe_submissions(Box::new(move |rows| {
            target.write().apply_snapshot(rows.to_vec());
        }))?;
        Ok(dashboard)
    }

    /// Replace all rows with a fresh snapshot. The page is clamped to the
    /// new row count.
    pub fn apply_snapshot(&mut self, mut rows: Vec<Submission>) {
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        self.rows = rows;
        self.page = self.page.min(self.total_pages() - 1);
    }

    pub fn filter(&self) -> &SubmissionFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: SubmissionFilter) {
        self.filter = filter;
        self.page = 0;
    }

    pub fn filtered(&self) -> Vec<&Submission> {
        self.rows.iter().filter(|s| self.filter.matches(s)).collect()
    }

    /// Never zero: an empty result still shows one empty page.
    pub fn total_pages(&self) -> usize {
        let rows = self.filtered().len();
        rows.div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, index: usize) {
        self.page = index.min(self.total_pages() - 1);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn current_page(&self) -> Page<'_> {
        let filtered = self.filtered();
        let total_rows = filtered.len();
        let rows = filtered
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect();
        Page {
            index: self.page,
            total_pages: self.total_pages(),
            total_rows,
            rows,
        }
    }

    /// All filtered rows as CSV, header first.
    pub fn export_csv(&self) -> String {
        let mut out = CSV_HEADER.join(",");
        out.push('\n');
        for s in self.filtered() {
            let fields = [
                s.id.clone(),
                s.submitted_at.to_rfc3339(),
                s.staff.clone(),
                s.market.clone(),
                s.pool.clone(),
                (s.slot + 1).to_string(),
                s.method.as_str().to_string(),
                s.ph.to_string(),
                s.cl.to_string(),
                s.concern.as_str().to_string(),
                s.notes.clone().unwrap_or_default(),
            ];
            let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
