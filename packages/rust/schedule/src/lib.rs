//! Reading-plan lookup: which passage is scheduled for a given day.
//!
//! The plan is a row-oriented table with a `Date` and a `Reference` column.
//! [`ReferenceSource`] abstracts where the rows come from; [`SheetsClient`]
//! reads them from a Google spreadsheet, [`StaticSchedule`] holds them in
//! memory.

mod auth;
mod sheets;

use std::future::Future;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use dailybread_shared::{DailyReference, Result};

pub use auth::ServiceAccountKey;
pub use sheets::{SheetsClient, rows_from_values};

/// Date layouts accepted in the `Date` column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y.%m.%d", "%Y. %m. %d"];

// ---------------------------------------------------------------------------
// Rows and sources
// ---------------------------------------------------------------------------

/// One raw schedule row, before date parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    /// Contents of the `Date` cell.
    pub date: String,
    /// Contents of the `Reference` cell.
    pub reference: String,
}

impl ScheduleRow {
    pub fn new(date: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            reference: reference.into(),
        }
    }
}

/// Anything that can produce the ordered rows of the reading plan.
///
/// Errors are transport/auth failures only; an empty plan is `Ok(vec![])`.
pub trait ReferenceSource: Send + Sync {
    fn rows(&self) -> impl Future<Output = Result<Vec<ScheduleRow>>> + Send;
}

/// A reading plan held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSchedule {
    rows: Vec<ScheduleRow>,
}

impl StaticSchedule {
    pub fn new(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }
}

impl ReferenceSource for StaticSchedule {
    async fn rows(&self) -> Result<Vec<ScheduleRow>> {
        Ok(self.rows.clone())
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Fetch the plan from `source` and return the reading for `date`, if any.
#[instrument(skip_all, fields(%date))]
pub async fn resolve_reference<S: ReferenceSource>(
    source: &S,
    date: NaiveDate,
) -> Result<Option<DailyReference>> {
    let rows = source.rows().await?;
    debug!(rows = rows.len(), "reading plan loaded");

    let found = find_reference(&rows, date);
    match &found {
        Some(daily) => info!(reference = %daily.reference, "found today's reading"),
        None => debug!("no row matches the date"),
    }
    Ok(found)
}

/// Return the first row scheduled for `date`.
///
/// Rows with an unparseable date or an empty reference are skipped.
pub fn find_reference(rows: &[ScheduleRow], date: NaiveDate) -> Option<DailyReference> {
    rows.iter().find_map(|row| {
        let row_date = match parse_schedule_date(&row.date) {
            Some(d) => d,
            None => {
                if !row.date.trim().is_empty() {
                    debug!(cell = %row.date, "skipping row with unparseable date");
                }
                return None;
            }
        };

        let reference = row.reference.trim();
        if row_date != date || reference.is_empty() {
            return None;
        }

        Some(DailyReference {
            date: row_date,
            reference: reference.to_string(),
        })
    })
}

/// Parse a `Date` cell in any of the accepted layouts.
pub fn parse_schedule_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim().trim_end_matches('.');
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}
