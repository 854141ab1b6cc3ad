//! Offline aggregation over the activity table. Pure functions over fetched
//! rows; the terminal rendering lives in [`tui`].

pub mod tui;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::db::models::StoredSegment;
use crate::segmenter::{program_name, IDLE_IDENTITY};

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Aggregate usage view. Idle stretches are kept out of the per-program
/// buckets and surfaced as a single total instead.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    /// Active seconds per program, descending.
    pub by_program: Vec<(String, f64)>,
    /// Active seconds per hour of day the segment started in.
    pub by_hour: [f64; 24],
    /// Active seconds per weekday, Monday first.
    pub by_weekday: [f64; 7],
    /// Active seconds per calendar date, ascending.
    pub by_date: Vec<(NaiveDate, f64)>,
    /// Segment count per program, descending.
    pub frequency: Vec<(String, u64)>,
    pub active_secs: f64,
    pub idle_secs: f64,
}

pub fn build_report(rows: &[StoredSegment]) -> UsageReport {
    let mut programs: BTreeMap<String, f64> = BTreeMap::new();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut report = UsageReport::default();

    for row in rows {
        if row.exe.as_deref() == Some(IDLE_IDENTITY) {
            report.idle_secs += row.active_time;
            continue;
        }

        let program = display_program(row);
        report.active_secs += row.active_time;
        *programs.entry(program.clone()).or_default() += row.active_time;
        *counts.entry(program).or_default() += 1;

        report.by_hour[row.start_time.hour() as usize] += row.active_time;
        report.by_weekday[row.start_date.weekday().num_days_from_monday() as usize] +=
            row.active_time;
        *by_date.entry(row.start_date).or_default() += row.active_time;
    }

    report.by_program = programs.into_iter().collect();
    report.by_program.sort_by(|a, b| b.1.total_cmp(&a.1));

    report.frequency = counts.into_iter().collect();
    report.frequency.sort_by(|a, b| b.1.cmp(&a.1));

    report.by_date = by_date.into_iter().collect();
    report
}

/// Rows from before the program_name column existed derive it from the title.
fn display_program(row: &StoredSegment) -> String {
    match &row.program_name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => program_name(&row.title),
    }
}
