//! Chart series over recent symptom history.

use crate::symptom::SymptomRecord;

/// Number of most recent records the dashboard looks at.
pub const HISTORY_WINDOW: usize = 14;

fn project(history: &[SymptomRecord], f: impl Fn(&SymptomRecord) -> u8) -> Vec<u8> {
    let mut series: Vec<u8> = history.iter().take(HISTORY_WINDOW).map(f).collect();
    series.reverse();
    series
}

/// Pain levels oldest first. `history` is most-recent-first, as returned by
/// the stores.
pub fn pain_series(history: &[SymptomRecord]) -> Vec<u8> {
    project(history, |r| r.pain_level)
}

/// Appetite levels oldest first.
pub fn appetite_series(history: &[SymptomRecord]) -> Vec<u8> {
    project(history, |r| r.appetite_level)
}

/// Normalise a series into `0.0..=1.0` for drawing.
///
/// The scale always spans at least `0..=1`, so a series of zeros sits on the
/// baseline instead of dividing by zero.
pub fn sparkline(values: &[u8]) -> Vec<f64> {
    let max = f64::from(values.iter().copied().max().unwrap_or(0).max(1));
    values.iter().map(|&v| f64::from(v) / max).collect()
}
