//! Human-friendly date expressions for `--date`, `--start`, `--end`, `--since`.

use crate::error::{GranolaError, Result};
use chrono::{Duration, Local, NaiveDate};

/// Parse a date expression relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `today`, `yesterday`, `last week` (7 days ago) and
/// `last month` (30 days ago), case-insensitively.
pub fn parse_date(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let normalized = expr.trim().to_lowercase();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    match words.as_slice() {
        ["today"] => return Ok(today),
        ["yesterday"] => return Ok(today - Duration::days(1)),
        ["last", unit, ..] if unit.starts_with("week") => return Ok(today - Duration::days(7)),
        ["last", unit, ..] if unit.starts_with("month") => return Ok(today - Duration::days(30)),
        _ => {}
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").map_err(|_| {
        GranolaError::InvalidArgument(format!(
            "Cannot parse date '{}' (use YYYY-MM-DD, today, yesterday, last week, last month)",
            expr
        ))
    })
}

/// Parse against the local calendar date.
pub fn parse_date_local(expr: &str) -> Result<NaiveDate> {
    parse_date(expr, Local::now().date_naive())
}
