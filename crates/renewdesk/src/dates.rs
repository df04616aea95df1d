//! Calendar helpers shared by the classifier and the installment schedule.
//!
//! Shop records arrive with dates in whatever shape the keying-in tool of the
//! day produced: `15/01/2024`, `2024-01-15`, or a full ISO datetime. Everything
//! is normalized to a [`NaiveDate`] here so day arithmetic can never be skewed
//! by a stray time-of-day or timezone component.

use chrono::{Datelike, Months, NaiveDate};

/// Parse a raw date string from a record.
///
/// Recognised encodings: `DD/MM/YYYY`, `YYYY-MM-DD`, and ISO-8601 datetimes
/// (only the date portion is kept). Anything else, including calendar-invalid
/// values like `2024-13-40`, yields `None`. Callers must treat `None` as
/// "cannot classify" — an unreadable date never defaults to due-now or
/// never-due.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((date_part, _)) = trimmed.split_once('T') {
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }

    if trimmed.contains('/') {
        return NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok();
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Signed whole-day count `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Step forward by calendar months, clamping to the last valid day of the
/// target month (Jan 31 + 1 month lands on Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// One calendar year later, same month and day where that day exists.
/// Feb 29 registrations clamp to Feb 28 in common years.
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    add_months(date, years.saturating_mul(12))
}

/// Number of days in the month that `date` falls in.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    match add_months(first, 1).and_then(|next| next.pred_opt()) {
        Some(last) => last.day(),
        None => 31,
    }
}

/// Boundary display format used everywhere a date reaches a person: `DD/MM/YYYY`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
