//! Installment due-day detection.
//!
//! Works out whether today is the day a plan's next unpaid installment falls
//! due, with the payment day sliding to the end of months too short to hold
//! it, and when the whole policy's coverage runs out.

use chrono::{Datelike, NaiveDate};

use crate::dates;
use crate::renewals::domain::{InstallmentPolicy, InstallmentStatus};

/// True when `today` is the schedule's payment day. A payment day the month
/// cannot hold (31 in April, 29+ in February) falls on the month's last day.
pub fn is_payment_day(payment_day: u32, today: NaiveDate) -> bool {
    let month_len = dates::days_in_month(today);
    today.day() == payment_day || (today.day() == month_len && payment_day > month_len)
}

/// Installment number the schedule expects to be collected this month,
/// 1-based. Zero or negative means the plan has not started yet.
pub fn expected_installment(start: NaiveDate, today: NaiveDate) -> i64 {
    let mut months_elapsed = (i64::from(today.year()) - i64::from(start.year())) * 12
        + (i64::from(today.month()) - i64::from(start.month()));
    if today.day() < start.day() {
        months_elapsed -= 1;
    }
    months_elapsed + 1
}

/// The installment due for collection today, if any.
///
/// Some(k) iff the plan is still in progress, today is the payment day, the
/// schedule puts installment `k` in this month, `k` is within the plan, and
/// no payment for `k` has been recorded. Completed plans and plans whose
/// expected installment runs past `installment_count` never signal.
pub fn due_installment(policy: &InstallmentPolicy, today: NaiveDate) -> Option<u32> {
    if policy.status != InstallmentStatus::InProgress {
        return None;
    }
    let start = policy.start_date()?;
    if !is_payment_day(policy.payment_day, today) {
        return None;
    }
    let expected = expected_installment(start, today);
    if expected < 1 || expected > i64::from(policy.installment_count) {
        return None;
    }
    let expected = expected as u32;
    if policy.paid_dates.contains_key(&expected) {
        return None;
    }
    Some(expected)
}

/// Date the plan's coverage runs out: start plus one month per installment,
/// clamped like any other month addition.
pub fn policy_expiry(policy: &InstallmentPolicy) -> Option<NaiveDate> {
    dates::add_months(policy.start_date()?, policy.installment_count)
}
