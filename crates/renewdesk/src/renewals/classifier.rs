//! Tax-expiry classification.
//!
//! A registration is valid for one year; everything here is a pure function
//! of the stored register date, today's date, and the notify window dials, so
//! the same record always lands in the same bucket for a given day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::renewals::domain::{RenewalRecord, RenewalStatus};

/// Tunable day-window dials for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyWindow {
    /// Records expiring within this many days count as "due soon".
    pub due_soon_days: i64,
    /// Installment policies whose next due day is within this many days get
    /// an expiry notice.
    pub installment_expiry_days: i64,
    /// Length of one registration validity period.
    pub validity_months: u32,
}

impl Default for NotifyWindow {
    fn default() -> Self {
        Self {
            due_soon_days: 90,
            installment_expiry_days: 5,
            validity_months: 12,
        }
    }
}

/// Where a record sits relative to its expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalBucket {
    DueSoon,
    Overdue,
    NotDue,
}

impl RenewalBucket {
    /// Stored status this bucket maps to. Not-due records read as already
    /// renewed for the current period.
    pub const fn status(self) -> RenewalStatus {
        match self {
            Self::DueSoon => RenewalStatus::DueSoon,
            Self::Overdue => RenewalStatus::Overdue,
            Self::NotDue => RenewalStatus::Renewed,
        }
    }
}

/// Classification outcome for one record on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub bucket: RenewalBucket,
}

/// Expiry date of the period starting at `register`, clamped to the last day
/// of the target month when the day has no counterpart there.
pub fn expiry_date(register: NaiveDate, window: &NotifyWindow) -> Option<NaiveDate> {
    dates::add_months(register, window.validity_months)
}

/// Bucket for a signed day count. Day zero is still "due soon": the customer
/// can renew up to and including the expiry day itself.
pub fn bucket_for(days_remaining: i64, window: &NotifyWindow) -> RenewalBucket {
    if days_remaining < 0 {
        RenewalBucket::Overdue
    } else if days_remaining <= window.due_soon_days {
        RenewalBucket::DueSoon
    } else {
        RenewalBucket::NotDue
    }
}

/// Classify one stored record against `today`. Returns `None` when the
/// stored register date cannot be read; the caller decides what an
/// unclassifiable record becomes.
pub fn classify(
    record: &RenewalRecord,
    today: NaiveDate,
    window: &NotifyWindow,
) -> Option<Classification> {
    let register = record.register_date()?;
    let expiry = expiry_date(register, window)?;
    let days_remaining = dates::days_between(today, expiry);
    Some(Classification {
        expiry_date: expiry,
        days_remaining,
        bucket: bucket_for(days_remaining, window),
    })
}
