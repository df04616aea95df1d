use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Natural key shared by the renewal and installment collections.
///
/// Plates are stored whitespace-free and ASCII-uppercased so that
/// `กข 1234`, `กข1234`, and `kx 1234`/`KX1234` style entries compare equal
/// no matter which clerk keyed them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LicensePlate(String);

impl LicensePlate {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized: String = raw.split_whitespace().collect::<String>().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::EmptyPlate);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicensePlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contactable phone number, derived from the raw stored string.
///
/// A record with a phone that does not pass this predicate is silently
/// excluded from notification — the shop fixes the number, the engine never
/// guesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strips common separators (`-`, space, `.`, parentheses, a leading `+`)
    /// and accepts the rest only when it is all digits, 6–15 of them, and not
    /// a string of zeros.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let mut digits = String::with_capacity(trimmed.len());
        for ch in trimmed.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                '-' | ' ' | '.' | '(' | ')' => continue,
                _ => return None,
            }
        }

        if digits.len() < 6 || digits.len() > 15 {
            return None;
        }
        if digits.bytes().all(|b| b == b'0') {
            return None;
        }
        Some(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored renewal status. The Thai strings are the canonical values written
/// to and filtered in the record store; the enum only names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenewalStatus {
    #[serde(rename = "รอดำเนินการ")]
    Pending,
    #[serde(rename = "กำลังจะครบกำหนด")]
    DueSoon,
    #[serde(rename = "เกินกำหนด")]
    Overdue,
    #[serde(rename = "ต่อภาษีแล้ว")]
    Renewed,
}

impl RenewalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "รอดำเนินการ",
            Self::DueSoon => "กำลังจะครบกำหนด",
            Self::Overdue => "เกินกำหนด",
            Self::Renewed => "ต่อภาษีแล้ว",
        }
    }
}

/// Per-record "already notified" ledger value. Written only after a dispatch
/// succeeded; cleared whenever the record's register date changes, because a
/// new validity period starts a new notification cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyStatus {
    #[default]
    #[serde(rename = "")]
    Pending,
    #[serde(rename = "แจ้งแล้ว")]
    Notified,
}

impl NotifyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "",
            Self::Notified => "แจ้งแล้ว",
        }
    }

    pub const fn is_notified(self) -> bool {
        matches!(self, Self::Notified)
    }
}

/// Installment plan progress status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    #[serde(rename = "กำลังผ่อน")]
    InProgress,
    #[serde(rename = "ผ่อนครบแล้ว")]
    Completed,
}

impl InstallmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "กำลังผ่อน",
            Self::Completed => "ผ่อนครบแล้ว",
        }
    }
}

/// One customer's tax-renewal record.
///
/// `register_date` stays in its raw stored encoding; accessors apply the
/// normalization predicates so every consumer shares one reading of a messy
/// field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalRecord {
    pub plate: LicensePlate,
    pub customer_name: String,
    pub phone: String,
    pub register_date: String,
    pub status: RenewalStatus,
    #[serde(default)]
    pub notify_status: NotifyStatus,
}

impl RenewalRecord {
    pub fn contact_phone(&self) -> Option<PhoneNumber> {
        PhoneNumber::parse(&self.phone)
    }

    pub fn register_date(&self) -> Option<NaiveDate> {
        dates::parse_date(&self.register_date)
    }
}

/// An installment-financed insurance policy, one active plan per plate.
///
/// `paid_dates` (installment number → raw payment date) is the authoritative
/// payment log; `current_installment` is kept for sheet compatibility and is
/// recomputed from the log on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPolicy {
    pub plate: LicensePlate,
    pub insurance_company: String,
    pub premium: u32,
    pub installment_count: u32,
    pub current_installment: u32,
    pub start_date: String,
    pub payment_day: u32,
    #[serde(default)]
    pub paid_dates: BTreeMap<u32, String>,
    pub status: InstallmentStatus,
    #[serde(default)]
    pub notify_status: NotifyStatus,
}

impl InstallmentPolicy {
    pub fn start_date(&self) -> Option<NaiveDate> {
        dates::parse_date(&self.start_date)
    }

    pub fn paid_count(&self) -> u32 {
        self.paid_dates.len() as u32
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_count() >= self.installment_count
    }
}

/// Intake payload for a new renewal customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRenewal {
    pub plate: String,
    pub customer_name: String,
    pub phone: String,
    pub register_date: String,
}

impl NewRenewal {
    /// Validate and normalize into a storable record. Unlike bulk import,
    /// intake is strict: a plate, a contactable phone, and a readable date
    /// are all required up front.
    pub fn into_record(self, status: RenewalStatus) -> Result<RenewalRecord, DomainError> {
        let plate = LicensePlate::parse(&self.plate)?;
        if PhoneNumber::parse(&self.phone).is_none() {
            return Err(DomainError::InvalidPhone(self.phone));
        }
        if dates::parse_date(&self.register_date).is_none() {
            return Err(DomainError::UnparseableDate(self.register_date));
        }
        Ok(RenewalRecord {
            plate,
            customer_name: self.customer_name,
            phone: self.phone,
            register_date: self.register_date,
            status,
            notify_status: NotifyStatus::default(),
        })
    }
}

/// Intake payload for a newly financed installment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPolicy {
    pub plate: String,
    pub insurance_company: String,
    pub premium: u32,
    pub installment_count: u32,
    pub start_date: String,
    pub payment_day: u32,
}

impl NewPolicy {
    pub fn into_policy(self) -> Result<InstallmentPolicy, DomainError> {
        let plate = LicensePlate::parse(&self.plate)?;
        if self.installment_count == 0 {
            return Err(DomainError::ZeroInstallments);
        }
        if !(1..=31).contains(&self.payment_day) {
            return Err(DomainError::PaymentDayOutOfRange(self.payment_day));
        }
        if dates::parse_date(&self.start_date).is_none() {
            return Err(DomainError::UnparseableDate(self.start_date));
        }
        Ok(InstallmentPolicy {
            plate,
            insurance_company: self.insurance_company,
            premium: self.premium,
            installment_count: self.installment_count,
            current_installment: 0,
            start_date: self.start_date,
            payment_day: self.payment_day,
            paid_dates: BTreeMap::new(),
            status: InstallmentStatus::InProgress,
            notify_status: NotifyStatus::default(),
        })
    }
}

/// Validation failures for record intake and lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("license plate must not be empty")]
    EmptyPlate,
    #[error("phone number '{0}' is not contactable")]
    InvalidPhone(String),
    #[error("unrecognised date '{0}'")]
    UnparseableDate(String),
    #[error("payment day must be between 1 and 31, got {0}")]
    PaymentDayOutOfRange(u32),
    #[error("installment plan needs at least one installment")]
    ZeroInstallments,
    #[error("installment {installment} is outside the {count}-installment plan")]
    InstallmentOutOfRange { installment: u32, count: u32 },
}
