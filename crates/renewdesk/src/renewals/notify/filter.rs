//! Notification selection.
//!
//! Pure functions from a snapshot of records plus an injected notified-flag
//! ledger to the list of reminders that must go out now. Nothing here reads
//! a clock or touches the store; the engine owns both sides of that.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::renewals::classifier::{self, NotifyWindow, RenewalBucket};
use crate::renewals::domain::{
    InstallmentPolicy, LicensePlate, NotifyStatus, PhoneNumber, RenewalRecord,
};
use crate::renewals::installment;

use super::message;

/// Per-plate "already notified" view, injected into the selection functions
/// instead of being read from hidden state. The store persists it; the
/// filter only consults it.
#[derive(Debug, Clone, Default)]
pub struct NotifyLedger {
    entries: BTreeMap<LicensePlate, NotifyStatus>,
}

impl NotifyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, plate: LicensePlate, status: NotifyStatus) {
        self.entries.insert(plate, status);
    }

    pub fn is_notified(&self, plate: &LicensePlate) -> bool {
        self.entries
            .get(plate)
            .copied()
            .unwrap_or_default()
            .is_notified()
    }
}

impl FromIterator<(LicensePlate, NotifyStatus)> for NotifyLedger {
    fn from_iter<I: IntoIterator<Item = (LicensePlate, NotifyStatus)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// What a reminder is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaxRenewal,
    InstallmentDue,
    PolicyExpiry,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TaxRenewal => "ต่อภาษี",
            Self::InstallmentDue => "ค่างวดประกัน",
            Self::PolicyExpiry => "ครบสัญญาประกัน",
        }
    }
}

/// One ready-to-send reminder: who, why, and the rendered text.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub plate: LicensePlate,
    pub phone: PhoneNumber,
    pub kind: NotificationKind,
    pub due_date: NaiveDate,
    pub days_remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment: Option<u32>,
    pub message: String,
}

/// Renewal records that must be reminded today: contactable, classifiable,
/// inside the due-soon window, and not yet flagged in the ledger. Sorted
/// most urgent first.
pub fn select_renewals(
    records: &[RenewalRecord],
    ledger: &NotifyLedger,
    today: NaiveDate,
    window: &NotifyWindow,
) -> Vec<Notification> {
    let mut selected = Vec::new();
    for record in records {
        let Some(phone) = record.contact_phone() else {
            continue;
        };
        let Some(classified) = classifier::classify(record, today, window) else {
            continue;
        };
        if classified.bucket != RenewalBucket::DueSoon {
            continue;
        }
        if ledger.is_notified(&record.plate) {
            continue;
        }
        selected.push(Notification {
            plate: record.plate.clone(),
            phone,
            kind: NotificationKind::TaxRenewal,
            due_date: classified.expiry_date,
            days_remaining: classified.days_remaining,
            installment: None,
            message: message::renewal_reminder(
                &record.plate,
                classified.expiry_date,
                classified.days_remaining,
            ),
        });
    }
    sort_by_urgency(&mut selected);
    selected
}

/// Installment policies that must be reminded today.
///
/// Two triggers, checked in order: the plan's coverage running out within
/// the expiry window (either side of the date), or an unpaid installment
/// falling due on today's payment day. Policies carry no phone of their own,
/// so contacts are joined from the renewal records by plate; a plate without
/// a contactable customer is skipped. The ledger gates both triggers — it is
/// cleared again when a payment is recorded, which is what lets next month's
/// due day fire.
pub fn select_policies(
    policies: &[InstallmentPolicy],
    contacts: &BTreeMap<LicensePlate, PhoneNumber>,
    ledger: &NotifyLedger,
    today: NaiveDate,
    window: &NotifyWindow,
) -> Vec<Notification> {
    let mut selected = Vec::new();
    for policy in policies {
        let Some(phone) = contacts.get(&policy.plate) else {
            continue;
        };
        if ledger.is_notified(&policy.plate) {
            continue;
        }

        if let Some(expiry) = installment::policy_expiry(policy) {
            let days_remaining = dates::days_between(today, expiry);
            if days_remaining <= window.installment_expiry_days {
                selected.push(Notification {
                    plate: policy.plate.clone(),
                    phone: phone.clone(),
                    kind: NotificationKind::PolicyExpiry,
                    due_date: expiry,
                    days_remaining,
                    installment: None,
                    message: message::policy_expiry_reminder(&policy.plate, expiry, days_remaining),
                });
                continue;
            }
        }

        if let Some(installment) = installment::due_installment(policy, today) {
            selected.push(Notification {
                plate: policy.plate.clone(),
                phone: phone.clone(),
                kind: NotificationKind::InstallmentDue,
                due_date: today,
                days_remaining: 0,
                installment: Some(installment),
                message: message::installment_due_reminder(
                    &policy.plate,
                    installment,
                    policy.installment_count,
                ),
            });
        }
    }
    sort_by_urgency(&mut selected);
    selected
}

/// Full selection pass over both collections, one combined urgency-sorted
/// list. Contact numbers for policies come from the renewal records.
pub fn select_for_notification(
    records: &[RenewalRecord],
    policies: &[InstallmentPolicy],
    renewal_ledger: &NotifyLedger,
    policy_ledger: &NotifyLedger,
    today: NaiveDate,
    window: &NotifyWindow,
) -> Vec<Notification> {
    let contacts: BTreeMap<LicensePlate, PhoneNumber> = records
        .iter()
        .filter_map(|record| {
            record
                .contact_phone()
                .map(|phone| (record.plate.clone(), phone))
        })
        .collect();

    let mut selected = select_renewals(records, renewal_ledger, today, window);
    selected.extend(select_policies(
        policies,
        &contacts,
        policy_ledger,
        today,
        window,
    ));
    sort_by_urgency(&mut selected);
    selected
}

fn sort_by_urgency(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.plate.cmp(&b.plate))
    });
}
