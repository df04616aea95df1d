//! Due-list reporting for the shop counter.
//!
//! Read-only views over both collections. Every entry carries the raw enum
//! value and the display label next to each other so templates and JSON
//! consumers never re-derive Thai strings.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::renewals::classifier::{self, NotifyWindow, RenewalBucket};
use crate::renewals::domain::{
    InstallmentPolicy, InstallmentStatus, LicensePlate, RenewalRecord, RenewalStatus,
};
use crate::renewals::installment;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BucketCounts {
    pub due_soon: usize,
    pub overdue: usize,
    pub not_due: usize,
    pub unclassifiable: usize,
}

/// One renewal record that needs attention (due soon or overdue).
#[derive(Debug, Clone, Serialize)]
pub struct DueListEntry {
    pub plate: LicensePlate,
    pub customer_name: String,
    pub phone: String,
    pub contactable: bool,
    pub expiry_date: NaiveDate,
    pub expiry_display: String,
    pub days_remaining: i64,
    pub status: RenewalStatus,
    pub status_label: &'static str,
    pub notified: bool,
}

/// One installment plan on the watch list.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyDueEntry {
    pub plate: LicensePlate,
    pub insurance_company: String,
    pub installment_count: u32,
    pub paid_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_installment: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_expiry: Option<i64>,
    pub status: InstallmentStatus,
    pub status_label: &'static str,
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenewalOverview {
    pub today: NaiveDate,
    pub today_display: String,
    pub renewal_total: usize,
    pub policy_total: usize,
    pub buckets: BucketCounts,
    pub due_list: Vec<DueListEntry>,
    pub policy_watch: Vec<PolicyDueEntry>,
}

/// Build the counter overview: bucket tallies, the urgency-sorted due list,
/// and the installment watch list. Pure over the given snapshot and day.
pub fn build_overview(
    records: &[RenewalRecord],
    policies: &[InstallmentPolicy],
    today: NaiveDate,
    window: &NotifyWindow,
) -> RenewalOverview {
    let mut buckets = BucketCounts::default();
    let mut due_list = Vec::new();

    for record in records {
        match classifier::classify(record, today, window) {
            None => buckets.unclassifiable += 1,
            Some(classified) => {
                match classified.bucket {
                    RenewalBucket::DueSoon => buckets.due_soon += 1,
                    RenewalBucket::Overdue => buckets.overdue += 1,
                    RenewalBucket::NotDue => buckets.not_due += 1,
                }
                if classified.bucket != RenewalBucket::NotDue {
                    let status = classified.bucket.status();
                    due_list.push(DueListEntry {
                        plate: record.plate.clone(),
                        customer_name: record.customer_name.clone(),
                        phone: record.phone.clone(),
                        contactable: record.contact_phone().is_some(),
                        expiry_date: classified.expiry_date,
                        expiry_display: dates::format_display(classified.expiry_date),
                        days_remaining: classified.days_remaining,
                        status,
                        status_label: status.label(),
                        notified: record.notify_status.is_notified(),
                    });
                }
            }
        }
    }
    due_list.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.plate.cmp(&b.plate))
    });

    let mut policy_watch = Vec::new();
    for policy in policies {
        let expiry = installment::policy_expiry(policy);
        let days_to_expiry = expiry.map(|date| dates::days_between(today, date));
        // Completed plans only appear while their expiry is close by; the
        // watch list is a counter display, not the notification filter.
        let near_expiry = days_to_expiry
            .map(|days| days.abs() <= window.installment_expiry_days)
            .unwrap_or(false);
        if policy.status == InstallmentStatus::Completed && !near_expiry {
            continue;
        }
        let next_installment =
            (1..=policy.installment_count).find(|n| !policy.paid_dates.contains_key(n));
        policy_watch.push(PolicyDueEntry {
            plate: policy.plate.clone(),
            insurance_company: policy.insurance_company.clone(),
            installment_count: policy.installment_count,
            paid_count: policy.paid_count(),
            next_installment,
            expiry_date: expiry,
            expiry_display: expiry.map(dates::format_display),
            days_to_expiry,
            status: policy.status,
            status_label: policy.status.label(),
            notified: policy.notify_status.is_notified(),
        });
    }
    policy_watch.sort_by(|a, b| {
        a.days_to_expiry
            .unwrap_or(i64::MAX)
            .cmp(&b.days_to_expiry.unwrap_or(i64::MAX))
            .then_with(|| a.plate.cmp(&b.plate))
    });

    RenewalOverview {
        today,
        today_display: dates::format_display(today),
        renewal_total: records.len(),
        policy_total: policies.len(),
        buckets,
        due_list,
        policy_watch,
    }
}
