//! Notification engine: batch selection, dispatch, and ledger write-back.

pub mod filter;
pub mod message;

#[cfg(test)]
mod tests;

pub use filter::{
    select_for_notification, select_policies, select_renewals, Notification, NotificationKind,
    NotifyLedger,
};

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::renewals::classifier::{self, NotifyWindow};
use crate::renewals::dispatch::MessageDispatcher;
use crate::renewals::domain::{
    DomainError, InstallmentPolicy, InstallmentStatus, LicensePlate, NewPolicy, NewRenewal,
    NotifyStatus, RenewalRecord, RenewalStatus,
};
use crate::renewals::report::{self, RenewalOverview};
use crate::renewals::store::{RenewalStore, StoreError};

/// Engine composing the record store, the selection filter, and the outbound
/// dispatcher. One instance serves both the HTTP surface and scheduled runs.
pub struct NotificationEngine<S, D> {
    store: Arc<S>,
    dispatcher: Arc<D>,
    window: NotifyWindow,
}

impl<S, D> NotificationEngine<S, D>
where
    S: RenewalStore + 'static,
    D: MessageDispatcher + 'static,
{
    pub fn new(store: Arc<S>, dispatcher: Arc<D>, window: NotifyWindow) -> Self {
        Self {
            store,
            dispatcher,
            window,
        }
    }

    pub fn window(&self) -> &NotifyWindow {
        &self.window
    }

    /// Customer intake. The stored status starts out derived from the
    /// register date so the record lands in the right bucket immediately.
    pub fn register_customer(
        &self,
        intake: NewRenewal,
        today: NaiveDate,
    ) -> Result<RenewalRecord, EngineError> {
        let mut record = intake.into_record(RenewalStatus::Pending)?;
        if let Some(classified) = classifier::classify(&record, today, &self.window) {
            record.status = classified.bucket.status();
        }
        Ok(self.store.insert_renewal(record)?)
    }

    /// Fetch one renewal record by plate.
    pub fn lookup(&self, plate: &LicensePlate) -> Result<Option<RenewalRecord>, EngineError> {
        Ok(self.store.fetch_renewal(plate)?)
    }

    /// Record that the customer renewed: the new period starts at
    /// `renewed_on`, and the notified flag resets so the next period gets
    /// its own reminder.
    pub fn record_renewal(
        &self,
        plate: &LicensePlate,
        renewed_on: NaiveDate,
    ) -> Result<RenewalRecord, EngineError> {
        let mut record = self
            .store
            .fetch_renewal(plate)?
            .ok_or(StoreError::NotFound)?;
        record.register_date = dates::format_display(renewed_on);
        record.status = RenewalStatus::Renewed;
        record.notify_status = NotifyStatus::Pending;
        self.store.update_renewal(record.clone())?;
        Ok(record)
    }

    /// Finance a new installment plan for a plate.
    pub fn register_policy(&self, intake: NewPolicy) -> Result<InstallmentPolicy, EngineError> {
        let policy = intake.into_policy()?;
        Ok(self.store.insert_policy(policy)?)
    }

    /// Record an installment payment. The payment log is authoritative:
    /// `current_installment` and the plan status are recomputed from it, and
    /// the notified flag resets because the payment closes the reminded-for
    /// cycle.
    pub fn record_installment_payment(
        &self,
        plate: &LicensePlate,
        installment: u32,
        paid_on: NaiveDate,
    ) -> Result<InstallmentPolicy, EngineError> {
        let mut policy = self
            .store
            .fetch_policy(plate)?
            .ok_or(StoreError::NotFound)?;
        if installment < 1 || installment > policy.installment_count {
            return Err(EngineError::Domain(DomainError::InstallmentOutOfRange {
                installment,
                count: policy.installment_count,
            }));
        }
        policy
            .paid_dates
            .insert(installment, dates::format_display(paid_on));
        policy.current_installment = policy.paid_count();
        policy.status = if policy.is_fully_paid() {
            InstallmentStatus::Completed
        } else {
            InstallmentStatus::InProgress
        };
        policy.notify_status = NotifyStatus::Pending;
        self.store.update_policy(policy.clone())?;
        Ok(policy)
    }

    /// Due-list overview over both collections, without side effects.
    pub fn overview(&self, today: NaiveDate) -> Result<RenewalOverview, EngineError> {
        let records = self.store.renewals()?;
        let policies = self.store.policies()?;
        Ok(report::build_overview(
            &records, &policies, today, &self.window,
        ))
    }

    /// One batch pass: snapshot both collections, refresh drifted renewal
    /// statuses, select who must be reminded, dispatch, and flag each record
    /// only after its send succeeded.
    ///
    /// Dispatch failures are logged and counted, never retried within the
    /// run; the unflagged record comes back on the next pass. A conditional
    /// flag write that reports the flag was already set (a concurrent run
    /// got there first) counts the record as already notified rather than
    /// sent.
    pub fn run(&self, today: NaiveDate) -> Result<NotifyRunReport, EngineError> {
        let mut records = self.store.renewals()?;
        let policies = self.store.policies()?;

        let mut reclassified = 0usize;
        for record in &mut records {
            let Some(classified) = classifier::classify(record, today, &self.window) else {
                continue;
            };
            let derived = classified.bucket.status();
            if record.status != derived {
                record.status = derived;
                self.store.update_renewal(record.clone())?;
                reclassified += 1;
            }
        }

        let renewal_ledger: NotifyLedger = records
            .iter()
            .map(|record| (record.plate.clone(), record.notify_status))
            .collect();
        let policy_ledger: NotifyLedger = policies
            .iter()
            .map(|policy| (policy.plate.clone(), policy.notify_status))
            .collect();

        let selected = filter::select_for_notification(
            &records,
            &policies,
            &renewal_ledger,
            &policy_ledger,
            today,
            &self.window,
        );

        let mut outcome = NotifyRunReport {
            today,
            scanned: records.len() + policies.len(),
            reclassified,
            selected: selected.len(),
            sent: 0,
            already_notified: 0,
            failed: 0,
            notifications: Vec::new(),
        };

        for notification in selected {
            match self
                .dispatcher
                .send(&notification.phone, &notification.message)
            {
                Ok(()) => {
                    let flagged = match notification.kind {
                        NotificationKind::TaxRenewal => {
                            self.store.mark_renewal_notified(&notification.plate)?
                        }
                        NotificationKind::InstallmentDue | NotificationKind::PolicyExpiry => {
                            self.store.mark_policy_notified(&notification.plate)?
                        }
                    };
                    if flagged {
                        outcome.sent += 1;
                        outcome.notifications.push(notification);
                    } else {
                        outcome.already_notified += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        plate = %notification.plate,
                        error = %err,
                        "dispatch failed; record stays eligible for the next run"
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}

/// Outcome of one batch pass.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyRunReport {
    pub today: NaiveDate,
    pub scanned: usize,
    pub reclassified: usize,
    pub selected: usize,
    pub sent: usize,
    pub already_notified: usize,
    pub failed: usize,
    pub notifications: Vec<Notification>,
}

/// Error raised by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
