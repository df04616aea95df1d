use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use renewdesk::dates;
use renewdesk::error::AppError;
use renewdesk::renewals::{
    import_policies, import_renewals, DispatchError, EngineError, InstallmentPolicy, LicensePlate,
    MessageDispatcher, NotifyStatus, PhoneNumber, RenewalRecord, RenewalStore, StoreError,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryRenewalStore {
    renewals: Mutex<HashMap<LicensePlate, RenewalRecord>>,
    policies: Mutex<HashMap<LicensePlate, InstallmentPolicy>>,
}

impl RenewalStore for InMemoryRenewalStore {
    fn insert_renewal(&self, record: RenewalRecord) -> Result<RenewalRecord, StoreError> {
        let mut guard = self.renewals.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.plate) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.plate.clone(), record.clone());
        Ok(record)
    }

    fn update_renewal(&self, record: RenewalRecord) -> Result<(), StoreError> {
        let mut guard = self.renewals.lock().expect("store mutex poisoned");
        if !guard.contains_key(&record.plate) {
            return Err(StoreError::NotFound);
        }
        guard.insert(record.plate.clone(), record);
        Ok(())
    }

    fn fetch_renewal(&self, plate: &LicensePlate) -> Result<Option<RenewalRecord>, StoreError> {
        let guard = self.renewals.lock().expect("store mutex poisoned");
        Ok(guard.get(plate).cloned())
    }

    fn renewals(&self) -> Result<Vec<RenewalRecord>, StoreError> {
        let guard = self.renewals.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn mark_renewal_notified(&self, plate: &LicensePlate) -> Result<bool, StoreError> {
        let mut guard = self.renewals.lock().expect("store mutex poisoned");
        let record = guard.get_mut(plate).ok_or(StoreError::NotFound)?;
        if record.notify_status.is_notified() {
            return Ok(false);
        }
        record.notify_status = NotifyStatus::Notified;
        Ok(true)
    }

    fn insert_policy(&self, policy: InstallmentPolicy) -> Result<InstallmentPolicy, StoreError> {
        let mut guard = self.policies.lock().expect("store mutex poisoned");
        if guard.contains_key(&policy.plate) {
            return Err(StoreError::Conflict);
        }
        guard.insert(policy.plate.clone(), policy.clone());
        Ok(policy)
    }

    fn update_policy(&self, policy: InstallmentPolicy) -> Result<(), StoreError> {
        let mut guard = self.policies.lock().expect("store mutex poisoned");
        if !guard.contains_key(&policy.plate) {
            return Err(StoreError::NotFound);
        }
        guard.insert(policy.plate.clone(), policy);
        Ok(())
    }

    fn fetch_policy(&self, plate: &LicensePlate) -> Result<Option<InstallmentPolicy>, StoreError> {
        let guard = self.policies.lock().expect("store mutex poisoned");
        Ok(guard.get(plate).cloned())
    }

    fn policies(&self) -> Result<Vec<InstallmentPolicy>, StoreError> {
        let guard = self.policies.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn mark_policy_notified(&self, plate: &LicensePlate) -> Result<bool, StoreError> {
        let mut guard = self.policies.lock().expect("store mutex poisoned");
        let policy = guard.get_mut(plate).ok_or(StoreError::NotFound)?;
        if policy.notify_status.is_notified() {
            return Ok(false);
        }
        policy.notify_status = NotifyStatus::Notified;
        Ok(true)
    }
}

/// Outbound channel used by the HTTP service. Until the shop wires a real
/// SMS/LINE gateway the message is written to the service log, which keeps
/// the send-then-flag ordering observable in production traces.
#[derive(Default, Clone)]
pub(crate) struct LoggingDispatcher;

impl MessageDispatcher for LoggingDispatcher {
    fn send(&self, recipient: &PhoneNumber, message: &str) -> Result<(), DispatchError> {
        tracing::info!(%recipient, message, "reminder dispatched");
        Ok(())
    }
}

pub(crate) fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    dates::parse_date(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as DD/MM/YYYY or YYYY-MM-DD"))
}

/// Load sheet exports into the store. Returns (customers, policies) counts.
pub(crate) fn seed_from_sheets(
    store: &InMemoryRenewalStore,
    customers: Option<&Path>,
    policies: Option<&Path>,
) -> Result<(usize, usize), AppError> {
    let mut customer_count = 0;
    if let Some(path) = customers {
        let file = std::fs::File::open(path)?;
        for record in import_renewals(file)? {
            store.insert_renewal(record).map_err(EngineError::from)?;
            customer_count += 1;
        }
    }

    let mut policy_count = 0;
    if let Some(path) = policies {
        let file = std::fs::File::open(path)?;
        for policy in import_policies(file)? {
            store.insert_policy(policy).map_err(EngineError::from)?;
            policy_count += 1;
        }
    }

    Ok((customer_count, policy_count))
}
