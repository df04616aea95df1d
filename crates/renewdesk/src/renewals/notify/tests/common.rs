use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::renewals::classifier::NotifyWindow;
use crate::renewals::dispatch::{DispatchError, MessageDispatcher};
use crate::renewals::domain::{
    InstallmentPolicy, InstallmentStatus, LicensePlate, NotifyStatus, PhoneNumber, RenewalRecord,
    RenewalStatus,
};
use crate::renewals::notify::NotificationEngine;
use crate::renewals::store::{RenewalStore, StoreError};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn plate(raw: &str) -> LicensePlate {
    LicensePlate::parse(raw).expect("valid plate")
}

pub(super) fn record(plate_raw: &str, phone: &str, register_date: &str) -> RenewalRecord {
    RenewalRecord {
        plate: plate(plate_raw),
        customer_name: "ลูกค้าทดสอบ".to_string(),
        phone: phone.to_string(),
        register_date: register_date.to_string(),
        status: RenewalStatus::Pending,
        notify_status: NotifyStatus::default(),
    }
}

pub(super) fn policy(
    plate_raw: &str,
    start_date: &str,
    payment_day: u32,
    installment_count: u32,
) -> InstallmentPolicy {
    InstallmentPolicy {
        plate: plate(plate_raw),
        insurance_company: "วิริยะประกันภัย".to_string(),
        premium: 12000,
        installment_count,
        current_installment: 0,
        start_date: start_date.to_string(),
        payment_day,
        paid_dates: BTreeMap::new(),
        status: InstallmentStatus::InProgress,
        notify_status: NotifyStatus::default(),
    }
}

pub(super) fn window() -> NotifyWindow {
    NotifyWindow::default()
}

/// In-memory store double. BTreeMap keys keep snapshot order stable across
/// runs so assertions on notification order are deterministic.
#[derive(Default)]
pub(super) struct MemoryStore {
    renewals: Mutex<BTreeMap<LicensePlate, RenewalRecord>>,
    policies: Mutex<BTreeMap<LicensePlate, InstallmentPolicy>>,
}

impl MemoryStore {
    pub(super) fn with_renewals(records: Vec<RenewalRecord>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.renewals.lock().expect("store mutex poisoned");
            for record in records {
                guard.insert(record.plate.clone(), record);
            }
        }
        store
    }

    pub(super) fn seed_policy(&self, policy: InstallmentPolicy) {
        self.policies
            .lock()
            .expect("store mutex poisoned")
            .insert(policy.plate.clone(), policy);
    }

    pub(super) fn renewal(&self, plate: &LicensePlate) -> Option<RenewalRecord> {
        self.renewals
            .lock()
            .expect("store mutex poisoned")
            .get(plate)
            .cloned()
    }

    pub(super) fn policy(&self, plate: &LicensePlate) -> Option<InstallmentPolicy> {
        self.policies
            .lock()
            .expect("store mutex poisoned")
            .get(plate)
            .cloned()
    }
}

impl RenewalStore for MemoryStore {
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

/// Dispatcher double that remembers every send.
#[derive(Default)]
pub(super) struct MemoryDispatcher {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryDispatcher {
    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("dispatch mutex poisoned").clone()
    }
}

impl MessageDispatcher for MemoryDispatcher {
    fn send(&self, recipient: &PhoneNumber, message: &str) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("dispatch mutex poisoned")
            .push((recipient.as_str().to_string(), message.to_string()));
        Ok(())
    }
}

/// Dispatcher double where every send fails.
pub(super) struct FailingDispatcher;

impl MessageDispatcher for FailingDispatcher {
    fn send(&self, _recipient: &PhoneNumber, _message: &str) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("gateway offline".to_string()))
    }
}

/// Store double where every call fails.
pub(super) struct UnavailableStore;

impl RenewalStore for UnavailableStore {
    fn insert_renewal(&self, _record: RenewalRecord) -> Result<RenewalRecord, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update_renewal(&self, _record: RenewalRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_renewal(&self, _plate: &LicensePlate) -> Result<Option<RenewalRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn renewals(&self) -> Result<Vec<RenewalRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn mark_renewal_notified(&self, _plate: &LicensePlate) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn insert_policy(&self, _policy: InstallmentPolicy) -> Result<InstallmentPolicy, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update_policy(&self, _policy: InstallmentPolicy) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch_policy(&self, _plate: &LicensePlate) -> Result<Option<InstallmentPolicy>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn policies(&self) -> Result<Vec<InstallmentPolicy>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn mark_policy_notified(&self, _plate: &LicensePlate) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn build_engine(
    records: Vec<RenewalRecord>,
) -> (
    NotificationEngine<MemoryStore, MemoryDispatcher>,
    Arc<MemoryStore>,
    Arc<MemoryDispatcher>,
) {
    let store = Arc::new(MemoryStore::with_renewals(records));
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let engine = NotificationEngine::new(store.clone(), dispatcher.clone(), window());
    (engine, store, dispatcher)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
