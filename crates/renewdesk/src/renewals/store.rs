use crate::renewals::domain::{InstallmentPolicy, LicensePlate, RenewalRecord};

/// Storage abstraction over the renewal and installment collections, so the
/// engine can be exercised against an in-memory double.
///
/// `mark_*_notified` are conditional writes: they set the notified flag only
/// when it is not already set, and report which way it went. Overlapping
/// batch runs both racing to flag the same plate therefore see exactly one
/// `Ok(true)` between them, which is what keeps delivery at-most-once per
/// period.
pub trait RenewalStore: Send + Sync {
    fn insert_renewal(&self, record: RenewalRecord) -> Result<RenewalRecord, StoreError>;
    fn update_renewal(&self, record: RenewalRecord) -> Result<(), StoreError>;
    fn fetch_renewal(&self, plate: &LicensePlate) -> Result<Option<RenewalRecord>, StoreError>;
    fn renewals(&self) -> Result<Vec<RenewalRecord>, StoreError>;
    /// Flag a renewal record as notified. `Ok(true)` when this call made the
    /// transition, `Ok(false)` when the flag was already set.
    fn mark_renewal_notified(&self, plate: &LicensePlate) -> Result<bool, StoreError>;

    fn insert_policy(&self, policy: InstallmentPolicy) -> Result<InstallmentPolicy, StoreError>;
    fn update_policy(&self, policy: InstallmentPolicy) -> Result<(), StoreError>;
    fn fetch_policy(&self, plate: &LicensePlate) -> Result<Option<InstallmentPolicy>, StoreError>;
    fn policies(&self) -> Result<Vec<InstallmentPolicy>, StoreError>;
    /// Conditional notified flag for installment policies, same contract as
    /// [`RenewalStore::mark_renewal_notified`].
    fn mark_policy_notified(&self, plate: &LicensePlate) -> Result<bool, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
