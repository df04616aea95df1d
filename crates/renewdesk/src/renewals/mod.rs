//! Renewal tracking: records, classification, installment schedules, and
//! the notification engine that reminds customers before deadlines pass.

pub mod classifier;
pub mod dispatch;
pub mod domain;
pub mod import;
pub mod installment;
pub mod notify;
pub mod report;
pub mod router;
pub mod store;

pub use classifier::{Classification, NotifyWindow, RenewalBucket};
pub use dispatch::{DispatchError, MessageDispatcher};
pub use domain::{
    DomainError, InstallmentPolicy, InstallmentStatus, LicensePlate, NewPolicy, NewRenewal,
    NotifyStatus, PhoneNumber, RenewalRecord, RenewalStatus,
};
pub use import::{import_policies, import_renewals, ImportError};
pub use notify::{
    EngineError, Notification, NotificationEngine, NotificationKind, NotifyLedger, NotifyRunReport,
};
pub use report::{BucketCounts, DueListEntry, PolicyDueEntry, RenewalOverview};
pub use router::renewal_router;
pub use store::{RenewalStore, StoreError};
