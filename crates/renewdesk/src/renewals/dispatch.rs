use crate::renewals::domain::PhoneNumber;

/// Outbound message hook (SMS gateway, LINE adapter, console logger).
///
/// One-shot send: the engine never retries within a run. A failed send
/// leaves the record unflagged, so the next batch run picks it up again.
pub trait MessageDispatcher: Send + Sync {
    fn send(&self, recipient: &PhoneNumber, message: &str) -> Result<(), DispatchError>;
}

/// Dispatch transport error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}
