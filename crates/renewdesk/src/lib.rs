//! Renewal tracking and notification engine for vehicle inspection and
//! tax-renewal shops.
//!
//! The crate is organized around one batch pass: normalize whatever date
//! encodings the records arrived with ([`dates`]), classify each record
//! against its one-year validity ([`renewals::classifier`]), work out which
//! installment plans collect today ([`renewals::installment`]), and select,
//! dispatch, and flag reminders at most once per period
//! ([`renewals::notify`]). Storage and outbound messaging stay behind traits
//! so the whole engine runs against in-memory doubles in tests.

pub mod config;
pub mod dates;
pub mod error;
pub mod renewals;
pub mod telemetry;
