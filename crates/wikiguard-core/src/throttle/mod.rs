//! Brute-force throttling for login attempts.
//!
//! Failed attempts are counted per user, per source address and globally.
//! The login handler asks for a delay before every response, successful or
//! not, and sleeps for it.
//!
//! - **[`key`]**: the three [`TrackingKey`] scopes.
//! - **[`ledger`]**: the unsynchronized [`FailureLedger`].
//! - **[`delay`]**: [`ThrottleConfig`] and the pure delay computation.
//! - **[`actor`]**: the [`ThrottleActor`] worker that owns the ledger and
//!   the [`ThrottleHandle`] callers use to reach it.

pub mod actor;
pub mod delay;
pub mod key;
pub mod ledger;

pub use actor::{ThrottleActor, ThrottleHandle};
pub use delay::{compute_delay, ThrottleConfig};
pub use key::TrackingKey;
pub use ledger::{FailureLedger, FailureRecord};
