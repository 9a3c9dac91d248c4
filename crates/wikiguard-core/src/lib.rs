//! wikiguard-core: the security decision layer of a file-backed wiki.
//!
//! Every request passes through this crate before file content is touched:
//! login attempts are slowed down by the [`throttle`] worker, and content
//! paths are confined and checked by [`store`] and [`access`].

pub mod access;
pub mod error;
pub mod store;
pub mod throttle;

// Re-export commonly used items at crate root.
pub use access::{AccessEvaluator, AccessKind, AccessRequest, AccessVerdicts, Authenticator};
pub use error::{GuardError, GuardResult};
pub use store::{ContentStore, PathResolver, ResolvedPath};
pub use throttle::{ThrottleActor, ThrottleConfig, ThrottleHandle, TrackingKey};
