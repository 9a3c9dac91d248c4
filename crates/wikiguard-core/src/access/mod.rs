//! Access control for content requests.
//!
//! - **[`authenticator`]**: [`AccessRequest`] and the [`Authenticator`]
//!   verdict the evaluator trusts, plus stock implementations.
//! - **[`policy`]**: the [`AccessPolicy`] seam and its default,
//!   [`WorldPermissions`], which reads POSIX "others" bits.
//! - **[`evaluator`]**: [`AccessEvaluator`], which resolves the request
//!   path, walks the parent directories and applies the policy.

pub mod authenticator;
pub mod evaluator;
pub mod policy;

pub use authenticator::{
    AccessRequest, AlwaysAuthenticated, Authenticator, NeverAuthenticated, SessionAuthenticator,
};
pub use evaluator::{AccessEvaluator, AccessKind, AccessVerdicts};
pub use policy::{AccessPolicy, WorldPermissions};
