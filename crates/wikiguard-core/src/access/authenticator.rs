//! The authentication verdict the access layer trusts.
//!
//! Establishing who the caller is (login UI, cookies, htpasswd) happens
//! outside this crate. The evaluator only asks an [`Authenticator`]
//! whether the request is authenticated.

use std::sync::Arc;

/// A request as seen by the access layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequest {
    /// URL path, already percent-decoded.
    pub path: String,
    /// User id established by the session layer, if any.
    pub user_id: Option<String>,
    pub remote_addr: Option<String>,
}

impl AccessRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }
}

pub trait Authenticator: Send + Sync {
    /// True iff the request comes from a properly authenticated caller.
    fn is_authenticated(&self, request: &AccessRequest) -> bool;
}

impl<A: Authenticator + ?Sized> Authenticator for Arc<A> {
    fn is_authenticated(&self, request: &AccessRequest) -> bool {
        (**self).is_authenticated(request)
    }
}

impl<A: Authenticator + ?Sized> Authenticator for Box<A> {
    fn is_authenticated(&self, request: &AccessRequest) -> bool {
        (**self).is_authenticated(request)
    }
}

/// Treats every request as authenticated. Meant for single-user setups and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAuthenticated;

impl Authenticator for AlwaysAuthenticated {
    fn is_authenticated(&self, _request: &AccessRequest) -> bool {
        true
    }
}

/// Treats every request as anonymous, so only world permission bits apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAuthenticated;

impl Authenticator for NeverAuthenticated {
    fn is_authenticated(&self, _request: &AccessRequest) -> bool {
        false
    }
}

/// Authenticated iff the session layer attached a non-empty user id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAuthenticator;

impl Authenticator for SessionAuthenticator {
    fn is_authenticated(&self, request: &AccessRequest) -> bool {
        request.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
