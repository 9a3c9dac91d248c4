//! Per-request read/write/delete decisions.
//!
//! Authenticated callers get every operation; the server process is
//! assumed to have full rights on the content root anyway. Anonymous
//! callers are judged by the [`AccessPolicy`]:
//!
//! | Operation              | Requirement                                            |
//! |------------------------|--------------------------------------------------------|
//! | any                    | every directory from the root down to the target's parent is enterable |
//! | read                   | target is a regular file the policy lets anyone read   |
//! | write (existing file)  | target is a regular file the policy lets anyone write  |
//! | write (new file)       | containing directory allows creating entries           |
//! | delete                 | same as write on an existing file                      |
//!
//! Verdicts are computed fresh for every call. Nothing is cached, since
//! both permissions and authentication may change between requests.

use super::authenticator::{AccessRequest, Authenticator};
use super::policy::{AccessPolicy, WorldPermissions};
use crate::error::{GuardError, GuardResult};
use crate::store::{PathResolver, ResolvedPath};
use serde::Serialize;
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Read/write/delete verdicts for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessVerdicts {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

/// The operation a caller wants to perform on a content path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
    Delete,
}

impl AccessKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessKind::Read => "read",
            AccessKind::Write => "write",
            AccessKind::Delete => "delete",
        }
    }
}

pub struct AccessEvaluator<A, P = WorldPermissions> {
    resolver: PathResolver,
    authenticator: A,
    policy: P,
}

impl<A: Authenticator> AccessEvaluator<A> {
    pub fn new(resolver: PathResolver, authenticator: A) -> Self {
        Self::with_policy(resolver, authenticator, WorldPermissions)
    }
}

impl<A: Authenticator, P: AccessPolicy> AccessEvaluator<A, P> {
    pub fn with_policy(resolver: PathResolver, authenticator: A, policy: P) -> Self {
        Self {
            resolver,
            authenticator,
            policy,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// # Errors
    ///
    /// Resolver failures (`NotFound` for escapes and hidden files) and
    /// I/O errors while inspecting directories. A missing permission is
    /// `Ok(false)`, never an error.
    pub fn has_read_access(&self, request: &AccessRequest) -> GuardResult<bool> {
        self.evaluate(request, AccessKind::Read)
    }

    pub fn has_write_access(&self, request: &AccessRequest) -> GuardResult<bool> {
        self.evaluate(request, AccessKind::Write)
    }

    pub fn has_delete_access(&self, request: &AccessRequest) -> GuardResult<bool> {
        self.evaluate(request, AccessKind::Delete)
    }

    pub fn verdicts(&self, request: &AccessRequest) -> GuardResult<AccessVerdicts> {
        Ok(AccessVerdicts {
            read: self.has_read_access(request)?,
            write: self.has_write_access(request)?,
            delete: self.has_delete_access(request)?,
        })
    }

    /// Like [`has_read_access`](Self::has_read_access), but a denial becomes
    /// [`GuardError::AccessDenied`].
    pub fn assert_read_access(&self, request: &AccessRequest) -> GuardResult<()> {
        self.assert(request, AccessKind::Read)
    }

    pub fn assert_write_access(&self, request: &AccessRequest) -> GuardResult<()> {
        self.assert(request, AccessKind::Write)
    }

    pub fn assert_delete_access(&self, request: &AccessRequest) -> GuardResult<()> {
        self.assert(request, AccessKind::Delete)
    }

    /// Resolve the request once, judge it, and hand back the path that was
    /// judged. File operations act on exactly this path.
    pub fn authorize(&self, request: &AccessRequest, kind: AccessKind) -> GuardResult<ResolvedPath> {
        let target = self.resolver.resolve(&request.path)?;
        if self.check(request, &target, kind)? {
            return Ok(target);
        }
        Err(denied(request, kind))
    }

    /// Judge an already resolved `target` without resolving again.
    pub fn check(
        &self,
        request: &AccessRequest,
        target: &ResolvedPath,
        kind: AccessKind,
    ) -> GuardResult<bool> {
        if self.authenticator.is_authenticated(request) {
            return Ok(true);
        }
        self.check_anonymous(target, kind)
    }

    fn assert(&self, request: &AccessRequest, kind: AccessKind) -> GuardResult<()> {
        if self.evaluate(request, kind)? {
            return Ok(());
        }
        Err(denied(request, kind))
    }

    fn evaluate(&self, request: &AccessRequest, kind: AccessKind) -> GuardResult<bool> {
        if self.authenticator.is_authenticated(request) {
            return Ok(true);
        }
        let target = self.resolver.resolve(&request.path)?;
        self.check_anonymous(&target, kind)
    }

    fn check_anonymous(&self, target: &ResolvedPath, kind: AccessKind) -> GuardResult<bool> {
        if !self.can_enter_all_parent_directories(target)? {
            debug!(path = %target, operation = kind.as_str(), "parent directory not enterable");
            return Ok(false);
        }

        let granted = match (kind, stat(target.as_path())?) {
            (AccessKind::Read, Some(meta)) => self.policy.can_read_file(&meta),
            (AccessKind::Write | AccessKind::Delete, Some(meta)) => self.policy.can_write_file(&meta),
            (AccessKind::Write, None) => self.can_create(target)?,
            (AccessKind::Read | AccessKind::Delete, None) => false,
        };
        debug!(path = %target, operation = kind.as_str(), granted, "evaluated anonymous access");
        Ok(granted)
    }

    fn can_create(&self, target: &ResolvedPath) -> GuardResult<bool> {
        let Some(dir) = target.as_path().parent() else {
            return Ok(false);
        };
        Ok(stat(dir)?.is_some_and(|meta| self.policy.can_create_in_directory(&meta)))
    }

    /// Walk from the content root towards the target, top-down, and stop at
    /// the first directory that cannot be entered. The target itself is
    /// not checked.
    fn can_enter_all_parent_directories(&self, target: &ResolvedPath) -> GuardResult<bool> {
        let root = self.resolver.content_root();
        let Ok(relative) = target.as_path().strip_prefix(root) else {
            return Ok(false);
        };

        let mut dir = root.to_path_buf();
        for component in relative.components() {
            let enterable = stat(&dir)?.is_some_and(|meta| self.policy.can_enter_directory(&meta));
            if !enterable {
                return Ok(false);
            }
            dir.push(component);
        }
        Ok(true)
    }
}

pub(crate) fn denied(request: &AccessRequest, kind: AccessKind) -> GuardError {
    warn!(path = %request.path, operation = kind.as_str(), "access denied");
    GuardError::AccessDenied(format!("{} access denied on {}", kind.as_str(), request.path))
}

/// `metadata` with a missing path as `None`. Follows symlinks.
fn stat(path: &Path) -> GuardResult<Option<Metadata>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GuardError::Io(e)),
    }
}
