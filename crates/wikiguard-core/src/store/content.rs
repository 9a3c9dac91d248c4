//! File operations gated by the access evaluator.
//!
//! Every operation resolves the request once, has the evaluator judge that
//! path, and only then touches it. A denied request never reaches the file.

use super::sniff;
use crate::access::{AccessEvaluator, AccessKind, AccessPolicy, AccessRequest, Authenticator, WorldPermissions};
use crate::access::evaluator::denied;
use crate::error::{GuardError, GuardResult};
use std::fs;
use std::io::ErrorKind;
use std::time::SystemTime;
use tracing::{debug, info};

/// Reported for directories and for content that cannot be identified.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub struct ContentStore<A, P = WorldPermissions> {
    evaluator: AccessEvaluator<A, P>,
}

impl<A: Authenticator, P: AccessPolicy> ContentStore<A, P> {
    pub fn new(evaluator: AccessEvaluator<A, P>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &AccessEvaluator<A, P> {
        &self.evaluator
    }

    pub fn read_to_string(&self, request: &AccessRequest) -> GuardResult<String> {
        let path = self.evaluator.authorize(request, AccessKind::Read)?;
        Ok(fs::read_to_string(path.as_path())?)
    }

    /// Create or truncate the file behind `request`.
    pub fn write_string(&self, request: &AccessRequest, content: &str) -> GuardResult<()> {
        let path = self.evaluator.authorize(request, AccessKind::Write)?;
        fs::write(path.as_path(), content)?;
        info!(path = %path, bytes = content.len(), "wrote content");
        Ok(())
    }

    pub fn delete(&self, request: &AccessRequest) -> GuardResult<()> {
        let path = self.evaluator.authorize(request, AccessKind::Delete)?;
        fs::remove_file(path.as_path())?;
        info!(path = %path, "deleted content");
        Ok(())
    }

    pub fn file_size(&self, request: &AccessRequest) -> GuardResult<u64> {
        let path = self.evaluator.authorize(request, AccessKind::Read)?;
        Ok(fs::metadata(path.as_path())?.len())
    }

    /// Last modification time, for `Last-Modified` and conditional requests.
    pub fn mod_time(&self, request: &AccessRequest) -> GuardResult<SystemTime> {
        let path = self.evaluator.authorize(request, AccessKind::Read)?;
        Ok(fs::metadata(path.as_path())?.modified()?)
    }

    /// MIME type of the resolved file.
    ///
    /// The extension decides when it is known. Otherwise the first bytes
    /// are sniffed, which needs read access.
    pub fn mime_type(&self, request: &AccessRequest) -> GuardResult<&'static str> {
        let path = self.evaluator.resolver().resolve(&request.path)?;
        match fs::metadata(path.as_path()) {
            Ok(meta) if meta.is_dir() => return Ok(FALLBACK_MIME_TYPE),
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(GuardError::Io(e)),
            _ => {}
        }
        if let Some(mime) = mime_guess::from_path(path.as_path()).first_raw() {
            return Ok(mime);
        }

        if !self.evaluator.check(request, &path, AccessKind::Read)? {
            return Err(denied(request, AccessKind::Read));
        }
        let mime = sniff::sniff_file(path.as_path())?;
        debug!(path = %path, mime, "sniffed content type");
        Ok(mime)
    }
}
