//! CLI subcommand implementations.

pub mod access;
pub mod content;
pub mod resolve;
pub mod throttle;

use anyhow::{Context, Result};
use wikiguard_core::access::{AlwaysAuthenticated, Authenticator, NeverAuthenticated};
use wikiguard_core::{AccessEvaluator, PathResolver};

use crate::config::GuardConfig;

pub(crate) fn resolver(config: &GuardConfig) -> Result<PathResolver> {
    PathResolver::new(&config.content_root).with_context(|| {
        format!(
            "invalid content root {}",
            config.content_root.display()
        )
    })
}

/// Evaluator for a caller that is either fully authenticated or anonymous.
pub(crate) fn evaluator(
    config: &GuardConfig,
    authenticated: bool,
) -> Result<AccessEvaluator<Box<dyn Authenticator>>> {
    let authenticator: Box<dyn Authenticator> = if authenticated {
        Box::new(AlwaysAuthenticated)
    } else {
        Box::new(NeverAuthenticated)
    };
    Ok(AccessEvaluator::new(resolver(config)?, authenticator))
}
