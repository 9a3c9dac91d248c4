//! `wikiguard read|write|delete`: access-checked file operations.

use anyhow::{Context, Result};
use std::io::Read;
use wikiguard_core::{AccessRequest, ContentStore};

use crate::config::GuardConfig;

pub fn run_read(config: &GuardConfig, path: &str, authenticated: bool) -> Result<()> {
    let store = ContentStore::new(super::evaluator(config, authenticated)?);
    let content = store.read_to_string(&AccessRequest::new(path))?;
    print!("{content}");
    Ok(())
}

pub fn run_write(config: &GuardConfig, path: &str, authenticated: bool) -> Result<()> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("failed to read content from stdin")?;

    let store = ContentStore::new(super::evaluator(config, authenticated)?);
    store.write_string(&AccessRequest::new(path), &content)?;
    Ok(())
}

pub fn run_delete(config: &GuardConfig, path: &str, authenticated: bool) -> Result<()> {
    let store = ContentStore::new(super::evaluator(config, authenticated)?);
    store.delete(&AccessRequest::new(path))?;
    Ok(())
}
