//! World permission bits as the access policy for anonymous callers.
//!
//! Operators grant anonymous access with `chmod o+...`. The rules mirror
//! ordinary POSIX semantics: execute to traverse a directory, read to read
//! a file, write to change it, and write plus execute on a directory to
//! create an entry in it.

use std::fs::Metadata;
use std::os::unix::fs::PermissionsExt;

pub const WORLD_READ: u32 = 0o004;
pub const WORLD_WRITE: u32 = 0o002;
pub const WORLD_EXECUTE: u32 = 0o001;

fn world_has(meta: &Metadata, bits: u32) -> bool {
    meta.permissions().mode() & bits == bits
}

pub fn can_enter_directory(meta: &Metadata) -> bool {
    meta.is_dir() && world_has(meta, WORLD_EXECUTE)
}

pub fn can_create_in_directory(meta: &Metadata) -> bool {
    meta.is_dir() && world_has(meta, WORLD_WRITE | WORLD_EXECUTE)
}

pub fn can_read_file(meta: &Metadata) -> bool {
    meta.is_file() && world_has(meta, WORLD_READ)
}

pub fn can_write_file(meta: &Metadata) -> bool {
    meta.is_file() && world_has(meta, WORLD_WRITE)
}

/// Decides anonymous access from filesystem metadata.
///
/// [`AccessEvaluator`](super::AccessEvaluator) walks the directories and
/// stats the target; the policy only judges each piece of metadata.
pub trait AccessPolicy: Send + Sync {
    fn can_enter_directory(&self, meta: &Metadata) -> bool;
    fn can_create_in_directory(&self, meta: &Metadata) -> bool;
    fn can_read_file(&self, meta: &Metadata) -> bool;
    fn can_write_file(&self, meta: &Metadata) -> bool;
}

/// The default policy: POSIX "others" bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldPermissions;

impl AccessPolicy for WorldPermissions {
    fn can_enter_directory(&self, meta: &Metadata) -> bool {
        can_enter_directory(meta)
    }

    fn can_create_in_directory(&self, meta: &Metadata) -> bool {
        can_create_in_directory(meta)
    }

    fn can_read_file(&self, meta: &Metadata) -> bool {
        can_read_file(meta)
    }

    fn can_write_file(&self, meta: &Metadata) -> bool {
        can_write_file(meta)
    }
}
