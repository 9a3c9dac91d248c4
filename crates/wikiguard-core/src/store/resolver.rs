//! Mapping of untrusted URL paths onto the content root.
//!
//! Resolution runs these steps, and the first failing step ends it:
//!
//! 1. join the request path onto the content root
//! 2. make it absolute and clean it lexically (symlinks are *not* resolved)
//! 3. reject anything outside the content root
//! 4. reject hidden components (a leading `.`)
//! 5. guess a missing extension (`page` → `page.md`)
//! 6. replace a directory by its index document, if it has one
//!
//! Containment is syntactic. A symlink inside the root that points
//! elsewhere is followed by later I/O; content authors create those on
//! purpose.

use super::clean::normalize;
use crate::error::{GuardError, GuardResult};
use std::fmt;
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Base name of directory index documents, before extension guessing.
pub const INDEX_NAME: &str = "index";

/// An absolute, cleaned path inside the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    index: bool,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }

    /// Whether a directory request was redirected to its index document.
    pub fn is_index(&self) -> bool {
        self.index
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.display().fmt(f)
    }
}

/// Resolves request paths against a fixed content root.
///
/// Holds no state beyond the root, so one instance can serve any number
/// of threads.
#[derive(Debug, Clone)]
pub struct PathResolver {
    content_root: PathBuf,
}

impl PathResolver {
    pub fn new(content_root: impl AsRef<Path>) -> GuardResult<Self> {
        let content_root = normalize(content_root.as_ref())?;
        Ok(Self { content_root })
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn resolve(&self, request_path: &str) -> GuardResult<ResolvedPath> {
        // A leading slash would make `join` discard the root.
        let joined = self.content_root.join(request_path.trim_start_matches('/'));
        let normalized = normalize(&joined)?;

        self.assert_inside_content_root(&normalized)?;
        self.assert_not_hidden(&normalized)?;

        let guessed = guess_extension(normalized)?;
        let is_dir = metadata(&guessed)?.is_some_and(|meta| meta.is_dir());
        let resolved = if is_dir {
            self.index_for_directory(guessed)?
        } else {
            ResolvedPath {
                path: guessed,
                index: false,
            }
        };

        debug!(request = %request_path, resolved = %resolved, "resolved request path");
        Ok(resolved)
    }

    fn assert_inside_content_root(&self, path: &Path) -> GuardResult<()> {
        // Component-wise, so `/srv/wiki-private` is not inside `/srv/wiki`.
        if path.starts_with(&self.content_root) {
            return Ok(());
        }
        warn!(
            path = %path.display(),
            root = %self.content_root.display(),
            "request escapes content root"
        );
        Err(GuardError::NotFound(format!(
            "{} is not inside content root {}",
            path.display(),
            self.content_root.display()
        )))
    }

    fn assert_not_hidden(&self, path: &Path) -> GuardResult<()> {
        let Ok(relative) = path.strip_prefix(&self.content_root) else {
            return Ok(());
        };
        let hidden = relative.components().any(|component| match component {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        });
        if hidden {
            return Err(GuardError::NotFound(format!(
                "{} is a hidden file and may not be displayed",
                path.display()
            )));
        }
        Ok(())
    }

    /// The index document inside `dir`, or `dir` itself when there is none.
    fn index_for_directory(&self, dir: PathBuf) -> GuardResult<ResolvedPath> {
        let index = guess_extension(dir.join(INDEX_NAME))?;
        let resolved = if metadata(&index)?.is_some_and(|meta| meta.is_file()) {
            ResolvedPath {
                path: index,
                index: true,
            }
        } else {
            ResolvedPath {
                path: dir,
                index: false,
            }
        };
        Ok(resolved)
    }
}

/// Append a missing extension.
///
/// An existing path is returned unchanged. Otherwise the alphabetically
/// first sibling matching `<path>.*` wins; with no match the path is
/// returned as is and later I/O reports it missing.
fn guess_extension(path: PathBuf) -> GuardResult<PathBuf> {
    if path.try_exists().map_err(GuardError::Io)? {
        return Ok(path);
    }
    let Some(literal) = path.to_str() else {
        return Ok(path);
    };

    let pattern = format!("{}.*", glob::Pattern::escape(literal));
    let mut matches = glob::glob(&pattern)
        .map_err(|e| GuardError::Io(std::io::Error::other(e)))?
        .map(|entry| entry.map_err(|e| GuardError::Io(e.into_error())))
        .collect::<GuardResult<Vec<PathBuf>>>()?;
    matches.sort();

    Ok(matches.into_iter().next().unwrap_or(path))
}

/// `metadata` with a missing path as `None`; every other OS error surfaces.
fn metadata(path: &Path) -> GuardResult<Option<Metadata>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GuardError::Io(e)),
    }
}
