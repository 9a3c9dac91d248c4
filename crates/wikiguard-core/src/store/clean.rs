//! Lexical path normalization.
//!
//! Nothing here touches the filesystem beyond reading the working
//! directory, so symlinks are never followed.

use crate::error::GuardResult;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and clean it lexically.
pub fn normalize(path: &Path) -> GuardResult<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(clean(&absolute))
}

/// Collapse `.` and `..` segments without consulting the filesystem.
///
/// `..` never climbs above the root of an absolute path. For relative
/// paths, leading `..` segments are kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_parent_segments() {
        assert_eq!(clean(Path::new("/srv/wiki/a/../b")), PathBuf::from("/srv/wiki/b"));
        assert_eq!(clean(Path::new("/srv/wiki/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(clean(Path::new("/../../x")), PathBuf::from("/x"));
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn drops_current_dir_and_duplicate_separators() {
        assert_eq!(clean(Path::new("/srv//wiki/./page")), PathBuf::from("/srv/wiki/page"));
        assert_eq!(clean(Path::new("/srv/wiki/")), PathBuf::from("/srv/wiki"));
    }

    #[test]
    fn relative_paths_keep_leading_parents() {
        assert_eq!(clean(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn normalize_makes_absolute() {
        let normalized = normalize(Path::new("some/../dir")).unwrap();
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("dir"));
    }
}
