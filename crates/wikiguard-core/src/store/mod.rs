//! Confinement of request paths to the content root, and the access-checked
//! file operations built on it.

pub mod clean;
pub mod content;
pub mod resolver;
pub mod sniff;

pub use content::{ContentStore, FALLBACK_MIME_TYPE};
pub use resolver::{PathResolver, ResolvedPath, INDEX_NAME};
