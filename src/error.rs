//! Site-level error types.

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors around the site directory layout.
///
/// These are always fatal: the offending command prints the message and
/// exits non-zero. Per-post failures are handled separately (see
/// [`crate::post::MetadataError`]).
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("`{0}` does not contain a tinta site (missing templates/, posts/ or public/)")]
    NotASite(PathBuf),

    #[error("`{0}` already contains a tinta site")]
    AlreadyASite(PathBuf),

    #[error("`{0}` already exists, pick a fresh path for the new site")]
    AlreadyExists(PathBuf),
}
