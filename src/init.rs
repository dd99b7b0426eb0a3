//! Site initialization.
//!
//! Scaffolds the fixed directory layout, a default `config.json` and the
//! embedded default templates.

use crate::config::{self, SiteConfig, CONFIG_FILE, TEMPLATES_DIR};
use crate::error::SiteError;
use crate::log;
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Default site directory structure
const SITE_DIRS: &[&str] = &[
    "templates",
    "posts",
    "public",
    "public/posts",
    "public/tags",
];

/// Default templates written by `init` (embedded at compile time)
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("index.html", include_str!("embed/templates/index.html")),
    ("post.html", include_str!("embed/templates/post.html")),
    ("tag.html", include_str!("embed/templates/tag.html")),
    ("all_tags.html", include_str!("embed/templates/all_tags.html")),
];

/// Create a new site at `path`.
///
/// Fails when `path` already holds a site, or exists at all — the caller
/// has to pick a fresh directory.
pub fn new_site(path: &Path) -> Result<()> {
    if config::is_site(path) {
        return Err(SiteError::AlreadyASite(path.to_path_buf()).into());
    }
    if path.exists() {
        return Err(SiteError::AlreadyExists(path.to_path_buf()).into());
    }

    for dir in SITE_DIRS {
        let dir = path.join(dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create `{}`", dir.display()))?;
    }

    let config = serde_json::to_string_pretty(&SiteConfig::default())?;
    fs::write(path.join(CONFIG_FILE), config)?;

    for (name, content) in DEFAULT_TEMPLATES {
        fs::write(path.join(TEMPLATES_DIR).join(name), content)?;
    }

    log!("init"; "new site created at {}", path.display());
    Ok(())
}
