//! Site configuration and directory layout.
//!
//! A tinta site is a directory with a fixed layout:
//!
//! ```text
//! <root>/
//!   config.json          site configuration
//!   .build-state.json    build state (last config check)
//!   templates/           jinja templates (post.html, index.html, ...)
//!   posts/               markdown sources, arbitrarily nested
//!   public/              generated output
//!     index.html
//!     tags.html
//!     posts/             one .html per public post, mirroring posts/
//!     tags/              one .html per live tag
//! ```
//!
//! [`SiteConfig`] holds the contents of `config.json`. The build engine
//! itself never reads these values to decide staleness — only the file's
//! modification time feeds into the rebuild decision (see [`crate::stale`]).

use crate::error::SiteError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Directory and file names making up the site layout
pub const TEMPLATES_DIR: &str = "templates";
pub const WEBSITE_DIR: &str = "public";
pub const POSTS_DIR: &str = "posts";
pub const TAGS_DIR: &str = "tags";
pub const CONFIG_FILE: &str = "config.json";
pub const STATE_FILE: &str = ".build-state.json";

fn default_home_max_posts() -> usize {
    10
}

/// Site configuration read from `config.json`.
///
/// All fields are optional in the file; missing fields fall back to
/// defaults so a freshly scaffolded `config.json` can stay minimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, available to every template
    #[serde(default)]
    pub title: String,

    /// Author name, available to every template
    #[serde(default)]
    pub author: String,

    /// Base URL of the deployed site (informational, used by templates)
    #[serde(default)]
    pub base_url: String,

    /// Number of posts listed on the home page and on each tag page
    #[serde(default = "default_home_max_posts")]
    pub home_max_posts: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            base_url: String::new(),
            home_max_posts: default_home_max_posts(),
        }
    }
}

impl SiteConfig {
    /// Parse configuration from a JSON string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{}`", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))
    }
}

/// An opened site: root directory plus parsed configuration.
#[derive(Debug, Clone)]
pub struct Site {
    pub root: PathBuf,
    pub config: SiteConfig,
}

impl Site {
    /// Open an existing site, validating the directory layout.
    ///
    /// Fails with [`SiteError::NotASite`] when the layout is missing, or
    /// with an I/O / parse error when `config.json` is unreadable.
    pub fn open(root: &Path) -> Result<Self> {
        if !is_site(root) {
            return Err(SiteError::NotASite(root.to_path_buf()).into());
        }
        let config = SiteConfig::from_path(&root.join(CONFIG_FILE))?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn posts_path(&self) -> PathBuf {
        self.root.join(POSTS_DIR)
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    pub fn website_path(&self) -> PathBuf {
        self.root.join(WEBSITE_DIR)
    }

    pub fn website_posts_path(&self) -> PathBuf {
        self.website_path().join(POSTS_DIR)
    }

    pub fn website_tags_path(&self) -> PathBuf {
        self.website_path().join(TAGS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }
}

/// Check whether `root` carries the tinta site layout.
pub fn is_site(root: &Path) -> bool {
    root.join(TEMPLATES_DIR).is_dir()
        && root.join(POSTS_DIR).is_dir()
        && root.join(WEBSITE_DIR).is_dir()
}
