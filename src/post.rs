//! The post model: one markdown source file plus its derived metadata.
//!
//! A post starts with a fenced YAML front-matter block:
//!
//! ```text
//! ---
//! title: Hello world
//! date: 2024-03-01
//! tags: [rust, blog]
//! draft: false
//! ---
//! The markdown body starts here.
//! ```
//!
//! `date` is required and is the sole sort key for every post listing.
//! `draft: true` keeps a post out of all generated output. The front-matter
//! block is stripped before the body reaches the markdown renderer.
//!
//! Posts are constructed fresh on every build and never persisted; all
//! staleness state lives in filesystem timestamps (see [`crate::stale`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// A single post's front-matter or I/O failure.
///
/// Never fatal on its own: the orchestrator warns and skips the post.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("no front-matter block (file must start with `---`)")]
    MissingFrontMatter,

    #[error("front-matter block is not closed (missing trailing `---`)")]
    UnclosedFrontMatter,

    #[error("invalid front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Deserialized front-matter fields.
#[derive(Debug, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    date: NaiveDate,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    draft: bool,
}

/// One markdown source document with derived metadata.
///
/// Serialized fields (`title`, `date`, `tags`, `url`) form the template
/// context for post listings; paths and the raw body stay internal.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    #[serde(skip)]
    pub source_path: PathBuf,
    #[serde(skip)]
    pub target_path: PathBuf,

    pub title: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
    /// Site-relative URL of the generated page, e.g. `/posts/2024/hello.html`
    pub url: String,

    #[serde(skip)]
    public: bool,
    /// Markdown body with the front-matter block stripped
    #[serde(skip)]
    pub body: String,
}

impl Post {
    /// Load a post from disk, parsing its front-matter.
    ///
    /// `target_path` is where the generated page will be written and
    /// `website_root` anchors the site-relative URL.
    pub fn load(
        source_path: &Path,
        target_path: &Path,
        website_root: &Path,
    ) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(source_path)
            .map_err(|err| MetadataError::Io(source_path.to_path_buf(), err))?;
        let (front, body) = split_front_matter(&content)?;
        let meta: FrontMatter = serde_yaml::from_str(&front)?;

        let title = meta.title.unwrap_or_else(|| {
            source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let url = match target_path.strip_prefix(website_root) {
            Ok(rel) => format!("/{}", rel.display()),
            Err(_) => target_path.display().to_string(),
        };

        Ok(Self {
            source_path: source_path.to_path_buf(),
            target_path: target_path.to_path_buf(),
            title,
            date: meta.date,
            tags: meta.tags,
            url,
            public: !meta.draft,
            body,
        })
    }

    /// Whether this post may appear in any generated output.
    pub fn is_public(&self) -> bool {
        self.public
    }
}

/// Map a markdown source path to its output page path.
///
/// Remaps the posts root onto the output-posts root and swaps the
/// extension to `.html`. Pure and deterministic: the same source always
/// maps to the same target, and distinct sources map to distinct targets.
/// Sources outside `posts_root` yield `None`.
pub fn target_path(source: &Path, posts_root: &Path, output_posts_root: &Path) -> Option<PathBuf> {
    let relative = source.strip_prefix(posts_root).ok()?;
    Some(output_posts_root.join(relative.with_extension("html")))
}

/// Inverse of [`target_path`]: the source a generated page corresponds to.
///
/// Used by orphan detection; the returned path may or may not exist.
pub fn source_for_target(
    target: &Path,
    output_posts_root: &Path,
    posts_root: &Path,
) -> Option<PathBuf> {
    let relative = target.strip_prefix(output_posts_root).ok()?;
    Some(posts_root.join(relative.with_extension("md")))
}

/// Split a document into its front-matter block and markdown body.
///
/// The block must open with `---` on the first line and close with `---`
/// on its own line. A UTF-8 BOM and CRLF line endings are tolerated.
fn split_front_matter(content: &str) -> Result<(String, String), MetadataError> {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n");

    let Some(rest) = normalized.strip_prefix("---\n") else {
        return Err(MetadataError::MissingFrontMatter);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front = rest[..offset].to_string();
            let body = rest[offset + line.len()..].to_string();
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(MetadataError::UnclosedFrontMatter)
}
