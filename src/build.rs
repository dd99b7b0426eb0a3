//! Build orchestration.
//!
//! One build run is a strict sequence of phases:
//!
//! ```text
//! build()
//!     │
//!     ├── config check ──► RebuildScope::Full when config.json changed
//!     │                    (advances BuildState exactly once)
//!     ├── scan posts/  ──► Post values; bad metadata is warned and skipped
//!     ├── compute scope ─► Full | Selected(dirty public posts)
//!     ├── render scope ──► markdown → post template → public/posts/
//!     ├── evict orphans ─► pages whose source is gone
//!     └── aggregates  ───► index.html, tags/*.html, tags.html
//!                          (+ stale tag page eviction)
//! ```
//!
//! The scope is fixed before the first write. Aggregate pages derive from
//! every public post, so they are rebuilt whenever the run touched anything
//! at all; an untouched run reports "nothing to do".
//!
//! Failure policy: a post that fails to parse or render is logged and
//! skipped, the rest of the site still builds. Failures writing into
//! `public/` abort the run with the underlying I/O error.

use crate::config::Site;
use crate::log;
use crate::orphan;
use crate::post::{self, Post};
use crate::render::{self, POST_TEMPLATE, Templater};
use crate::stale::{self, BuildState, RebuildScope};
use anyhow::{Context, Result};
use minijinja::context;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a finished build run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Post pages rendered and written
    pub posts_built: usize,
    /// Posts skipped over metadata or render failures
    pub posts_skipped: usize,
    /// Orphaned pages deleted (post pages and stale tag pages)
    pub orphans_removed: usize,
    /// Whether every public post was in scope regardless of timestamps
    pub full_rebuild: bool,
    /// Whether home/tag pages were regenerated
    pub aggregates_built: bool,
}

/// Run one build over the site.
///
/// `state` is the persisted [`BuildState`] loaded by the caller; the
/// possibly-advanced state is handed back for the caller to store.
/// `force` puts every public post in scope without advancing the state.
pub fn build(site: &Site, force: bool, mut state: BuildState) -> Result<(BuildSummary, BuildState)> {
    let config_changed = stale::config_stale(&site.config_path(), &state);
    if config_changed {
        log!("build"; "config.json changed, rebuilding the whole site");
        state.advance();
    }

    let templater = Templater::new(&site.template_path(), &site.config);

    // ========================================================================
    // Scan: every markdown file under posts/, public or not
    // ========================================================================
    let posts_root = site.posts_path();
    let output_posts_root = site.website_posts_path();

    let mut posts: Vec<Post> = Vec::new();
    let mut skipped = 0;
    for source in markdown_sources(&posts_root) {
        let Some(target) = post::target_path(&source, &posts_root, &output_posts_root) else {
            continue;
        };
        match Post::load(&source, &target, &site.website_path()) {
            Ok(post) => posts.push(post),
            Err(err) => {
                log!("warn"; "skipping {}: {err}", source.display());
                skipped += 1;
            }
        }
    }

    // Aggregate input: public posts, date descending, scan order on ties
    let mut public: Vec<&Post> = posts.iter().filter(|p| p.is_public()).collect();
    public.sort_by(|a, b| b.date.cmp(&a.date));

    // ========================================================================
    // Scope: decided once, before anything is written
    // ========================================================================
    let scope = if force || config_changed {
        RebuildScope::Full
    } else {
        RebuildScope::Selected(
            public
                .iter()
                .filter(|p| stale::is_dirty(&p.source_path, &p.target_path))
                .map(|p| p.source_path.clone())
                .collect(),
        )
    };

    // ========================================================================
    // Per-post phase
    // ========================================================================
    let mut built = 0;
    for post in posts.iter().filter(|p| p.is_public()) {
        if !scope.includes(&post.source_path) {
            continue;
        }
        match render_post(post, &templater) {
            Ok(html) => {
                write_post_page(post, &html)?;
                log!("build"; "built {}", post.url);
                built += 1;
            }
            Err(err) => {
                log!("warn"; "skipping {}: {err:#}", post.source_path.display());
                skipped += 1;
            }
        }
    }

    // ========================================================================
    // Orphan eviction: only after the scan has fully settled
    // ========================================================================
    let mut orphans_removed = 0;
    for orphan in orphan::orphan_post_pages(site) {
        log!("build"; "removing orphan page {}", orphan.display());
        fs::remove_file(&orphan)
            .with_context(|| format!("Failed to remove `{}`", orphan.display()))?;
        orphans_removed += 1;
    }

    // ========================================================================
    // Aggregates: rebuilt whenever this run changed anything
    // ========================================================================
    let aggregates_built = scope.is_full() || built > 0 || orphans_removed > 0;
    if aggregates_built {
        log!("build"; "building index and tag pages");
        crate::aggregate::build_home(site, &templater, &public)?;
        let live_slugs = crate::aggregate::build_tag_pages(site, &templater, &public)?;

        for orphan in orphan::orphan_tag_pages(site, &live_slugs) {
            log!("build"; "removing stale tag page {}", orphan.display());
            fs::remove_file(&orphan)
                .with_context(|| format!("Failed to remove `{}`", orphan.display()))?;
            orphans_removed += 1;
        }
    } else {
        log!("build"; "nothing to do");
    }

    let summary = BuildSummary {
        posts_built: built,
        posts_skipped: skipped,
        orphans_removed,
        full_rebuild: scope.is_full(),
        aggregates_built,
    };
    Ok((summary, state))
}

/// Collect every markdown source under the posts root, sorted by path for
/// a deterministic scan order.
fn markdown_sources(posts_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(posts_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Render one post through the markdown renderer and the post template.
fn render_post(post: &Post, templater: &Templater) -> Result<String> {
    let content = render::markdown_to_html(&post.body);
    templater.render(POST_TEMPLATE, context! { post => post, content => content })
}

/// Write a rendered post page, creating parent directories as needed.
///
/// I/O failures here are fatal to the whole run.
fn write_post_page(post: &Post, html: &str) -> Result<()> {
    if let Some(parent) = post.target_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    fs::write(&post.target_path, html)
        .with_context(|| format!("Failed to write `{}`", post.target_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_FILE, POSTS_DIR, TAGS_DIR, TEMPLATES_DIR, WEBSITE_DIR};
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn scaffold_site(root: &Path) -> Site {
        for dir in [TEMPLATES_DIR, POSTS_DIR, WEBSITE_DIR] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::create_dir_all(root.join(WEBSITE_DIR).join(POSTS_DIR)).unwrap();
        fs::create_dir_all(root.join(WEBSITE_DIR).join(TAGS_DIR)).unwrap();
        fs::write(root.join(CONFIG_FILE), "{}").unwrap();

        let templates = root.join(TEMPLATES_DIR);
        fs::write(
            templates.join("index.html"),
            "{% for post in latest_posts %}{{ post.title }};{% endfor %}",
        )
        .unwrap();
        fs::write(
            templates.join("post.html"),
            "<article>{{ post.title }}</article>{{ content|safe }}",
        )
        .unwrap();
        fs::write(
            templates.join("tag.html"),
            "{{ tag }}:{% for post in latest_posts %}{{ post.title }};{% endfor %}",
        )
        .unwrap();
        fs::write(
            templates.join("all_tags.html"),
            "{% for tag in all_tags %}{{ tag.name }},{% endfor %}",
        )
        .unwrap();

        Site::open(root).unwrap()
    }

    fn write_source(site: &Site, name: &str, date: &str, tags: &str, draft: bool) -> PathBuf {
        let path = site.posts_path().join(format!("{name}.md"));
        fs::write(
            &path,
            format!(
                "---\ntitle: {name}\ndate: {date}\ntags: {tags}\ndraft: {draft}\n---\n# {name}\n"
            ),
        )
        .unwrap();
        path
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    /// Posts A (old, [x]), B (newer, [x, y]) and an unpublished C: the
    /// first build renders everything, an unchanged second run is a no-op.
    #[test]
    fn test_first_build_and_noop_rerun() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "a", "2024-01-01", "[x]", false);
        write_source(&site, "b", "2024-02-01", "[x, y]", false);
        write_source(&site, "c", "2024-03-01", "[x]", true);

        let (summary, state) = build(&site, false, BuildState::default()).unwrap();
        assert_eq!(summary.posts_built, 2);
        assert!(summary.full_rebuild, "default state means config is stale");
        assert!(summary.aggregates_built);

        let index = fs::read_to_string(site.website_path().join("index.html")).unwrap();
        assert_eq!(index, "b;a;");
        let x_page = fs::read_to_string(site.website_tags_path().join("x.html")).unwrap();
        assert_eq!(x_page, "x:b;a;");
        let y_page = fs::read_to_string(site.website_tags_path().join("y.html")).unwrap();
        assert_eq!(y_page, "y:b;");
        assert!(!site.website_posts_path().join("c.html").exists());

        // Second run with the advanced state: nothing to do
        let (summary, _) = build(&site, false, state).unwrap();
        assert_eq!(summary, BuildSummary::default());
    }

    #[test]
    fn test_edited_post_triggers_incremental_rebuild() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        let a = write_source(&site, "a", "2024-01-01", "[]", false);
        write_source(&site, "b", "2024-02-01", "[]", false);

        let (_, state) = build(&site, false, BuildState::default()).unwrap();

        // Touch only A
        set_mtime(&a, SystemTime::now() + Duration::from_secs(5));
        let (summary, _) = build(&site, false, state).unwrap();
        assert_eq!(summary.posts_built, 1);
        assert!(!summary.full_rebuild);
        assert!(summary.aggregates_built, "one changed post refreshes aggregates");
    }

    #[test]
    fn test_config_change_forces_full_rebuild() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "a", "2024-01-01", "[]", false);
        write_source(&site, "b", "2024-02-01", "[]", false);

        let (_, state) = build(&site, false, BuildState::default()).unwrap();

        // Bump config.json past the recorded check; no post changed
        set_mtime(&site.config_path(), SystemTime::now() + Duration::from_secs(5));
        let (summary, next_state) = build(&site, false, state.clone()).unwrap();
        assert_eq!(summary.posts_built, 2);
        assert!(summary.full_rebuild);
        assert!(next_state.last_config_check >= state.last_config_check);

        // And the advanced state suppresses a third full rebuild
        set_mtime(&site.config_path(), SystemTime::now() - Duration::from_secs(60));
        let (summary, _) = build(&site, false, next_state).unwrap();
        assert_eq!(summary.posts_built, 0);
    }

    #[test]
    fn test_force_rebuilds_without_advancing_state() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "a", "2024-01-01", "[]", false);

        let (_, state) = build(&site, false, BuildState::default()).unwrap();
        let (summary, next_state) = build(&site, true, state.clone()).unwrap();

        assert_eq!(summary.posts_built, 1);
        assert!(summary.full_rebuild);
        assert_eq!(next_state, state);
    }

    #[test]
    fn test_deleted_source_evicts_orphan_and_stale_tag_page() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "a", "2024-01-01", "[x]", false);
        let b = write_source(&site, "b", "2024-02-01", "[x, y]", false);

        let (_, state) = build(&site, false, BuildState::default()).unwrap();
        assert!(site.website_posts_path().join("b.html").exists());
        assert!(site.website_tags_path().join("y.html").exists());

        fs::remove_file(&b).unwrap();
        let (summary, _) = build(&site, false, state).unwrap();

        // b.html plus the now-dead y tag page
        assert_eq!(summary.orphans_removed, 2);
        assert_eq!(summary.posts_built, 0);
        assert!(!site.website_posts_path().join("b.html").exists());
        assert!(!site.website_tags_path().join("y.html").exists());

        let index = fs::read_to_string(site.website_path().join("index.html")).unwrap();
        assert_eq!(index, "a;");
    }

    #[test]
    fn test_bad_metadata_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "good", "2024-01-01", "[]", false);
        fs::write(site.posts_path().join("broken.md"), "no front matter here").unwrap();

        let (summary, _) = build(&site, false, BuildState::default()).unwrap();
        assert_eq!(summary.posts_built, 1);
        assert_eq!(summary.posts_skipped, 1);
        assert!(site.website_posts_path().join("good.html").exists());
        assert!(!site.website_posts_path().join("broken.html").exists());
    }

    #[test]
    fn test_nested_posts_mirror_into_output() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        fs::create_dir_all(site.posts_path().join("2024/03")).unwrap();
        fs::write(
            site.posts_path().join("2024/03/deep.md"),
            "---\ntitle: deep\ndate: 2024-03-05\n---\nbody",
        )
        .unwrap();

        let (summary, _) = build(&site, false, BuildState::default()).unwrap();
        assert_eq!(summary.posts_built, 1);
        assert!(site.website_posts_path().join("2024/03/deep.html").exists());
    }

    #[test]
    fn test_post_page_contains_rendered_markdown() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        write_source(&site, "hello", "2024-01-01", "[]", false);

        build(&site, false, BuildState::default()).unwrap();

        let page = fs::read_to_string(site.website_posts_path().join("hello.html")).unwrap();
        assert!(page.contains("<article>hello</article>"));
        assert!(page.contains("<h1>hello</h1>"));
    }

    #[test]
    fn test_date_ties_keep_scan_order() {
        let dir = TempDir::new().unwrap();
        let site = scaffold_site(dir.path());
        // Same date; scan order is path order, so "a" before "z"
        write_source(&site, "z", "2024-01-01", "[]", false);
        write_source(&site, "a", "2024-01-01", "[]", false);

        build(&site, false, BuildState::default()).unwrap();
        let index = fs::read_to_string(site.website_path().join("index.html")).unwrap();
        assert_eq!(index, "a;z;");
    }
}
