//! Aggregate pages: home, per-tag pages and the all-tags index.
//!
//! All three derive from the full date-sorted public post list, so they are
//! regenerated whenever any post page changed — the orchestrator decides
//! when, this module only produces the files.

use crate::config::Site;
use crate::post::Post;
use crate::render::{ALL_TAGS_TEMPLATE, INDEX_TEMPLATE, TAG_TEMPLATE, Templater};
use crate::utils::slug::slugify_tag;
use anyhow::{Context, Result};
use minijinja::context;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Render the home page from the latest `home_max_posts` public posts.
///
/// `posts` must already be sorted by date descending.
pub fn build_home(site: &Site, templater: &Templater, posts: &[&Post]) -> Result<()> {
    let latest = &posts[..posts.len().min(site.config.home_max_posts)];
    let html = templater.render(INDEX_TEMPLATE, context! { latest_posts => latest })?;
    write_page(&site.website_path().join("index.html"), &html)
}

/// Render one page per distinct tag plus the all-tags index.
///
/// Tags are processed in sorted order so identical input always produces
/// identical output files. Returns the set of live tag slugs, which the
/// orchestrator diffs against `public/tags/` to evict stale tag pages.
pub fn build_tag_pages(
    site: &Site,
    templater: &Templater,
    posts: &[&Post],
) -> Result<BTreeSet<String>> {
    let all_tags: BTreeSet<&str> = posts
        .iter()
        .flat_map(|post| post.tags.iter().map(String::as_str))
        .collect();

    let tags_dir = site.website_tags_path();
    fs::create_dir_all(&tags_dir)
        .with_context(|| format!("Failed to create `{}`", tags_dir.display()))?;

    let mut live_slugs = BTreeSet::new();
    for tag in &all_tags {
        let group: Vec<&&Post> = posts
            .iter()
            .filter(|post| post.tags.iter().any(|t| t == tag))
            .take(site.config.home_max_posts)
            .collect();

        let html = templater.render(
            TAG_TEMPLATE,
            context! { tag => tag, latest_posts => group },
        )?;
        let slug = slugify_tag(tag);
        write_page(&tags_dir.join(format!("{slug}.html")), &html)?;
        live_slugs.insert(slug);
    }

    let tag_index: Vec<_> = all_tags
        .iter()
        .map(|tag| context! { name => tag, slug => slugify_tag(tag) })
        .collect();
    let html = templater.render(ALL_TAGS_TEMPLATE, context! { all_tags => tag_index })?;
    write_page(&site.website_path().join("tags.html"), &html)?;

    Ok(live_slugs)
}

fn write_page(target: &Path, html: &str) -> Result<()> {
    fs::write(target, html).with_context(|| format!("Failed to write `{}`", target.display()))
}
