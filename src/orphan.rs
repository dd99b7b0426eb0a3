//! Orphan detection: generated pages whose source is gone.
//!
//! Deleting or renaming a post leaves its old page behind in
//! `public/posts/`; dropping the last use of a tag leaves a stale page in
//! `public/tags/`. The queries here find both against the *current* source
//! tree. They only report paths — deletion is the orchestrator's job, which
//! keeps these side-effect-free and independently testable.

use crate::config::Site;
use crate::post::source_for_target;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Generated post pages with no corresponding live markdown source.
pub fn orphan_post_pages(site: &Site) -> Vec<PathBuf> {
    let posts_root = site.posts_path();
    let output_root = site.website_posts_path();

    WalkDir::new(&output_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .map(walkdir::DirEntry::into_path)
        .filter(|target| {
            source_for_target(target, &output_root, &posts_root)
                .is_none_or(|source| !source.exists())
        })
        .collect()
}

/// Generated tag pages whose tag no longer appears on any public post.
///
/// `live_slugs` is the slug set the aggregate builder just produced.
pub fn orphan_tag_pages(site: &Site, live_slugs: &BTreeSet<String>) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(site.website_tags_path()) else {
        return Vec::new();
    };

    let mut orphans: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
        .filter(|path| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy())
                .is_none_or(|stem| !live_slugs.contains(stem.as_ref()))
        })
        .collect();
    orphans.sort();
    orphans
}
