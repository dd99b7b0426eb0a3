//! Rendering collaborators: markdown → HTML and template → page.
//!
//! The build engine treats both as opaque text transforms. Markdown goes
//! through `pulldown-cmark`; templates are Jinja-style files in
//! `templates/`, rendered with `minijinja`. Templates receive a `site`
//! global (title, author, base URL) on top of their per-page context.

use crate::config::SiteConfig;
use anyhow::{Context, Result};
use minijinja::{Environment, Value, path_loader};
use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;
use std::path::Path;

/// Template file names resolved inside the site's `templates/` directory
pub const POST_TEMPLATE: &str = "post.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const TAG_TEMPLATE: &str = "tag.html";
pub const ALL_TAGS_TEMPLATE: &str = "all_tags.html";

/// Render a markdown body to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Template renderer over the site's `templates/` directory.
pub struct Templater {
    env: Environment<'static>,
}

impl Templater {
    pub fn new(templates_dir: &Path, config: &SiteConfig) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir));
        env.add_global("site", Value::from_serialize(config));
        Self { env }
    }

    /// Render the named template with the given context.
    pub fn render(&self, name: &str, ctx: impl Serialize) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .with_context(|| format!("Failed to load template `{name}`"))?;
        template
            .render(ctx)
            .with_context(|| format!("Failed to render template `{name}`"))
    }
}
