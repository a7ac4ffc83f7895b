//! Writings index entries and the derivations that build them

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use super::FrontMatter;

lazy_static! {
    /// First inline image, `![alt](url)`, never spanning lines
    static ref INLINE_IMAGE: Regex = Regex::new(r"!\[.*?\]\((.*?)\)").unwrap();
}

/// One summary on the writings index
#[derive(Debug, Clone, Serialize)]
pub struct PostEntry {
    pub frontmatter: FrontMatter,

    /// Preview of the body, always ending in the excerpt marker
    pub content: String,

    /// Route of the post, e.g. `/writings/foo/bar/`
    pub slug: String,

    /// Parsed `frontmatter.date`
    #[serde(skip)]
    pub date: Option<DateTime<Utc>>,

    /// Full source file path
    #[serde(skip)]
    pub source: PathBuf,
}

impl PostEntry {
    /// Slug without the base route and slashes, e.g. `foo/bar`
    pub fn stem<'a>(&'a self, route: &str) -> &'a str {
        self.slug
            .strip_prefix(route)
            .unwrap_or(&self.slug)
            .trim_matches('/')
    }

    pub fn title(&self) -> &str {
        self.frontmatter.title.as_deref().unwrap_or("Untitled")
    }
}

/// Slug stem of a post file relative to the posts directory
///
/// `foo/bar.mdx` becomes `foo/bar`, `foo/index.md` becomes `foo`.
pub fn slug_stem(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let without_ext = joined
        .strip_suffix(".mdx")
        .or_else(|| joined.strip_suffix(".md"))
        .unwrap_or(&joined);

    without_ext
        .strip_suffix("/index")
        .unwrap_or(without_ext)
        .to_string()
}

/// Public route of a slug stem under the base route
pub fn route_for(route: &str, stem: &str) -> String {
    format!("{}/{}/", route.trim_end_matches('/'), stem)
}

/// Public path of a post image, `/images/<stem>/<file>`
///
/// Root-absolute paths and remote URLs are already public and pass through.
pub fn image_path(stem: &str, file: &str) -> String {
    if is_relative_url(file) {
        format!("/images/{}/{}", stem, file)
    } else {
        file.to_string()
    }
}

/// Whether an image URL is relative to its post
pub fn is_relative_url(url: &str) -> bool {
    !(url.is_empty() || url.starts_with('/') || is_remote_url(url))
}

/// `https://...`, `//cdn...` or an inline `data:` URL
pub fn is_remote_url(url: &str) -> bool {
    url.starts_with("//") || url.starts_with("data:") || url.contains("://")
}

/// URL of the first inline image in a markdown body
pub fn first_image(body: &str) -> Option<&str> {
    INLINE_IMAGE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First `length` characters of the body followed by `marker`
///
/// The cut is not word- or markup-aware and the marker is appended even
/// when nothing was cut.
pub fn excerpt(body: &str, length: usize, marker: &str) -> String {
    let mut preview: String = body.chars().take(length).collect();
    preview.push_str(marker);
    preview
}

/// Newest first; undated entries sink to the bottom, ties go by slug
pub fn newest_first(a: &PostEntry, b: &PostEntry) -> Ordering {
    match (&a.date, &b.date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
}
