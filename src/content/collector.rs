//! Post collector - turns the posts directory into sorted writings entries

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::entry::{
    excerpt, first_image, image_path, is_remote_url, newest_first, route_for, slug_stem,
};
use super::{FrontMatter, PostEntry};
use crate::config::WritingsConfig;
use crate::error::{Error, Result};
use crate::images::ImageResolver;

/// Collects writings entries from a posts directory
///
/// Every call to [`PostCollector::collect_posts`] reads the directory afresh.
pub struct PostCollector<R> {
    posts_dir: PathBuf,
    options: WritingsConfig,
    resolver: R,
}

impl<R: ImageResolver> PostCollector<R> {
    /// Create a new collector
    pub fn new<P: AsRef<Path>>(posts_dir: P, options: WritingsConfig, resolver: R) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
            options,
            resolver,
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Collect every published post, newest first
    pub async fn collect_posts(&self) -> Result<Vec<PostEntry>> {
        let paths = post_file_paths(&self.posts_dir)?;
        self.collect_from(paths).await
    }

    /// Collect the given post files (relative to the posts directory)
    pub async fn collect_from<I>(&self, paths: I) -> Result<Vec<PostEntry>>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let strict = self.options.strict;

        let collected: Vec<Option<PostEntry>> = stream::iter(paths)
            .map(|relative| async move {
                match self.collect_one(&relative).await {
                    Err(e) if !strict => {
                        tracing::warn!("Skipping {:?}: {}", relative, e);
                        Ok(None)
                    }
                    other => other,
                }
            })
            .buffered(self.options.image_concurrency.max(1))
            .try_collect()
            .await?;

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut entries = Vec::with_capacity(collected.len());

        for entry in collected.into_iter().flatten() {
            if let Some(first) = seen.get(&entry.slug) {
                let err = Error::DuplicateSlug {
                    slug: entry.slug.clone(),
                    first: first.clone(),
                    second: entry.source.clone(),
                };
                if strict {
                    return Err(err);
                }
                tracing::warn!("Skipping duplicate: {}", err);
                continue;
            }
            seen.insert(entry.slug.clone(), entry.source.clone());
            entries.push(entry);
        }

        entries.sort_by(newest_first);

        tracing::info!("Collected {} writings", entries.len());
        Ok(entries)
    }

    /// Build the entry of a single post; `None` when it is unpublished
    async fn collect_one(&self, relative: &Path) -> Result<Option<PostEntry>> {
        let path = self.posts_dir.join(relative);

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;

        let (mut frontmatter, body) = FrontMatter::parse(&source).map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;

        if frontmatter.is_unpublished() {
            tracing::debug!("Skipping unpublished {:?}", relative);
            return Ok(None);
        }

        let stem = slug_stem(relative);
        let slug = route_for(&self.options.route, &stem);

        // Without a banner, the first image of the post stands in
        if frontmatter.banner().is_none() {
            if let Some(url) = first_image(body) {
                frontmatter.banner = Some(url.to_string());
            }
        }

        // Remote banners are linked as-is; there is nothing local to measure
        let banner_path = frontmatter
            .banner()
            .filter(|banner| !is_remote_url(banner))
            .map(|banner| image_path(&stem, banner));
        if let Some(image) = banner_path {
            match self.resolver.resolve(&image).await {
                Ok(props) => frontmatter.banner_image_props = Some(props),
                Err(source) => {
                    let err = Error::ImageResolution {
                        path: image,
                        source,
                    };
                    if self.options.strict {
                        return Err(err);
                    }
                    tracing::warn!("Keeping {:?} without banner props: {}", relative, err);
                }
            }
        }

        tracing::debug!("Collected {:?} as {}", relative, slug);

        Ok(Some(PostEntry {
            date: frontmatter.parse_date(),
            content: excerpt(
                body,
                self.options.excerpt_length,
                &self.options.excerpt_marker,
            ),
            frontmatter,
            slug,
            source: path,
        }))
    }
}

/// Markdown post files under the posts directory, relative to it
pub fn post_file_paths(posts_dir: &Path) -> Result<Vec<PathBuf>> {
    if !posts_dir.exists() {
        tracing::warn!("Posts directory {:?} does not exist", posts_dir);
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();

    for entry in WalkDir::new(posts_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| posts_dir.to_path_buf()),
            source: e.into(),
        })?;

        let path = entry.path();
        if entry.file_type().is_file() && is_post_file(path) {
            let relative = path.strip_prefix(posts_dir).unwrap_or(path);
            paths.push(relative.to_path_buf());
        }
    }

    Ok(paths)
}

/// Check if a file is a markdown post
fn is_post_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx")
        .unwrap_or(false)
}
