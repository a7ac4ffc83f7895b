//! Generator module - writes the writings index and post pages

use anyhow::Result;
use chrono::Datelike;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{FrontMatter, MarkdownRenderer, PostEntry};
use crate::content::entry::{image_path, is_remote_url};
use crate::helpers::{favicon_tag, full_url_for, og_image_for, open_graph, url_for, OgImage};
use crate::templates::{
    EntryData, MenuItem, PageData, PostData, SiteData, TemplateRenderer, ViewsData, SITE_CSS,
};
use crate::Site;

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::with_theme(&site.config.highlight_theme),
        })
    }

    /// Generate every page from the collected entries (already sorted)
    pub fn generate(&self, entries: &[PostEntry]) -> Result<()> {
        fs::create_dir_all(&self.site.public_dir)?;

        // Copy static assets (images, favicon, ...)
        self.copy_static_assets()?;
        self.write_stylesheet()?;

        let site_data = self.build_site_data();
        let views = ViewsData {
            enable: self.site.config.views.enable,
            endpoint: url_for(&self.site.config, &self.site.config.views.endpoint),
        };

        self.generate_writings_index(entries, &site_data, &views)?;
        self.generate_post_pages(entries, &site_data, &views)?;

        Ok(())
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData {
        let config = &self.site.config;

        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            root: url_for(config, ""),
            favicon: favicon_tag(config, "/favicon.ico"),
            date_format: config.date_format.clone(),
            writings_route: url_for(config, &config.writings.route),
            menu: config
                .menu
                .iter()
                .map(|(name, path)| MenuItem {
                    name: name.clone(),
                    path: url_for(config, path),
                })
                .collect(),
            year: chrono::Local::now().year(),
        }
    }

    /// Open Graph tags for a page
    fn head_meta(&self, title: &str, path: &str) -> String {
        let config = &self.site.config;
        let image = og_image_for(config, title).map(|url| OgImage {
            url,
            width: config.seo.og_image_width,
            height: config.seo.og_image_height,
        });

        open_graph(
            title,
            &config.description,
            &full_url_for(config, path),
            image.as_ref(),
            &config.title,
        )
    }

    fn create_base_context(&self, site_data: &SiteData, views: &ViewsData, page: &PageData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context.insert("views", views);
        context.insert("page", page);
        context
    }

    /// Public URL of an image; local paths get the site root
    fn image_src(&self, src: &str) -> String {
        if is_remote_url(src) {
            src.to_string()
        } else {
            url_for(&self.site.config, src)
        }
    }

    /// Generate `<route>/index.html`, the list of post summaries
    fn generate_writings_index(
        &self,
        entries: &[PostEntry],
        site_data: &SiteData,
        views: &ViewsData,
    ) -> Result<()> {
        let writings = &self.site.config.writings;

        let entry_data: Vec<EntryData> = entries
            .iter()
            .map(|entry| {
                let banner_src = match (
                    &entry.frontmatter.banner_image_props,
                    entry.frontmatter.banner(),
                ) {
                    (Some(props), _) => Some(self.image_src(&props.src)),
                    (None, Some(banner)) => Some(
                        self.image_src(&image_path(entry.stem(&writings.route), banner)),
                    ),
                    (None, None) => None,
                };
                EntryData {
                    entry,
                    title: entry.title(),
                    url: url_for(&self.site.config, &entry.slug),
                    banner_src,
                }
            })
            .collect();

        let page = PageData {
            title: writings.title.clone(),
            path: url_for(&self.site.config, &writings.route),
            head_meta: self.head_meta(&writings.title, &writings.route),
        };

        let mut context = self.create_base_context(site_data, views, &page);
        context.insert("heading", &writings.title);
        context.insert("entries", &entry_data);

        let html = self.renderer.render("writings.html", &context)?;
        let output_path = self.write_page(&writings.route, &html)?;
        tracing::info!("Generated writings index with {} entries: {:?}", entries.len(), output_path);

        Ok(())
    }

    /// Generate one page per entry at its slug
    fn generate_post_pages(
        &self,
        entries: &[PostEntry],
        site_data: &SiteData,
        views: &ViewsData,
    ) -> Result<()> {
        let config = &self.site.config;
        let route = &config.writings.route;

        for entry in entries {
            let source = fs::read_to_string(&entry.source)
                .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", entry.source, e))?;
            let (_, body) = FrontMatter::parse(&source)
                .map_err(|e| anyhow::anyhow!("Failed to parse {:?}: {}", entry.source, e))?;

            let stem = entry.stem(route);
            let image_dir = url_for(config, &format!("/images/{}/", stem));

            let post = PostData {
                title: entry.title(),
                date: entry.frontmatter.date.as_deref(),
                slug: &entry.slug,
                banner: entry.frontmatter.banner_image_props.as_ref(),
                banner_src: entry
                    .frontmatter
                    .banner_image_props
                    .as_ref()
                    .map(|props| self.image_src(&props.src)),
                content: self.markdown.render_post(body, &image_dir)?,
            };

            let page = PageData {
                title: entry.title().to_string(),
                path: url_for(config, &entry.slug),
                head_meta: self.head_meta(entry.title(), &entry.slug),
            };

            let mut context = self.create_base_context(site_data, views, &page);
            context.insert("post", &post);

            let html = self.renderer.render("post.html", &context)?;
            // Output paths never carry the root; the deployment serves `public/` there
            let output_path = self.write_page(&entry.slug, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        Ok(())
    }

    /// Write `<public>/<path>/index.html`
    fn write_page(&self, path: &str, html: &str) -> Result<PathBuf> {
        // Strip leading slash from path to avoid creating absolute paths
        let clean_path = path.trim_matches('/');
        let output_path = self.site.public_dir.join(clean_path).join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        Ok(output_path)
    }

    /// Write the built-in stylesheet unless the site ships its own
    fn write_stylesheet(&self) -> Result<()> {
        let css_path = self.site.public_dir.join("css/site.css");
        if css_path.exists() {
            return Ok(());
        }
        fs::create_dir_all(self.site.public_dir.join("css"))?;
        fs::write(css_path, SITE_CSS)?;
        Ok(())
    }

    /// Copy everything under the static directory into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.site.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::copy(path, &dest)?;
                copied += 1;
            }
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }
}
