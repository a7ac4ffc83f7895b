//! writings-rs: a small static site generator for a personal site
//!
//! Posts are Markdown files with YAML front-matter. They are collected into a
//! newest-first writings index (with banner images and short previews) and
//! rendered into individual pages using embedded Tera templates.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod images;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use content::{PostCollector, PostEntry};
use images::LocalImageResolver;

/// The site being built
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Posts directory
    pub posts_dir: PathBuf,
    /// Static assets directory (images live under `images/`)
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            static_dir,
            public_dir,
        })
    }

    /// Collector over this site's posts, resolving images from the static directory
    pub fn collector(&self) -> PostCollector<LocalImageResolver> {
        let resolver =
            LocalImageResolver::new(&self.static_dir, self.config.images.placeholder_size);
        PostCollector::new(&self.posts_dir, self.config.writings.clone(), resolver)
    }

    /// Collect the published posts, newest first
    pub async fn collect_posts(&self) -> Result<Vec<PostEntry>> {
        self.collector().collect_posts().await
    }

    /// Initialize a new site
    pub fn init(&self) -> anyhow::Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub async fn generate(&self) -> anyhow::Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }

    /// Create a new draft post
    pub fn new_post(&self, title: &str, path: Option<&str>) -> anyhow::Result<PathBuf> {
        commands::new::create_post(self, title, path)
    }
}
