//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Rendering
    pub date_format: String,
    pub highlight_theme: String,

    /// Header navigation (IndexMap keeps the YAML order of the entries)
    pub menu: IndexMap<String, String>,

    #[serde(default)]
    pub writings: WritingsConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub views: ViewsConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut menu = IndexMap::new();
        menu.insert("Home".to_string(), "/".to_string());
        menu.insert("Writings".to_string(), "/writings/".to_string());

        Self {
            title: "My Site".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            posts_dir: "posts".to_string(),
            static_dir: "static".to_string(),
            public_dir: "public".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            highlight_theme: "base16-ocean.dark".to_string(),

            menu,

            writings: WritingsConfig::default(),
            images: ImagesConfig::default(),
            seo: SeoConfig::default(),
            views: ViewsConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Writings index and post collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WritingsConfig {
    /// Base route every post slug is mounted under
    pub route: String,
    /// Heading and page title of the index
    pub title: String,
    /// Number of characters of the body kept in the preview
    pub excerpt_length: usize,
    /// Appended to every preview
    pub excerpt_marker: String,
    /// Abort the whole run on the first broken post instead of skipping it
    pub strict: bool,
    /// How many posts may resolve their banner image at the same time
    pub image_concurrency: usize,
}

impl Default for WritingsConfig {
    fn default() -> Self {
        Self {
            route: "/writings/".to_string(),
            title: "Writings".to_string(),
            excerpt_length: 150,
            excerpt_marker: "...".to_string(),
            strict: true,
            image_concurrency: 1,
        }
    }
}

/// Image metadata settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Longest side, in pixels, of the blur placeholder
    pub placeholder_size: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            placeholder_size: 10,
        }
    }
}

/// Open Graph metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    /// Social card URL; `:title` is replaced with the url-encoded page title
    pub og_image: String,
    pub og_image_width: u32,
    pub og_image_height: u32,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            og_image: String::new(),
            og_image_width: 1200,
            og_image_height: 630,
        }
    }
}

/// View counter hook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub enable: bool,
    pub endpoint: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            endpoint: "/api/views/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.writings.route, "/writings/");
        assert_eq!(config.writings.excerpt_length, 150);
        assert_eq!(config.writings.excerpt_marker, "...");
        assert!(config.writings.strict);
        assert_eq!(config.writings.image_concurrency, 1);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Aravind's Notes
url: https://example.com
menu:
  Writings: /writings/
  About: /about/
writings:
  strict: false
  image_concurrency: 4
unknown_key: kept
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Aravind's Notes");
        assert_eq!(config.url, "https://example.com");
        assert!(!config.writings.strict);
        assert_eq!(config.writings.image_concurrency, 4);
        // Untouched nested fields keep their defaults
        assert_eq!(config.writings.excerpt_length, 150);
        assert_eq!(config.posts_dir, "posts");

        let menu: Vec<_> = config.menu.keys().collect();
        assert_eq!(menu, vec!["Writings", "About"]);
        assert!(config.extra.contains_key("unknown_key"));
    }
}
