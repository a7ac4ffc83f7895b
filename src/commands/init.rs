//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Site;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Site
description: ''
author: ''

# URL
url: http://localhost:4000
root: /

# Directory
posts_dir: posts
static_dir: static
public_dir: public

# Date / Time format
date_format: YYYY-MM-DD
highlight_theme: base16-ocean.dark

menu:
  Home: /
  Writings: /writings/

# Writings index
writings:
  route: /writings/
  title: Writings
  excerpt_length: 150
  excerpt_marker: '...'
  # Skip (and log) broken posts instead of failing the build
  strict: true
  # Banner images resolved at once
  image_concurrency: 1

images:
  # Longest side of the blur placeholder, in pixels
  placeholder_size: 10

seo:
  # ':title' is replaced with the page title
  og_image: ''
  og_image_width: 1200
  og_image_height: 630

views:
  enable: true
  endpoint: /api/views/
"#;

const POST_SCAFFOLD: &str = r#"---
title: "{{ title }}"
date: {{ date }}
published: false
---
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("A site already exists at {:?}", target_dir);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("posts/hello-world"))?;
    fs::create_dir_all(target_dir.join("static/images/hello-world"))?;
    fs::create_dir_all(target_dir.join("scaffolds"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("scaffolds/post.md"), POST_SCAFFOLD)?;

    // Create a sample post
    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
---

Welcome! This is your very first post. Posts live under `posts/`, either as
`posts/<name>.md` or as `posts/<name>/index.mdx` next to nothing but the text.

Images for a post go in `static/images/<name>/`. Set `banner: cover.png` in the
front-matter to show one on the writings index, or let the first image in the
post stand in for it.

## Quick Start

```bash
$ writings-rs new "My New Post"
$ writings-rs server
```

New posts start with `published: false`. Remove that line when they are ready.
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("posts/hello-world/index.md"), sample_post)?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}

/// Run the init command for an existing site handle
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_then_collect() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.writings.excerpt_length, 150);
        assert!(site.config.views.enable);

        let entries = site.collect_posts().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "/writings/hello-world/");
        assert_eq!(entries[0].title(), "Hello World");
        assert!(entries[0].date.is_some());
        assert!(entries[0].content.ends_with("..."));
        assert!(entries[0].frontmatter.banner.is_none());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }

    #[test]
    fn test_init_through_site_handle() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new-site");

        Site::new(&target).unwrap().init().unwrap();
        assert!(target.join("_config.yml").exists());
        assert!(target.join("posts/hello-world/index.md").exists());
        assert!(target.join("static/images/hello-world").is_dir());

        let site = Site::new(&target).unwrap();
        assert!(site.init().is_err());
    }
}
