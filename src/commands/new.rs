//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Front-matter used when the site has no `scaffolds/post.md`
const DEFAULT_SCAFFOLD: &str = r#"---
title: "{{ title }}"
date: {{ date }}
published: false
---
"#;

/// Create `posts/<slug>/index.mdx` as an unpublished draft
pub fn create_post(site: &Site, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = match path {
        Some(p) => p.trim_matches('/').to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a post path from title {:?}", title);
    }

    let target_dir = site.posts_dir.join(&slug);
    let file_path = target_dir.join("index.mdx");

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // Load scaffold template
    let scaffold_path = site.base_dir.join("scaffolds").join("post.md");
    let scaffold_content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        DEFAULT_SCAFFOLD.to_string()
    };

    // Replace template variables
    let content = scaffold_content
        .replace("{{ title }}", &title.replace('"', "\\\""))
        .replace("{{ date }}", &now.format("%Y-%m-%d").to_string());

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
