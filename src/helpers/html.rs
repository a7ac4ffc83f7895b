//! HTML helper functions

use super::url::url_for;
use crate::config::SiteConfig;

/// Open Graph image with its pixel dimensions
#[derive(Debug, Clone)]
pub struct OgImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Generate a favicon link tag
pub fn favicon_tag(config: &SiteConfig, path: &str) -> String {
    let href = url_for(config, path);
    format!(r#"<link rel="icon" href="{}">"#, href)
}

/// Generate Open Graph meta tags
pub fn open_graph(
    title: &str,
    description: &str,
    url: &str,
    image: Option<&OgImage>,
    site_name: &str,
) -> String {
    let mut tags = vec![
        r#"<meta property="og:type" content="website">"#.to_string(),
        format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(title)
        ),
        format!(r#"<meta property="og:url" content="{}">"#, url),
        format!(
            r#"<meta property="og:site_name" content="{}">"#,
            html_escape(site_name)
        ),
    ];

    if !description.is_empty() {
        tags.push(format!(
            r#"<meta property="og:description" content="{}">"#,
            html_escape(description)
        ));
    }

    if let Some(img) = image {
        tags.push(format!(
            r#"<meta property="og:image" content="{}">"#,
            html_escape(&img.url)
        ));
        tags.push(format!(
            r#"<meta property="og:image:width" content="{}">"#,
            img.width
        ));
        tags.push(format!(
            r#"<meta property="og:image:height" content="{}">"#,
            img.height
        ));
    }

    tags.join("\n")
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_graph() {
        let image = OgImage {
            url: "https://og.example.com/Writings.png".to_string(),
            width: 1200,
            height: 630,
        };
        let tags = open_graph(
            "Tom & Jerry",
            "",
            "https://example.com/writings/",
            Some(&image),
            "My Site",
        );
        assert!(tags.contains(r#"<meta property="og:title" content="Tom &amp; Jerry">"#));
        assert!(tags.contains(r#"content="https://example.com/writings/""#));
        assert!(tags.contains(r#"<meta property="og:image:width" content="1200">"#));
        assert!(!tags.contains("og:description"));
    }

    #[test]
    fn test_favicon_tag() {
        let config = SiteConfig::default();
        assert_eq!(
            favicon_tag(&config, "/favicon.ico"),
            r#"<link rel="icon" href="/favicon.ico">"#
        );
    }
}
