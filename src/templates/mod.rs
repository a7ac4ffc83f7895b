//! Built-in site templates using the Tera template engine
//!
//! The layout shell, the writings index and the post page are embedded
//! directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::{parse_date_string, PostEntry};
use crate::helpers::{date_xml, format_date};
use crate::images::ImageProps;

/// Default stylesheet written to `css/site.css`
pub const SITE_CSS: &str = include_str!("site/site.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post previews and rendered bodies are inserted as-is; plain text
        // goes through the `escape` filter in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("writings.html", include_str!("site/writings.html")),
            ("post.html", include_str!("site/post.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/views.html",
                include_str!("site/partials/views.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("date_xml", date_xml_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format a front-matter date string
///
/// Values that are not a recognizable date are passed through untouched.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    match parse_date_string(&s) {
        Some(date) => Ok(tera::Value::String(format_date(&date, &format))),
        None => Ok(tera::Value::String(s)),
    }
}

/// Tera filter: machine-readable date for `<time datetime>`
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_xml", "value", String, value);
    match parse_date_string(&s) {
        Some(date) => Ok(tera::Value::String(date_xml(&date))),
        None => Ok(tera::Value::String(String::new())),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub root: String,
    pub favicon: String,
    pub date_format: String,
    pub writings_route: String,
    pub menu: Vec<MenuItem>,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

/// Per-page head data
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub path: String,
    pub head_meta: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewsData {
    pub enable: bool,
    pub endpoint: String,
}

/// A writings entry as the index template sees it
#[derive(Debug, Clone, Serialize)]
pub struct EntryData<'a> {
    #[serde(flatten)]
    pub entry: &'a PostEntry,
    pub title: &'a str,
    /// Link to the post, including the site root
    pub url: String,
    /// Where the banner is served from, if the entry has one
    pub banner_src: Option<String>,
}

/// A full post page
#[derive(Debug, Clone, Serialize)]
pub struct PostData<'a> {
    pub title: &'a str,
    pub date: Option<&'a str>,
    pub slug: &'a str,
    pub banner: Option<&'a ImageProps>,
    pub banner_src: Option<String>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(
        f: fn(&tera::Value, &HashMap<String, tera::Value>) -> tera::Result<tera::Value>,
        value: &str,
        format: Option<&str>,
    ) -> String {
        let mut args = HashMap::new();
        if let Some(format) = format {
            args.insert("format".to_string(), tera::Value::String(format.to_string()));
        }
        f(&tera::Value::String(value.to_string()), &args)
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_date_format_filter() {
        assert_eq!(filter(date_format_filter, "2022-06-15", None), "2022-06-15");
        assert_eq!(
            filter(date_format_filter, "2022-06-15", Some("LL")),
            "June 15, 2022"
        );
        assert_eq!(filter(date_format_filter, "whenever", Some("LL")), "whenever");
    }

    #[test]
    fn test_date_xml_filter() {
        assert_eq!(
            filter(date_xml_filter, "2022-06-15", None),
            "2022-06-15T00:00:00+00:00"
        );
        assert_eq!(filter(date_xml_filter, "whenever", None), "");
    }

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }
}
