//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::images::ImageProps;

/// Why a front-matter block could not be parsed
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front-matter block is never closed with `---`")]
    Unterminated,
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Custom deserializer that accepts any YAML scalar as a string
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct Scalar;

    impl<'de> Visitor<'de> for Scalar {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Scalar)
}

/// Only a real YAML boolean counts as a publish flag; `"false"` does not
fn publish_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Bool(flag) => Ok(Some(flag)),
        _ => Ok(None),
    }
}

/// Front-matter data of a post
///
/// The well-known keys are typed; everything else the author wrote is kept,
/// in order, in `extra`. Serialized, the whole thing is one flat mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(deserialize_with = "publish_flag", skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,

    /// Filled in by the collector once the banner is resolved
    #[serde(
        rename = "bannerImageProps",
        skip_serializing_if = "Option::is_none"
    )]
    pub banner_image_props: Option<ImageProps>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };

        // The rest of the opening line may only name the language
        let (opening, block) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        let language = opening.trim();
        if !(language.is_empty() || language == "yaml") {
            return Ok((FrontMatter::default(), content));
        }

        let mut offset = 0;
        for line in block.split_inclusive('\n') {
            // Trailing whitespace is tolerated on both delimiters
            if line.trim_end() == "---" {
                let yaml = &block[..offset];
                // Exactly one line break after the closing marker belongs to it
                let body = &block[offset + line.len()..];

                if yaml.trim().is_empty() {
                    return Ok((FrontMatter::default(), body));
                }

                let fm = serde_yaml::from_str::<FrontMatter>(yaml)?;
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }

    /// Whether the post asks to be left out of the site
    pub fn is_unpublished(&self) -> bool {
        self.published == Some(false)
    }

    /// Banner file name, if one is set and non-empty
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref().filter(|b| !b.is_empty())
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Parse a date string in various formats; naive values are taken as UTC
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"];

    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
banner: cover.png
tags:
  - rust
  - web
---
This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.banner(), Some("cover.png"));
        assert_eq!(fm.published, None);
        assert!(fm.extra.contains_key("tags"));
        assert_eq!(remaining, "This is the content.\n");
    }

    #[test]
    fn test_only_one_line_break_is_consumed() {
        let content = "---\ntitle: Spacing\n---\n\nFirst paragraph.";
        let (_, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(remaining, "\nFirst paragraph.");

        let crlf = "---\r\ntitle: Spacing\r\n---\r\nBody";
        let (fm, remaining) = FrontMatter::parse(crlf).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Spacing"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_trailing_spaces_on_delimiters() {
        let (fm, remaining) = FrontMatter::parse("---\ntitle: a\n--- \nb").unwrap();
        assert_eq!(fm.title.as_deref(), Some("a"));
        assert_eq!(remaining, "b");

        let (fm, remaining) = FrontMatter::parse("--- \ntitle: a\n---\t\r\nb").unwrap();
        assert_eq!(fm.title.as_deref(), Some("a"));
        assert_eq!(remaining, "b");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Just a body with no metadata.";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_horizontal_rule_is_not_a_delimiter() {
        let content = "----\ntitle: nope\n----\nbody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nbody").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, "body");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let content = "\u{feff}---\ntitle: BOM\n---\nbody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("BOM"));
        assert_eq!(remaining, "body");
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let content = "---\ntitle: Never closed\n\nbody";
        assert!(matches!(
            FrontMatter::parse(content),
            Err(FrontMatterError::Unterminated)
        ));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(matches!(
            FrontMatter::parse(content),
            Err(FrontMatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_published_flag() {
        let (fm, _) = FrontMatter::parse("---\npublished: false\n---\n").unwrap();
        assert!(fm.is_unpublished());

        let (fm, _) = FrontMatter::parse("---\npublished: true\n---\n").unwrap();
        assert!(!fm.is_unpublished());

        // Only a boolean counts
        let (fm, _) = FrontMatter::parse("---\npublished: \"false\"\n---\n").unwrap();
        assert!(!fm.is_unpublished());

        let (fm, _) = FrontMatter::parse("---\ntitle: x\n---\n").unwrap();
        assert!(!fm.is_unpublished());
    }

    #[test]
    fn test_empty_banner_counts_as_unset() {
        let (fm, _) = FrontMatter::parse("---\nbanner: ''\n---\n").unwrap();
        assert_eq!(fm.banner(), None);

        let (fm, _) = FrontMatter::parse("---\nbanner:\n---\n").unwrap();
        assert_eq!(fm.banner, None);
    }

    #[test]
    fn test_scalar_fields_accept_numbers() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 1984\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
    }

    #[test]
    fn test_extra_keys_keep_their_order() {
        let content = "---\ntitle: T\nzeta: 1\nalpha: 2\nmid: 3\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<_> = fm.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_serializes_as_flat_mapping() {
        let (mut fm, _) = FrontMatter::parse("---\ntitle: T\nmood: calm\n---\n").unwrap();
        fm.banner_image_props = Some(ImageProps {
            src: "/images/t/a.png".to_string(),
            width: 4,
            height: 3,
            blur_data_url: "data:image/png;base64,AAAA".to_string(),
        });

        let value = serde_json::to_value(&fm).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["mood"], "calm");
        assert_eq!(value["bannerImageProps"]["width"], 4);
        assert_eq!(
            value["bannerImageProps"]["blurDataURL"],
            "data:image/png;base64,AAAA"
        );
        assert!(value.get("banner").is_none());
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
    }

    #[test]
    fn test_parse_date_formats() {
        let day = |s: &str| parse_date_string(s).map(|d| d.format("%Y-%m-%d").to_string());

        assert_eq!(day("2022-06-15").as_deref(), Some("2022-06-15"));
        assert_eq!(day("2022/06/15").as_deref(), Some("2022-06-15"));
        assert_eq!(day("2022-06-15T08:00:00Z").as_deref(), Some("2022-06-15"));
        assert_eq!(day("2022-06-15T23:30:00-05:00").as_deref(), Some("2022-06-16"));
        assert_eq!(day("June 15, 2022").as_deref(), Some("2022-06-15"));
        assert_eq!(day("someday"), None);
        assert_eq!(day(""), None);
    }
}
