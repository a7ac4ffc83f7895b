//! List the writings that would be published

use anyhow::Result;

use crate::content::PostEntry;
use crate::helpers::format_date;
use crate::Site;

/// Print the collected writings, newest first
pub async fn run(site: &Site, json: bool) -> Result<()> {
    let entries = site.collect_posts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Writings ({}):", entries.len());
    for entry in &entries {
        println!("  {}", summary_line(entry, &site.config.date_format));
    }

    Ok(())
}

/// `date - title [slug]`
fn summary_line(entry: &PostEntry, date_format: &str) -> String {
    let date = entry
        .date
        .map(|d| format_date(&d, date_format))
        .unwrap_or_else(|| "(no date)".to_string());
    format!("{} - {} [{}]", date, entry.title(), entry.slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_date_string, FrontMatter};
    use std::path::PathBuf;

    #[test]
    fn test_summary_line() {
        let entry = PostEntry {
            frontmatter: FrontMatter {
                title: Some("Hello".to_string()),
                date: Some("2021-01-01".to_string()),
                ..Default::default()
            },
            content: "Hi...".to_string(),
            slug: "/writings/hello/".to_string(),
            date: parse_date_string("2021-01-01"),
            source: PathBuf::from("posts/hello.md"),
        };
        assert_eq!(
            summary_line(&entry, "YYYY-MM-DD"),
            "2021-01-01 - Hello [/writings/hello/]"
        );

        let undated = PostEntry { date: None, ..entry };
        assert_eq!(
            summary_line(&undated, "YYYY-MM-DD"),
            "(no date) - Hello [/writings/hello/]"
        );
    }
}
