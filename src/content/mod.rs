//! Content module - front-matter, writings entries and markdown rendering

pub mod collector;
pub mod entry;
mod frontmatter;
mod markdown;

pub use collector::{post_file_paths, PostCollector};
pub use entry::PostEntry;
pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterError};
pub use markdown::MarkdownRenderer;
