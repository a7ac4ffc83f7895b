//! Errors raised while collecting writings

use std::path::PathBuf;

use crate::content::FrontMatterError;
use crate::images::ImageError;

/// A failure that aborts a collection pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A post file could not be read
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A post file has a malformed front-matter block
    #[error("malformed front-matter in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    /// The banner image of a post could not be resolved
    #[error("failed to resolve banner image {path}: {source}")]
    ImageResolution {
        path: String,
        #[source]
        source: ImageError,
    },

    /// Two post files map onto the same route
    #[error("{second:?} and {first:?} both map to {slug}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
