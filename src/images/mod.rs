//! Image metadata resolution
//!
//! Banner images are looked up by their public path (`/images/<slug>/<file>`)
//! and described by their dimensions plus a tiny blurred placeholder that the
//! writings index shows while the real image loads.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Properties needed to render an image without layout shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    pub src: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "blurDataURL")]
    pub blur_data_url: String,
}

/// Why an image could not be resolved
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("no image at {0:?}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    #[error("image task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Turns a public image path into [`ImageProps`]
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, public_path: &str) -> Result<ImageProps, ImageError>;
}

/// Resolves images from the site's static directory
pub struct LocalImageResolver {
    static_dir: PathBuf,
    placeholder_size: u32,
}

impl LocalImageResolver {
    pub fn new<P: AsRef<Path>>(static_dir: P, placeholder_size: u32) -> Self {
        Self {
            static_dir: static_dir.as_ref().to_path_buf(),
            placeholder_size: placeholder_size.max(1),
        }
    }

    /// Map a public path onto the static directory
    fn file_for(&self, public_path: &str) -> PathBuf {
        let decoded = percent_decode_str(public_path).decode_utf8_lossy();
        self.static_dir.join(decoded.trim_start_matches('/'))
    }
}

#[async_trait]
impl ImageResolver for LocalImageResolver {
    async fn resolve(&self, public_path: &str) -> Result<ImageProps, ImageError> {
        let file = self.file_for(public_path);
        if !tokio::fs::try_exists(&file).await? {
            return Err(ImageError::NotFound(file));
        }

        let size = self.placeholder_size;
        let (width, height, blur_data_url) =
            tokio::task::spawn_blocking(move || describe_image(&file, size)).await??;

        tracing::debug!("Resolved {} ({}x{})", public_path, width, height);

        Ok(ImageProps {
            src: public_path.to_string(),
            width,
            height,
            blur_data_url,
        })
    }
}

/// Decode an image and build its base64 placeholder
fn describe_image(file: &Path, placeholder_size: u32) -> Result<(u32, u32, String), ImageError> {
    let img = image::ImageReader::open(file)?
        .with_guessed_format()?
        .decode()?;

    let mut png = Vec::new();
    img.thumbnail(placeholder_size, placeholder_size)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    Ok((
        img.width(),
        img.height(),
        format!("data:image/png;base64,{}", STANDARD.encode(&png)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(dir: &Path, relative: &str, width: u32, height: u32) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(width, height, Rgb([200, 100, 50]))
            .save(&path)
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_dimensions_and_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "images/hello/cover.png", 64, 32);

        let resolver = LocalImageResolver::new(dir.path(), 10);
        let props = resolver.resolve("/images/hello/cover.png").await.unwrap();

        assert_eq!(props.src, "/images/hello/cover.png");
        assert_eq!((props.width, props.height), (64, 32));
        assert!(props.blur_data_url.starts_with("data:image/png;base64,"));

        let encoded = props
            .blur_data_url
            .trim_start_matches("data:image/png;base64,");
        let png = STANDARD.decode(encoded).unwrap();
        let thumb = image::load_from_memory(&png).unwrap();
        assert!(thumb.width() <= 10 && thumb.height() <= 10);
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "images/trip/my photo.png", 8, 8);

        let resolver = LocalImageResolver::new(dir.path(), 4);
        let props = resolver.resolve("/images/trip/my%20photo.png").await.unwrap();
        assert_eq!(props.src, "/images/trip/my%20photo.png");
        assert_eq!(props.width, 8);
    }

    #[tokio::test]
    async fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = LocalImageResolver::new(dir.path(), 10);
        let err = resolver.resolve("/images/none/missing.png").await.unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_undecodable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images/bad/cover.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"definitely not a png").unwrap();

        let resolver = LocalImageResolver::new(dir.path(), 10);
        let err = resolver.resolve("/images/bad/cover.png").await.unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
