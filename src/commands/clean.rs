//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the generated public directory
pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_public_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public/writings")).unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();

        let site = Site::new(dir.path()).unwrap();
        run(&site).unwrap();
        assert!(!dir.path().join("public").exists());
        assert!(dir.path().join("posts").exists());

        // Cleaning twice is fine
        run(&site).unwrap();
    }
}
