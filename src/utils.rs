// src/utils.rs
use anyhow::{Context, Result};
use std::path::Path;

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Map an image file name to the MIME type sent to the asset host
pub fn image_content_type(filename: &str) -> Result<&'static str> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        other => anyhow::bail!(
            "Unsupported image extension: {}. Allowed: jpg, jpeg, png, gif, webp, svg",
            other
        ),
    }
}

/// Trim a submitted form value, treating blank input as missing
pub fn clean_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

pub async fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(get_file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("me.jpeg").unwrap(), "image/jpeg");
        assert_eq!(image_content_type("logo.PNG").unwrap(), "image/png");
        assert!(image_content_type("cv.pdf").is_err());
        assert!(image_content_type("noext").is_err());
    }

    #[test]
    fn test_clean_field() {
        assert_eq!(clean_field(Some("  Ada ")), Some("Ada".to_string()));
        assert_eq!(clean_field(Some("   ")), None);
        assert_eq!(clean_field(None), None);
    }
}
