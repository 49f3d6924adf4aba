// src/core/asset_host.rs
//! Image uploads to the external asset host (Cloudinary upload API)

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, trace};

use crate::config::CloudinaryConfig;
use crate::types::UploadedAsset;
use crate::utils::{image_content_type, read_file_bytes};

const UPLOAD_TIMEOUT_SECS: u64 = 120;

#[rocket::async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, folder: &str) -> Result<UploadedAsset>;
}

/// Where the image to upload comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes { file_name: String, bytes: Vec<u8> },
}

/// Push one image to the host under `folder` and report where it landed.
/// The result is not stored anywhere.
pub async fn upload_image(
    host: &dyn AssetHost,
    source: ImageSource,
    folder: &str,
) -> Result<UploadedAsset> {
    let (file_name, bytes) = match source {
        ImageSource::Path(path) => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("Invalid image path: {}", path.display()))?;
            let bytes = read_file_bytes(&path).await?;
            (file_name, bytes)
        }
        ImageSource::Bytes { file_name, bytes } => (file_name, bytes),
    };

    let asset = host.upload(&file_name, bytes, folder).await?;
    info!("Uploaded {} to {}", file_name, asset.secure_url);
    Ok(asset)
}

pub struct CloudinaryClient {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.base_url, self.cloud_name)
    }

    /// Signed parameters are sorted by name, joined as a query string, suffixed with the secret
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[rocket::async_trait]
impl AssetHost for CloudinaryClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>, folder: &str) -> Result<UploadedAsset> {
        let content_type = image_content_type(file_name)?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", timestamp.as_str())]);
        let url = self.upload_url();

        let form = Form::new()
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(file_name.to_string())
                    .mime_str(content_type)
                    .context("Failed to create multipart")?,
            )
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        trace!("Calling asset upload service: {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<UploadedAsset>()
                .await
                .context("Failed to parse upload response")
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            error!("Asset upload error response: {}", error_text);
            anyhow::bail!("Upload returned error status {}: {}", status, error_text)
        }
    }
}
