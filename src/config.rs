// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_UPLOAD_FOLDER: &str = "portfolio_uploads";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything the site needs at runtime, built once in `main` and handed to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub templates_path: PathBuf,
    pub mail: MailConfig,
    pub recaptcha: RecaptchaConfig,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    pub default_from_email: String,
    /// Every contact submission is delivered to this single address.
    pub recipient: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecaptchaConfig {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default = "default_upload_base_url")]
    pub base_url: String,
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_upload_folder")]
    pub default_folder: String,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: AppConfig,
    production: AppConfig,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

fn default_upload_base_url() -> String {
    DEFAULT_UPLOAD_BASE_URL.to_string()
}

fn default_upload_folder() -> String {
    DEFAULT_UPLOAD_FOLDER.to_string()
}

impl AppConfig {
    /// Load configuration for the current environment from a YAML file
    pub fn load(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. Server cannot start without configuration.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config = Self::from_yaml(&content, &environment)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.resolve_paths()
    }

    fn get_environment() -> String {
        std::env::var("PORTFOLIO_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Parse a config file and pick the section for `environment`
    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    /// Secrets are usually injected through the environment rather than committed to the file
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 5] = [
            ("RECAPTCHA_PUBLIC_KEY", &mut self.recaptcha.public_key),
            ("RECAPTCHA_PRIVATE_KEY", &mut self.recaptcha.private_key),
            ("MAIL_API_KEY", &mut self.mail.api_key),
            ("CLOUDINARY_API_KEY", &mut self.cloudinary.api_key),
            ("CLOUDINARY_API_SECRET", &mut self.cloudinary.api_secret),
        ];

        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }
    }

    fn resolve_paths(self) -> Result<Self> {
        Ok(Self {
            database_path: resolve_path(&self.database_path)?,
            templates_path: resolve_path(&self.templates_path)?,
            ..self
        })
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  database_path: data/portfolio.db
  templates_path: templates
  mail:
    api_url: http://localhost:9000/emails
    default_from_email: site@example.com
    recipient: owner@example.com
  recaptcha:
    public_key: local-public
  cloudinary:
    cloud_name: demo
production:
  database_path: /app/data/portfolio.db
  templates_path: /app/templates
  mail:
    api_url: https://mail.example.com/emails
    api_key: file-key
    default_from_email: noreply@example.com
    recipient: owner@example.com
    timeout_seconds: 10
  recaptcha:
    public_key: prod-public
    private_key: prod-private
  cloudinary:
    cloud_name: prod-cloud
    default_folder: site
"#;

    #[test]
    fn test_local_section_with_defaults() {
        let config = AppConfig::from_yaml(SAMPLE, "local").unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/portfolio.db"));
        assert_eq!(config.mail.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.mail.api_key, "");
        assert_eq!(config.recaptcha.verify_url, DEFAULT_VERIFY_URL);
        assert_eq!(config.cloudinary.base_url, DEFAULT_UPLOAD_BASE_URL);
        assert_eq!(config.cloudinary.default_folder, DEFAULT_UPLOAD_FOLDER);
    }

    #[test]
    fn test_unknown_environment_falls_back_to_local() {
        let config = AppConfig::from_yaml(SAMPLE, "staging").unwrap();
        assert_eq!(config.recaptcha.public_key, "local-public");
    }

    #[test]
    fn test_production_section() {
        let config = AppConfig::from_yaml(SAMPLE, "production").unwrap();
        assert_eq!(config.mail.timeout_seconds, 10);
        assert_eq!(config.recaptcha.private_key, "prod-private");
        assert_eq!(config.cloudinary.default_folder, "site");
    }

    #[test]
    fn test_env_overrides_replace_secrets() {
        let mut config = AppConfig::from_yaml(SAMPLE, "production").unwrap();
        config.apply_overrides(|key| match key {
            "MAIL_API_KEY" => Some("env-key".to_string()),
            "RECAPTCHA_PRIVATE_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.mail.api_key, "env-key");
        // empty values do not clobber the file
        assert_eq!(config.recaptcha.private_key, "prod-private");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("local: [", "local").is_err());
    }
}
