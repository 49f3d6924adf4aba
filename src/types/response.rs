// src/types/response.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// JSON body returned by the contact form endpoint, for success and failure alike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<IndexMap<String, String>>,
    pub message: String,
}

impl ContactResponse {
    pub fn success(message: &str) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            errors: None,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            errors: None,
            message: message.to_string(),
        }
    }

    pub fn invalid(errors: IndexMap<String, String>, message: &str) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            errors: Some(errors),
            message: message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

// ===== Upstream service responses =====

/// Reply of the bot-check `siteverify` endpoint.
#[derive(Debug, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

/// Subset of the asset host's upload reply that we care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_has_no_errors_key() {
        let body = serde_json::to_value(ContactResponse::success("ok")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success", "message": "ok"}));
    }

    #[test]
    fn test_invalid_body_keeps_field_order() {
        let mut errors = IndexMap::new();
        errors.insert("your_name".to_string(), "required".to_string());
        errors.insert("captcha".to_string(), "bad".to_string());

        let text = serde_json::to_string(&ContactResponse::invalid(errors, "fix it")).unwrap();
        assert_eq!(
            text,
            r#"{"status":"error","errors":{"your_name":"required","captcha":"bad"},"message":"fix it"}"#
        );
    }

    #[test]
    fn test_site_verify_error_codes_default() {
        let parsed: SiteVerifyResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(parsed.success);
        assert!(parsed.error_codes.is_empty());
    }
}
