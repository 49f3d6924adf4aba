// src/contact.rs
//! Contact form: validation, message composition and relaying

use indexmap::IndexMap;
use regex::Regex;
use rocket::form::FromForm;
use rocket::http::Status;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{error, info, warn};

use crate::config::MailConfig;
use crate::core::{BotCheck, MailRelay, OutgoingEmail};
use crate::types::ContactResponse;
use crate::utils::clean_field;

pub const SUBJECT_PREFIX: &str = "New Contact Form Submission: ";
pub const CAPTCHA_FIELD: &str = "captcha";
pub const CAPTCHA_INPUT_NAME: &str = "g-recaptcha-response";

pub const MSG_SENT: &str = "Your message has been sent. Thank you!";
pub const MSG_SEND_FAILED: &str =
    "There was an error sending your message. Please try again later.";
pub const MSG_INVALID: &str = "Please correct the errors in the form.";

pub const ERR_REQUIRED: &str = "This field is required.";
pub const ERR_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const ERR_CAPTCHA: &str = "Error verifying reCAPTCHA, please try again.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Per-field error messages, in form order
pub type FieldErrors = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub max_length: usize,
}

pub const NAME_FIELD: FormField = FormField {
    name: "your_name",
    label: "Your Name",
    input_type: "text",
    max_length: 100,
};

pub const EMAIL_FIELD: FormField = FormField {
    name: "your_email",
    label: "Your Email",
    input_type: "email",
    max_length: 254,
};

pub const SUBJECT_FIELD: FormField = FormField {
    name: "subject",
    label: "Subject",
    input_type: "text",
    max_length: 150,
};

pub const MESSAGE_FIELD: FormField = FormField {
    name: "message",
    label: "Message",
    input_type: "textarea",
    max_length: 5000,
};

pub const CONTACT_FIELDS: [FormField; 4] = [NAME_FIELD, EMAIL_FIELD, SUBJECT_FIELD, MESSAGE_FIELD];

/// Unbound form handed to the home page template
#[derive(Debug, Clone, Serialize)]
pub struct ContactFormView {
    pub fields: Vec<FormField>,
    pub captcha_input: &'static str,
}

impl ContactFormView {
    pub fn empty() -> Self {
        Self {
            fields: CONTACT_FIELDS.to_vec(),
            captcha_input: CAPTCHA_INPUT_NAME,
        }
    }
}

/// Raw submission. Every field is optional so missing keys become field errors, not a rejected request.
#[derive(Debug, Clone, Default, FromForm)]
pub struct ContactForm {
    pub your_name: Option<String>,
    pub your_email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    #[field(name = "g-recaptcha-response")]
    pub captcha_token: Option<String>,
}

/// A validated submission. Lives for one request and is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

fn too_long(max: usize, len: usize) -> String {
    format!(
        "Ensure this value has at most {} characters (it has {}).",
        max, len
    )
}

/// Required + length check. Returns the cleaned value when the field is acceptable.
fn check_text(errors: &mut FieldErrors, field: &FormField, raw: Option<&str>) -> Option<String> {
    let Some(value) = clean_field(raw) else {
        errors.insert(field.name.to_string(), ERR_REQUIRED.to_string());
        return None;
    };

    let len = value.chars().count();
    if len > field.max_length {
        errors.insert(field.name.to_string(), too_long(field.max_length, len));
        return None;
    }

    Some(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

impl ContactForm {
    /// Check every field and the bot-check token. Only the first problem of each field is reported.
    pub async fn validate(&self, bot_check: &dyn BotCheck) -> Result<ContactSubmission, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = check_text(&mut errors, &NAME_FIELD, self.your_name.as_deref());

        let email = match clean_field(self.your_email.as_deref()) {
            Some(value) if !is_valid_email(&value) => {
                errors.insert(EMAIL_FIELD.name.to_string(), ERR_INVALID_EMAIL.to_string());
                None
            }
            cleaned => check_text(&mut errors, &EMAIL_FIELD, cleaned.as_deref()),
        };

        let subject = check_text(&mut errors, &SUBJECT_FIELD, self.subject.as_deref());
        let message = check_text(&mut errors, &MESSAGE_FIELD, self.message.as_deref());

        match clean_field(self.captcha_token.as_deref()) {
            None => {
                errors.insert(CAPTCHA_FIELD.to_string(), ERR_REQUIRED.to_string());
            }
            Some(token) => match bot_check.verify(&token).await {
                Ok(true) => {}
                Ok(false) => {
                    errors.insert(CAPTCHA_FIELD.to_string(), ERR_CAPTCHA.to_string());
                }
                Err(e) => {
                    warn!("Bot-check verification failed: {:#}", e);
                    errors.insert(CAPTCHA_FIELD.to_string(), ERR_CAPTCHA.to_string());
                }
            },
        }

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
                Ok(ContactSubmission {
                    name,
                    email,
                    subject,
                    message,
                })
            }
            _ => Err(errors),
        }
    }
}

impl ContactSubmission {
    pub fn email_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
            self.name, self.email, self.subject, self.message
        )
    }

    /// Address the message to the site owner; replies go back to the visitor.
    pub fn to_email(&self, mail: &MailConfig) -> OutgoingEmail {
        OutgoingEmail {
            from: mail.default_from_email.clone(),
            to: vec![mail.recipient.clone()],
            reply_to: vec![self.email.clone()],
            subject: format!("{}{}", SUBJECT_PREFIX, self.subject),
            body: self.email_body(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContactOutcome {
    Sent,
    Invalid(FieldErrors),
    RelayFailed,
}

impl ContactOutcome {
    pub fn status(&self) -> Status {
        match self {
            ContactOutcome::Sent => Status::Ok,
            ContactOutcome::Invalid(_) => Status::BadRequest,
            ContactOutcome::RelayFailed => Status::InternalServerError,
        }
    }

    pub fn into_response(self) -> (Status, ContactResponse) {
        let status = self.status();
        let body = match self {
            ContactOutcome::Sent => ContactResponse::success(MSG_SENT),
            ContactOutcome::Invalid(errors) => ContactResponse::invalid(errors, MSG_INVALID),
            ContactOutcome::RelayFailed => ContactResponse::error(MSG_SEND_FAILED),
        };
        (status, body)
    }
}

/// Validate, then hand exactly one message to the relay. Send failures are logged and
/// reported as a generic error; nothing is retried or queued.
pub async fn submit_contact(
    form: &ContactForm,
    bot_check: &dyn BotCheck,
    relay: &dyn MailRelay,
    mail: &MailConfig,
) -> ContactOutcome {
    let submission = match form.validate(bot_check).await {
        Ok(submission) => submission,
        Err(errors) => {
            warn!(
                "Contact form rejected, invalid fields: {:?}",
                errors.keys().collect::<Vec<_>>()
            );
            return ContactOutcome::Invalid(errors);
        }
    };

    match relay.send(&submission.to_email(mail)).await {
        Ok(()) => {
            info!("Contact message relayed for {}", submission.email);
            ContactOutcome::Sent
        }
        Err(e) => {
            error!("Error sending email: {:#}", e);
            ContactOutcome::RelayFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::Mutex;

    struct FixedBotCheck(Option<bool>);

    #[rocket::async_trait]
    impl BotCheck for FixedBotCheck {
        async fn verify(&self, _token: &str) -> Result<bool> {
            self.0.ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    #[derive(Default)]
    struct RecordingRelay {
        fail: bool,
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[rocket::async_trait]
    impl MailRelay for RecordingRelay {
        async fn send(&self, email: &OutgoingEmail) -> Result<()> {
            if self.fail {
                anyhow::bail!("SMTP 451 temporary failure");
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn mail_config() -> MailConfig {
        MailConfig {
            api_url: "http://unused".to_string(),
            api_key: String::new(),
            default_from_email: "site@example.com".to_string(),
            recipient: "owner@example.com".to_string(),
            timeout_seconds: 5,
        }
    }

    fn valid_form() -> ContactForm {
        ContactForm {
            your_name: Some("A".to_string()),
            your_email: Some("a@x.com".to_string()),
            subject: Some("Hi".to_string()),
            message: Some("Test".to_string()),
            captcha_token: Some("token".to_string()),
        }
    }

    #[tokio::test]
    async fn test_valid_submission_sends_one_email() {
        let relay = RecordingRelay::default();
        let outcome = submit_contact(
            &valid_form(),
            &FixedBotCheck(Some(true)),
            &relay,
            &mail_config(),
        )
        .await;

        assert_eq!(outcome, ContactOutcome::Sent);
        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.subject, "New Contact Form Submission: Hi");
        assert_eq!(email.reply_to, vec!["a@x.com".to_string()]);
        assert_eq!(email.to, vec!["owner@example.com".to_string()]);
        assert_eq!(email.from, "site@example.com");
        assert_eq!(email.body, "Name: A\nEmail: a@x.com\nSubject: Hi\n\nTest");
    }

    #[tokio::test]
    async fn test_empty_email_is_reported_alone() {
        let relay = RecordingRelay::default();
        let form = ContactForm {
            your_email: Some(String::new()),
            ..valid_form()
        };

        let outcome = submit_contact(&form, &FixedBotCheck(Some(true)), &relay, &mail_config()).await;

        let mut expected = FieldErrors::new();
        expected.insert("your_email".to_string(), ERR_REQUIRED.to_string());
        assert_eq!(outcome, ContactOutcome::Invalid(expected));
        assert!(relay.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_invalid_field_gets_exactly_one_message() {
        let form = ContactForm {
            your_name: Some("x".repeat(101)),
            your_email: Some("not-an-email".to_string()),
            subject: None,
            message: Some("   ".to_string()),
            captcha_token: None,
        };

        let errors = form.validate(&FixedBotCheck(Some(true))).await.unwrap_err();
        let keys: Vec<_> = errors.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["your_name", "your_email", "subject", "message", "captcha"]
        );
        assert_eq!(
            errors["your_name"],
            "Ensure this value has at most 100 characters (it has 101)."
        );
        assert_eq!(errors["your_email"], ERR_INVALID_EMAIL);
        assert_eq!(errors["subject"], ERR_REQUIRED);
        assert_eq!(errors["message"], ERR_REQUIRED);
        assert_eq!(errors["captcha"], ERR_REQUIRED);
    }

    #[tokio::test]
    async fn test_failed_bot_check_blocks_mail() {
        let relay = RecordingRelay::default();
        let outcome = submit_contact(
            &valid_form(),
            &FixedBotCheck(Some(false)),
            &relay,
            &mail_config(),
        )
        .await;

        let mut expected = FieldErrors::new();
        expected.insert(CAPTCHA_FIELD.to_string(), ERR_CAPTCHA.to_string());
        assert_eq!(outcome, ContactOutcome::Invalid(expected));
        assert!(relay.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_bot_check_counts_as_invalid_token() {
        let errors = valid_form()
            .validate(&FixedBotCheck(None))
            .await
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[CAPTCHA_FIELD], ERR_CAPTCHA);
    }

    #[tokio::test]
    async fn test_relay_failure_is_generic_server_error() {
        let relay = RecordingRelay {
            fail: true,
            ..Default::default()
        };
        let outcome = submit_contact(
            &valid_form(),
            &FixedBotCheck(Some(true)),
            &relay,
            &mail_config(),
        )
        .await;

        assert_eq!(outcome, ContactOutcome::RelayFailed);
        let (status, body) = outcome.into_response();
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body.message, MSG_SEND_FAILED);
        assert!(body.errors.is_none());
        assert!(!body.message.contains("451"));
    }

    #[tokio::test]
    async fn test_values_are_trimmed() {
        let form = ContactForm {
            your_name: Some("  Ada Lovelace ".to_string()),
            your_email: Some(" ada@example.org ".to_string()),
            ..valid_form()
        };

        let submission = form.validate(&FixedBotCheck(Some(true))).await.unwrap();
        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.email, "ada@example.org");
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn test_outcome_statuses() {
        assert_eq!(ContactOutcome::Sent.status(), Status::Ok);
        assert_eq!(
            ContactOutcome::Invalid(FieldErrors::new()).status(),
            Status::BadRequest
        );

        let (_, body) = ContactOutcome::Sent.into_response();
        assert!(body.is_success());
        assert_eq!(body.message, MSG_SENT);
    }
}
