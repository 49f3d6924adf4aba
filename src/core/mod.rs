// src/core/mod.rs
//! Store access and the external collaborators the handlers talk to

pub mod asset_host;
pub mod bot_check;
pub mod database;
pub mod mail_relay;

pub use asset_host::{upload_image, AssetHost, CloudinaryClient, ImageSource};
pub use bot_check::{BotCheck, RecaptchaVerifier};
pub use database::{ContentRepository, Database};
pub use mail_relay::{HttpMailRelay, MailRelay, OutgoingEmail};
