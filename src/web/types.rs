// src/web/types.rs
use std::sync::Arc;

use crate::core::{BotCheck, MailRelay};

pub const HOME_TEMPLATE: &str = "portfolio/portfolio_main";
pub const DIGITAL_CV_TEMPLATE: &str = "portfolio/digital_cv";
pub const NOT_FOUND_TEMPLATE: &str = "layouts/page-404";

/// External collaborators of the contact form, injected at startup
pub struct Services {
    pub mail_relay: Arc<dyn MailRelay>,
    pub bot_check: Arc<dyn BotCheck>,
}

impl Services {
    pub fn new(mail_relay: Arc<dyn MailRelay>, bot_check: Arc<dyn BotCheck>) -> Self {
        Self {
            mail_relay,
            bot_check,
        }
    }
}
