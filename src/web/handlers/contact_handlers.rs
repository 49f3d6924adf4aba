// src/web/handlers/contact_handlers.rs
use crate::config::AppConfig;
use crate::contact::{submit_contact, ContactForm};
use crate::types::ContactResponse;
use crate::web::types::Services;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn submit_contact_handler(
    form: &ContactForm,
    services: &State<Services>,
    config: &State<AppConfig>,
) -> (Status, Json<ContactResponse>) {
    info!("Contact form submitted");

    let outcome = submit_contact(
        form,
        services.bot_check.as_ref(),
        services.mail_relay.as_ref(),
        &config.mail,
    )
    .await;

    let (status, body) = outcome.into_response();
    (status, Json(body))
}
