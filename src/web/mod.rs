// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::config::AppConfig;
use crate::contact::{ContactForm, MSG_INVALID};
use crate::core::{Database, HttpMailRelay, RecaptchaVerifier};
use crate::types::ContactResponse;
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catchers, get, post, routes, Build, Rocket, State};
use rocket_dyn_templates::{context, Template};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Room for every field at its maximum length, percent-encoded
const FORM_LIMIT_KIB: u64 = 128;

#[get("/")]
pub async fn home_page(
    db: &State<Database>,
    config: &State<AppConfig>,
) -> Result<Template, Status> {
    handlers::home_page_handler(db, config).await
}

#[post("/", data = "<form>")]
pub async fn submit_contact(
    form: Form<ContactForm>,
    services: &State<Services>,
    config: &State<AppConfig>,
) -> (Status, Json<ContactResponse>) {
    handlers::submit_contact_handler(&form, services, config).await
}

/// Bodies that are not form data are validated as an empty form.
#[post("/", rank = 2)]
pub async fn submit_contact_unparsed(
    services: &State<Services>,
    config: &State<AppConfig>,
) -> (Status, Json<ContactResponse>) {
    warn!("Contact submission without form data");
    handlers::submit_contact_handler(&ContactForm::default(), services, config).await
}

#[get("/digital-cv")]
pub async fn digital_cv(db: &State<Database>) -> Result<Template, Status> {
    handlers::digital_cv_handler(db).await
}

#[rocket::catch(404)]
pub fn not_found() -> (Status, Template) {
    (Status::NotFound, Template::render(NOT_FOUND_TEMPLATE, context! {}))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> (Status, Json<ContactResponse>) {
    (
        Status::PayloadTooLarge,
        Json(ContactResponse::error(MSG_INVALID)),
    )
}

/// Assemble the application. Collaborators are passed in so tests can swap them.
pub fn build_rocket(config: AppConfig, database: Database, services: Services) -> Rocket<Build> {
    let limits = Limits::default().limit("form", FORM_LIMIT_KIB.kibibytes());
    let figment = rocket::Config::figment()
        .merge(("template_dir", config.templates_path.clone()))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Template::fairing())
        .manage(database)
        .manage(services)
        .manage(config)
        .mount(
            "/",
            routes![home_page, submit_contact, submit_contact_unparsed, digital_cv],
        )
        .register("/", catchers![not_found, payload_too_large])
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let database = match Database::new(&config.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {:#}", e);
            return Err(e);
        }
    };
    database.health_check().await?;

    let services = Services::new(
        Arc::new(HttpMailRelay::new(&config.mail)?),
        Arc::new(RecaptchaVerifier::new(&config.recaptcha)?),
    );

    info!("Starting portfolio server");
    info!("Database: {}", config.database_path.display());
    info!("Templates: {}", config.templates_path.display());
    info!("Contact messages go to: {}", config.mail.recipient);

    if let Err(e) = build_rocket(config, database, services).launch().await {
        error!("Server stopped with error: {}", e);
        anyhow::bail!("Server failed: {}", e);
    }

    Ok(())
}
