// src/web/handlers/page_handlers.rs
use crate::config::AppConfig;
use crate::content::{cv_context, home_context, CvContent, HomeContent, CERTIFICATION_FILTER};
use crate::core::Database;
use crate::web::types::{DIGITAL_CV_TEMPLATE, HOME_TEMPLATE};

use anyhow::Result;
use rocket::http::Status;
use rocket::State;
use rocket_dyn_templates::Template;
use tracing::{error, info};

async fn load_home_content(db: &Database) -> Result<HomeContent> {
    let repo = db.content();
    Ok(HomeContent {
        personal: repo.personal().await?,
        about: repo.about().await?,
        technologies: repo.technologies().await?,
        portfolio: repo.portfolio_items().await?,
    })
}

async fn load_cv_content(db: &Database) -> Result<CvContent> {
    let repo = db.content();
    Ok(CvContent {
        experiences: repo.experiences().await?,
        personal: repo.personal().await?,
        education: repo.education().await?,
        technologies: repo.technologies().await?,
        portfolio: repo.portfolio_by_filter(CERTIFICATION_FILTER).await?,
    })
}

pub async fn home_page_handler(
    db: &State<Database>,
    config: &State<AppConfig>,
) -> Result<Template, Status> {
    match load_home_content(db).await {
        Ok(content) => {
            info!(
                "Rendering home page with {} portfolio items",
                content.portfolio.len()
            );
            let context = home_context(content, &config.recaptcha.public_key);
            Ok(Template::render(HOME_TEMPLATE, context))
        }
        Err(e) => {
            error!("Failed to load home page content: {:#}", e);
            Err(Status::InternalServerError)
        }
    }
}

pub async fn digital_cv_handler(db: &State<Database>) -> Result<Template, Status> {
    match load_cv_content(db).await {
        Ok(content) => {
            let context = cv_context(content);
            info!(
                "Rendering digital CV: {} experiences, {} certification issuers",
                context.experiences.len(),
                context.grouped_portfolio.len()
            );
            Ok(Template::render(DIGITAL_CV_TEMPLATE, context))
        }
        Err(e) => {
            error!("Failed to load digital CV content: {:#}", e);
            Err(Status::InternalServerError)
        }
    }
}
