// src/content.rs
//! Turns loaded records into the contexts the page templates render.
//! Nothing here touches the store, so ordering and grouping can be checked in isolation.

use indexmap::IndexMap;
use serde::Serialize;

use crate::contact::ContactFormView;
use crate::types::{AboutEntry, Education, Experience, PersonalInfo, PortfolioItem, Technology};

pub const CERTIFICATION_FILTER: &str = "filter-certification";
pub const UNKNOWN_ISSUER: &str = "Unknown Issuer";

pub type IssuerGroups = IndexMap<String, Vec<PortfolioItem>>;

/// One issuer heading on the CV page. Templates get a list, since map contexts lose key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuerGroup {
    pub issuer: String,
    pub items: Vec<PortfolioItem>,
}

// ===== Home page =====

#[derive(Debug, Default)]
pub struct HomeContent {
    pub personal: Vec<PersonalInfo>,
    pub about: Vec<AboutEntry>,
    pub technologies: Vec<Technology>,
    pub portfolio: Vec<PortfolioItem>,
}

#[derive(Debug, Serialize)]
pub struct HomeContext {
    pub personal: Vec<PersonalInfo>,
    pub about: Vec<AboutEntry>,
    pub technologies: Vec<Technology>,
    pub portfolio: Vec<PortfolioItem>,
    pub contact_form: ContactFormView,
    /// Site key for the bot-check widget rendered next to the form
    pub recaptcha_public_key: String,
}

/// Everything is shown as loaded: no filtering, no sorting.
pub fn home_context(content: HomeContent, recaptcha_public_key: &str) -> HomeContext {
    HomeContext {
        personal: content.personal,
        about: content.about,
        technologies: content.technologies,
        portfolio: content.portfolio,
        contact_form: ContactFormView::empty(),
        recaptcha_public_key: recaptcha_public_key.to_string(),
    }
}

// ===== Digital CV =====

#[derive(Debug, Default)]
pub struct CvContent {
    pub experiences: Vec<Experience>,
    pub personal: Vec<PersonalInfo>,
    pub education: Vec<Education>,
    pub technologies: Vec<Technology>,
    pub portfolio: Vec<PortfolioItem>,
}

#[derive(Debug, Serialize)]
pub struct CvContext {
    pub experiences: Vec<Experience>,
    pub personal: Vec<PersonalInfo>,
    pub education: Vec<Education>,
    pub technologies: Vec<Technology>,
    pub portfolio: Vec<PortfolioItem>,
    pub grouped_portfolio: Vec<IssuerGroup>,
}

pub fn cv_context(content: CvContent) -> CvContext {
    let experiences = content
        .experiences
        .into_iter()
        .map(|mut experience| {
            order_descriptions(&mut experience);
            experience
        })
        .collect();

    let portfolio = certifications(content.portfolio);
    let grouped_portfolio = issuer_sections(group_by_issuer(&portfolio));

    CvContext {
        experiences,
        personal: content.personal,
        education: content.education,
        technologies: content.technologies,
        portfolio,
        grouped_portfolio,
    }
}

/// Ascending `order_number`; equal ranks keep the order they were loaded in.
pub fn order_descriptions(experience: &mut Experience) {
    experience.descriptions.sort_by_key(|line| line.order_number);
}

/// Certification items only, newest year first; equal years keep load order.
pub fn certifications(items: Vec<PortfolioItem>) -> Vec<PortfolioItem> {
    let mut certs: Vec<PortfolioItem> = items
        .into_iter()
        .filter(|item| item.filter == CERTIFICATION_FILTER)
        .collect();
    certs.sort_by(|a, b| b.year.cmp(&a.year));
    certs
}

pub fn issuer_key(item: &PortfolioItem) -> &str {
    item.issuer_name.as_deref().unwrap_or(UNKNOWN_ISSUER)
}

/// Groups keep first-seen issuer order; items keep their relative order inside a group.
pub fn group_by_issuer(items: &[PortfolioItem]) -> IssuerGroups {
    items.iter().fold(IssuerGroups::new(), |mut groups, item| {
        groups
            .entry(issuer_key(item).to_string())
            .or_default()
            .push(item.clone());
        groups
    })
}

pub fn issuer_sections(groups: IssuerGroups) -> Vec<IssuerGroup> {
    groups
        .into_iter()
        .map(|(issuer, items)| IssuerGroup { issuer, items })
        .collect()
}
