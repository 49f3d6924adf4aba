// src/types/models.rs
//! Read-only site content as stored in SQLite

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonalInfo {
    pub id: i64,
    pub full_name: String,
    pub headline: String,
    pub bio: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AboutEntry {
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Technology {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experience {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Attached after the experience rows are loaded.
    #[sqlx(skip)]
    pub descriptions: Vec<DescriptionLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DescriptionLine {
    pub id: i64,
    pub experience_id: i64,
    pub order_number: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Education {
    pub id: i64,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    /// Category tag used by the client-side filter buttons, e.g. `filter-certification`.
    pub filter: String,
    pub year: i32,
    /// Name of the joined issuer, absent when the item has no issuer reference.
    pub issuer_name: Option<String>,
}
