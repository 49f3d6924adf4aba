// src/core/database.rs
//! SQLite access for the site content

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::types::{
    AboutEntry, DescriptionLine, Education, Experience, PersonalInfo, PortfolioItem, Technology,
};
use crate::utils::ensure_dir_exists;

// ===== Connection Management =====

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and make sure the schema exists
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database. A single connection keeps every query on the same store.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn content(&self) -> ContentRepository<'_> {
        ContentRepository::new(&self.pool)
    }

    /// Create the content tables if they are missing
    pub async fn migrate(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS personal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                headline TEXT NOT NULL DEFAULT '',
                bio TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                phone TEXT,
                location TEXT,
                photo_url TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS about (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                body TEXT NOT NULL DEFAULT ''
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS technology (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                icon TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS experience (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company TEXT NOT NULL,
                role TEXT NOT NULL,
                location TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS description (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                experience_id INTEGER NOT NULL REFERENCES experience(id) ON DELETE CASCADE,
                order_number INTEGER NOT NULL DEFAULT 0,
                text TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS education (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                institution TEXT NOT NULL,
                degree TEXT NOT NULL,
                field_of_study TEXT,
                start_year INTEGER NOT NULL,
                end_year INTEGER,
                description TEXT
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS issuer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS portfolio (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                image_url TEXT,
                link TEXT,
                filter TEXT NOT NULL,
                year INTEGER NOT NULL,
                issuer_id INTEGER REFERENCES issuer(id) ON DELETE SET NULL
            );
            "#,
            "CREATE INDEX IF NOT EXISTS idx_description_experience ON description(experience_id);",
            "CREATE INDEX IF NOT EXISTS idx_portfolio_filter ON portfolio(filter);",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to apply schema")?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Content Repository =====

const PORTFOLIO_COLUMNS: &str = r#"
    SELECT p.id, p.title, p.description, p.image_url, p.link, p.filter, p.year,
           i.name AS issuer_name
    FROM portfolio p
    LEFT JOIN issuer i ON i.id = p.issuer_id
"#;

/// Plain reads in store order (ascending id). Display ordering is applied by `crate::content`.
pub struct ContentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ContentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn personal(&self) -> Result<Vec<PersonalInfo>> {
        sqlx::query_as::<_, PersonalInfo>(
            r#"
            SELECT id, full_name, headline, bio, email, phone, location, photo_url
            FROM personal
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to load personal info")
    }

    pub async fn about(&self) -> Result<Vec<AboutEntry>> {
        sqlx::query_as::<_, AboutEntry>("SELECT id, title, body FROM about ORDER BY id")
            .fetch_all(self.pool)
            .await
            .context("Failed to load about entries")
    }

    pub async fn technologies(&self) -> Result<Vec<Technology>> {
        sqlx::query_as::<_, Technology>("SELECT id, name, icon FROM technology ORDER BY id")
            .fetch_all(self.pool)
            .await
            .context("Failed to load technologies")
    }

    pub async fn education(&self) -> Result<Vec<Education>> {
        sqlx::query_as::<_, Education>(
            r#"
            SELECT id, institution, degree, field_of_study, start_year, end_year, description
            FROM education
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to load education")
    }

    pub async fn portfolio_items(&self) -> Result<Vec<PortfolioItem>> {
        sqlx::query_as::<_, PortfolioItem>(&format!("{} ORDER BY p.id", PORTFOLIO_COLUMNS))
            .fetch_all(self.pool)
            .await
            .context("Failed to load portfolio items")
    }

    pub async fn portfolio_by_filter(&self, filter: &str) -> Result<Vec<PortfolioItem>> {
        sqlx::query_as::<_, PortfolioItem>(&format!(
            "{} WHERE p.filter = ? ORDER BY p.id",
            PORTFOLIO_COLUMNS
        ))
        .bind(filter)
        .fetch_all(self.pool)
        .await
        .with_context(|| format!("Failed to load portfolio items for filter {}", filter))
    }

    /// Experiences with their description lines attached in store order
    pub async fn experiences(&self) -> Result<Vec<Experience>> {
        let mut experiences = sqlx::query_as::<_, Experience>(
            r#"
            SELECT id, company, role, location, start_date, end_date
            FROM experience
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to load experiences")?;

        let lines = sqlx::query_as::<_, DescriptionLine>(
            "SELECT id, experience_id, order_number, text FROM description ORDER BY id",
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to load experience descriptions")?;

        let mut by_experience: HashMap<i64, Vec<DescriptionLine>> = HashMap::new();
        for line in lines {
            by_experience.entry(line.experience_id).or_default().push(line);
        }

        for experience in &mut experiences {
            experience.descriptions = by_experience.remove(&experience.id).unwrap_or_default();
        }

        Ok(experiences)
    }
}
