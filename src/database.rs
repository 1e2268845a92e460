// src/database.rs
//! Local mirror of job postings created on the recruiting platform.
//!
//! Rows are written once, when the remote create succeeds, and never synced
//! back from the provider.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app_log;
use crate::error::{RelayError, Result};
use crate::recruit::mapping::JobPosting;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a file-backed database, creating the file and its directory if needed.
    pub async fn open(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RelayError::Config(format!(
                    "cannot create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Self::connect(&format!("sqlite:{}?mode=rwc", database_path.display())).await
    }

    /// Connect with a `sqlite:` URL and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if !database_url.starts_with("sqlite:") {
            return Err(RelayError::Config(format!(
                "unsupported database url scheme: {}",
                database_url.split(':').next().unwrap_or_default()
            )));
        }

        let pool = SqlitePool::connect(database_url).await?;
        app_log!(info, "Database connection established: {}", database_url);

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory database. Every connection to
    /// `sqlite::memory:` is its own database, so the pool is capped at one.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn jobs(&self) -> JobRepository<'_> {
        JobRepository::new(&self.pool)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_postings (
                id TEXT PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                location TEXT NOT NULL,
                industry TEXT NOT NULL,
                job_type TEXT NOT NULL,
                salary_range TEXT,
                experience_required TEXT,
                target_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_postings_created_at ON job_postings(created_at);",
        )
        .execute(&self.pool)
        .await?;

        app_log!(debug, "Database migrations completed");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: String,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub industry: String,
    pub job_type: String,
    pub salary_range: Option<String>,
    pub experience_required: Option<String>,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the mirror row for a posting the provider accepted as `external_id`.
    pub async fn insert(&self, external_id: &str, posting: &JobPosting) -> Result<JobRecord> {
        let record = JobRecord {
            id: Uuid::new_v4().to_string(),
            external_id: external_id.to_string(),
            title: posting.title.clone(),
            description: posting.description.clone(),
            location: posting.location.clone(),
            industry: posting.industry.clone(),
            job_type: posting.job_type.clone(),
            salary_range: posting.salary_range.clone(),
            experience_required: posting.experience_required.clone(),
            target_date: posting.target_date,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO job_postings (
                id, external_id, title, description, location, industry, job_type,
                salary_range, experience_required, target_date, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.external_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.location)
        .bind(&record.industry)
        .bind(&record.job_type)
        .bind(&record.salary_range)
        .bind(&record.experience_required)
        .bind(record.target_date)
        .bind(record.created_at)
        .execute(self.pool)
        .await?;

        app_log!(
            info,
            "Mirrored job posting {} as {}",
            record.external_id,
            record.id
        );
        Ok(record)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<JobRecord>> {
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            SELECT id, external_id, title, description, location, industry, job_type,
                   salary_range, experience_required, target_date, created_at
            FROM job_postings
            WHERE external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<JobRecord>> {
        let records = sqlx::query_as::<_, JobRecord>(
            r#"
            SELECT id, external_id, title, description, location, industry, job_type,
                   salary_range, experience_required, target_date, created_at
            FROM job_postings
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_postings")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> JobPosting {
        JobPosting {
            title: "Platform Engineer".to_string(),
            description: "Build the relay".to_string(),
            location: "Pune".to_string(),
            industry: "IT Services".to_string(),
            job_type: "Full Time".to_string(),
            salary_range: None,
            experience_required: Some("3 years".to_string()),
            target_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::in_memory().await.unwrap();
        let inserted = db.jobs().insert("846914000000554001", &posting()).await.unwrap();

        let found = db
            .jobs()
            .find_by_external_id("846914000000554001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.title, "Platform Engineer");
        assert_eq!(found.target_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(found.experience_required.as_deref(), Some("3 years"));
        assert!(Uuid::parse_str(&found.id).is_ok());
    }

    #[tokio::test]
    async fn test_external_id_is_unique() {
        let db = Database::in_memory().await.unwrap();
        db.jobs().insert("1", &posting()).await.unwrap();

        let err = db.jobs().insert("1", &posting()).await.unwrap_err();
        assert!(matches!(err, RelayError::Database(_)));
        assert_eq!(db.jobs().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_and_missing() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.jobs().list().await.unwrap().is_empty());
        assert!(db.jobs().find_by_external_id("nope").await.unwrap().is_none());

        db.jobs().insert("1", &posting()).await.unwrap();
        db.jobs().insert("2", &posting()).await.unwrap();
        assert_eq!(db.jobs().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_non_sqlite_url() {
        let err = Database::connect("postgres://localhost/jobs").await.err().unwrap();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
