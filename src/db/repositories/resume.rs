//! Resume repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;

/// A stored resume file owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub resume_id: String,
    pub user_id: String,
    pub filename: String,
    pub filepath: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct ResumeRepository {
    db: Database,
}

impl ResumeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new resume record
    pub async fn create(
        &self,
        user_id: &str,
        filename: &str,
        filepath: &str,
    ) -> Result<ResumeRecord> {
        let resume_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let resume = ResumeRecord {
            resume_id: resume_id.clone(),
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            filepath: filepath.to_string(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO resumes (resume_id, user_id, filename, filepath, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                resume.resume_id,
                resume.user_id,
                resume.filename,
                resume.filepath,
                resume.created_at.to_rfc3339(),
                resume.updated_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert resume")?;

        tracing::debug!("Created resume: {}", resume_id);
        Ok(resume)
    }

    /// Get a resume by ID
    pub async fn get(&self, resume_id: &str) -> Result<Option<ResumeRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT resume_id, user_id, filename, filepath, created_at, updated_at
             FROM resumes WHERE resume_id = ?1",
        )?;

        let result = stmt.query_row(params![resume_id], Self::map_row);

        match result {
            Ok(resume) => Ok(Some(resume)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get resume"),
        }
    }

    /// List resumes, optionally scoped to a user
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<ResumeRecord>> {
        let conn = self.db.lock().await;

        let mut query = String::from(
            "SELECT resume_id, user_id, filename, filepath, created_at, updated_at
             FROM resumes WHERE 1=1",
        );
        if user_id.is_some() {
            query.push_str(" AND user_id = ?1");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut stmt = conn.prepare(&query)?;

        let resumes = if let Some(uid) = user_id {
            stmt.query_map(params![uid], Self::map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        } else {
            stmt.query_map([], Self::map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        }
        .context("Failed to collect resumes")?;

        Ok(resumes)
    }

    /// Delete a resume.
    ///
    /// Agents pointing at it get current_resume_id set to NULL by the
    /// schema's ON DELETE SET NULL.
    pub async fn delete(&self, resume_id: &str) -> Result<()> {
        let conn = self.db.lock().await;
        conn.execute(
            "DELETE FROM resumes WHERE resume_id = ?1",
            params![resume_id],
        )?;
        tracing::debug!("Deleted resume: {}", resume_id);
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ResumeRecord> {
        Ok(ResumeRecord {
            resume_id: row.get(0)?,
            user_id: row.get(1)?,
            filename: row.get(2)?,
            filepath: row.get(3)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(4)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
