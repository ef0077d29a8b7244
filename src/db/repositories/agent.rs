//! Agent repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;

/// A named agent owned by a user, optionally pointing at its current resume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub custom_instructions: Option<String>,
    pub current_resume_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct AgentRepository {
    db: Database,
}

impl AgentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new agent
    pub async fn create(
        &self,
        user_id: &str,
        name: &str,
        description: Option<String>,
        custom_instructions: Option<String>,
    ) -> Result<AgentRecord> {
        let agent_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let agent = AgentRecord {
            agent_id: agent_id.clone(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description,
            custom_instructions,
            current_resume_id: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO agents (agent_id, user_id, name, description, custom_instructions, current_resume_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                agent.agent_id,
                agent.user_id,
                agent.name,
                agent.description,
                agent.custom_instructions,
                agent.current_resume_id,
                agent.created_at.to_rfc3339(),
                agent.updated_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert agent")?;

        tracing::debug!("Created agent: {}", agent_id);
        Ok(agent)
    }

    /// Get an agent by ID
    pub async fn get(&self, agent_id: &str) -> Result<Option<AgentRecord>> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT agent_id, user_id, name, description, custom_instructions,
                    current_resume_id, created_at, updated_at
             FROM agents WHERE agent_id = ?1",
        )?;

        let result = stmt.query_row(params![agent_id], Self::map_row);

        match result {
            Ok(agent) => Ok(Some(agent)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to get agent"),
        }
    }

    /// List agents, optionally scoped to a user
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<AgentRecord>> {
        let conn = self.db.lock().await;

        let mut query = String::from(
            "SELECT agent_id, user_id, name, description, custom_instructions,
                    current_resume_id, created_at, updated_at
             FROM agents WHERE 1=1",
        );
        if user_id.is_some() {
            query.push_str(" AND user_id = ?1");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut stmt = conn.prepare(&query)?;

        let agents = if let Some(uid) = user_id {
            stmt.query_map(params![uid], Self::map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        } else {
            stmt.query_map([], Self::map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()
        }
        .context("Failed to collect agents")?;

        Ok(agents)
    }

    /// Point an agent at its current resume; `None` clears the pointer.
    ///
    /// Referential integrity is enforced by the store: setting an id that
    /// does not exist in resumes is an error.
    pub async fn set_current_resume(
        &self,
        agent_id: &str,
        resume_id: Option<&str>,
    ) -> Result<()> {
        let conn = self.db.lock().await;
        let now = Utc::now().to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE agents SET current_resume_id = ?1, updated_at = ?2 WHERE agent_id = ?3",
                params![resume_id, now, agent_id],
            )
            .context("Failed to update agent resume")?;

        if updated == 0 {
            anyhow::bail!("Agent not found: {}", agent_id);
        }

        tracing::debug!(
            "Set current resume for agent {} to {:?}",
            agent_id,
            resume_id
        );
        Ok(())
    }

    /// Delete an agent
    pub async fn delete(&self, agent_id: &str) -> Result<()> {
        let conn = self.db.lock().await;
        conn.execute("DELETE FROM agents WHERE agent_id = ?1", params![agent_id])?;
        tracing::debug!("Deleted agent: {}", agent_id);
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<AgentRecord> {
        Ok(AgentRecord {
            agent_id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            custom_instructions: row.get(4)?,
            current_resume_id: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(6)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(7)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
