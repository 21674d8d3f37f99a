//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file, in-memory, and hosted (remote) databases.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::quote::model::{LeadCounts, LeadRecord, LeadStatus};
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Connect to a hosted libSQL database.
    pub async fn new_remote(url: &str, auth_token: &SecretString) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.expose_secret().to_string())
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to connect to remote database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(url = %url, "Remote database connected");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    Err(DatabaseError::Serialization(format!(
        "invalid created_at timestamp: {s:?}"
    )))
}

fn text(row: &libsql::Row, idx: i32) -> Result<String, DatabaseError> {
    row.get::<String>(idx)
        .map_err(|e| DatabaseError::Query(format!("read column {idx}: {e}")))
}

fn parse_column<T>(raw: &str, what: &str) -> Result<T, DatabaseError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| DatabaseError::Serialization(format!("invalid {what} '{raw}': {e}")))
}

const LEAD_COLUMNS: &str =
    "id, name, email, project_type, budget, timeline, specifics, status, created_at";

fn row_to_lead(row: &libsql::Row) -> Result<LeadRecord, DatabaseError> {
    let id: String = text(row, 0)?;
    let project_type: String = text(row, 3)?;
    let budget: String = text(row, 4)?;
    let timeline: String = text(row, 5)?;
    let specifics: String = text(row, 6)?;
    let status: String = text(row, 7)?;
    let created_at: String = text(row, 8)?;

    let specifics: BTreeMap<String, String> = serde_json::from_str(&specifics)
        .map_err(|e| DatabaseError::Serialization(format!("invalid specifics: {e}")))?;

    Ok(LeadRecord {
        id: parse_column(&id, "lead id")?,
        name: text(row, 1)?,
        email: text(row, 2)?,
        project_type: parse_column(&project_type, "project type")?,
        budget: parse_column(&budget, "budget")?,
        timeline: parse_column(&timeline, "timeline")?,
        specifics,
        status: parse_column(&status, "status")?,
        created_at: parse_datetime(&created_at)?,
    })
}

// ── Database trait implementation ───────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), DatabaseError> {
        let specifics = serde_json::to_string(&lead.specifics)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO leads (id, name, email, project_type, budget, timeline, specifics, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    lead.id.to_string(),
                    lead.name.clone(),
                    lead.email.clone(),
                    lead.project_type.as_str(),
                    lead.budget.label(),
                    lead.timeline.label(),
                    specifics,
                    lead.status.as_str(),
                    lead.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_lead: {e}")))?;

        debug!(lead_id = %lead.id, "Lead inserted");
        Ok(())
    }

    async fn get_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_lead: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_lead(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_lead: {e}"))),
        }
    }

    async fn list_leads(&self, limit: usize) -> Result<Vec<LeadRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_leads: {e}")))?;

        let mut leads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_leads: {e}")))?
        {
            leads.push(row_to_lead(&row)?);
        }
        Ok(leads)
    }

    async fn update_lead_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_lead_status: {e}")))?;
        Ok(count > 0)
    }

    async fn lead_counts(&self) -> Result<LeadCounts, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT status, COUNT(*) FROM leads GROUP BY status", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("lead_counts: {e}")))?;

        let mut counts = LeadCounts::default();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("lead_counts: {e}")))?
        {
            let status: String = text(&row, 0)?;
            let n = row
                .get::<i64>(1)
                .map_err(|e| DatabaseError::Query(format!("lead_counts: {e}")))?
                .max(0) as u64;
            match parse_column::<LeadStatus>(&status, "status")? {
                LeadStatus::New => counts.new += n,
                LeadStatus::Contacted => counts.contacted += n,
                LeadStatus::Closed => counts.closed += n,
            }
            counts.total += n;
        }
        Ok(counts)
    }
}
