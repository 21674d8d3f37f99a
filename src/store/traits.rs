//! Unified `Database` trait: single async interface for lead persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::quote::model::{LeadCounts, LeadRecord, LeadStatus};

/// Backend-agnostic store for quote leads.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Insert a newly submitted lead.
    async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), DatabaseError>;

    /// Get a lead by ID.
    async fn get_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, DatabaseError>;

    /// Most recent leads first, up to `limit`.
    async fn list_leads(&self, limit: usize) -> Result<Vec<LeadRecord>, DatabaseError>;

    /// Update a lead's review status. Returns `false` if no lead matched.
    async fn update_lead_status(&self, id: Uuid, status: LeadStatus)
    -> Result<bool, DatabaseError>;

    /// Lead totals per status.
    async fn lead_counts(&self) -> Result<LeadCounts, DatabaseError>;
}
