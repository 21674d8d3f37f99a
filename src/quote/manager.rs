//! QuoteManager: owns live quote sessions and coordinates submissions
//! against the lead store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handoff;
use super::model::{Budget, ProjectRoute, QuoteForm, Timeline};
use super::state::{QuotePhase, SubmitRejection, WizardState};
use super::wizard::store_lead;
use crate::config::HandoffConfig;
use crate::error::QuoteError;
use crate::store::Database;

/// A live session and when it was last touched.
#[derive(Debug, Clone)]
struct QuoteSession {
    state: WizardState,
    last_activity: DateTime<Utc>,
}

/// Read-only view of a session, returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSnapshot {
    pub session_id: Uuid,
    pub phase: QuotePhase,
    pub progress: u8,
    pub route: Option<ProjectRoute>,
    pub form: QuoteForm,
    pub is_submitting: bool,
    pub error: Option<String>,
    pub can_advance: bool,
    pub can_submit: bool,
}

impl QuoteSnapshot {
    fn of(session_id: Uuid, state: &WizardState) -> Self {
        Self {
            session_id,
            phase: state.phase,
            progress: state.phase.progress_percent(),
            route: state.route,
            form: state.form.clone(),
            is_submitting: state.is_submitting,
            error: state.error.clone(),
            can_advance: state.can_advance(),
            can_submit: state.can_submit(),
        }
    }
}

/// Outcome of a submit call as reported to the client.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<SubmitRejection>,
    pub session: QuoteSnapshot,
}

/// Hand-off message and deep link.
#[derive(Debug, Clone, Serialize)]
pub struct Handoff {
    pub message: String,
    pub url: String,
}

/// Coordinates quote sessions: creation, mutation, submission, pruning.
pub struct QuoteManager {
    store: Arc<dyn Database>,
    handoff: HandoffConfig,
    idle_timeout: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, QuoteSession>>>,
}

impl QuoteManager {
    pub fn new(store: Arc<dyn Database>, handoff: HandoffConfig, idle_timeout: Duration) -> Self {
        Self {
            store,
            handoff,
            idle_timeout,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a new session at the gateway. Idle sessions are pruned first.
    pub async fn create_session(&self) -> QuoteSnapshot {
        let mut sessions = self.sessions.write().await;
        let pruned = prune_idle(&mut sessions, self.idle_timeout);
        if pruned > 0 {
            debug!(pruned, "Pruned idle quote sessions");
        }

        let id = Uuid::new_v4();
        let session = QuoteSession {
            state: WizardState::new(),
            last_activity: Utc::now(),
        };
        let snapshot = QuoteSnapshot::of(id, &session.state);
        sessions.insert(id, session);
        info!(session_id = %id, active = sessions.len(), "Quote session started");
        snapshot
    }

    /// Current view of a session.
    pub async fn snapshot(&self, id: Uuid) -> Result<QuoteSnapshot, QuoteError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| QuoteSnapshot::of(id, &s.state))
            .ok_or(QuoteError::SessionNotFound(id))
    }

    /// End a session. Returns `false` if it did not exist.
    pub async fn close_session(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "Quote session closed");
        }
        removed
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Apply a synchronous mutation and report whether it took effect.
    async fn mutate<F>(&self, id: Uuid, op: F) -> Result<(bool, QuoteSnapshot), QuoteError>
    where
        F: FnOnce(&mut WizardState) -> bool,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(QuoteError::SessionNotFound(id))?;
        let applied = op(&mut session.state);
        session.last_activity = Utc::now();
        Ok((applied, QuoteSnapshot::of(id, &session.state)))
    }

    pub async fn select_route(
        &self,
        id: Uuid,
        route: ProjectRoute,
    ) -> Result<(bool, QuoteSnapshot), QuoteError> {
        let result = self.mutate(id, |s| s.select_route(route)).await?;
        if result.0 {
            debug!(session_id = %id, %route, "Route selected");
        }
        Ok(result)
    }

    pub async fn update_specific(
        &self,
        id: Uuid,
        key: &str,
        value: &str,
    ) -> Result<(bool, QuoteSnapshot), QuoteError> {
        self.mutate(id, |s| s.update_specific(key, value)).await
    }

    pub async fn set_budget(
        &self,
        id: Uuid,
        budget: Budget,
    ) -> Result<(bool, QuoteSnapshot), QuoteError> {
        self.mutate(id, |s| s.set_budget(budget)).await
    }

    pub async fn set_timeline(
        &self,
        id: Uuid,
        timeline: Timeline,
    ) -> Result<(bool, QuoteSnapshot), QuoteError> {
        self.mutate(id, |s| s.set_timeline(timeline)).await
    }

    /// Update name and/or email. Applied only if every given field applied.
    pub async fn set_contact(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(bool, QuoteSnapshot), QuoteError> {
        self.mutate(id, |s| {
            let mut applied = true;
            if let Some(name) = name {
                applied &= s.set_name(name);
            }
            if let Some(email) = email {
                applied &= s.set_email(email);
            }
            applied
        })
        .await
    }

    pub async fn advance(&self, id: Uuid) -> Result<(bool, QuoteSnapshot), QuoteError> {
        let result = self.mutate(id, WizardState::advance).await?;
        debug!(session_id = %id, applied = result.0, phase = %result.1.phase, "Advance");
        Ok(result)
    }

    pub async fn retreat(&self, id: Uuid) -> Result<(bool, QuoteSnapshot), QuoteError> {
        let result = self.mutate(id, WizardState::retreat).await?;
        debug!(session_id = %id, applied = result.0, phase = %result.1.phase, "Retreat");
        Ok(result)
    }

    /// Submit the session's lead.
    ///
    /// The session lock is released while the insert is awaited; a second
    /// call in that window sees `is_submitting` and is rejected. The insert
    /// and the write-back run on their own task, so a dropped caller cannot
    /// leave the session stuck in flight.
    pub async fn submit(&self, id: Uuid) -> Result<SubmitReport, QuoteError> {
        let lead = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or(QuoteError::SessionNotFound(id))?;
            session.last_activity = Utc::now();
            match session.state.begin_submission() {
                Ok(lead) => lead,
                Err(rejection) => {
                    debug!(session_id = %id, %rejection, "Submit rejected");
                    return Ok(SubmitReport {
                        submitted: false,
                        lead_id: None,
                        rejected: Some(rejection),
                        session: QuoteSnapshot::of(id, &session.state),
                    });
                }
            }
        };

        let store = Arc::clone(&self.store);
        let sessions = Arc::clone(&self.sessions);
        let task = tokio::spawn(async move {
            let stored = store_lead(store.as_ref(), &lead).await.is_ok();
            record_outcome(&sessions, id, stored.then_some(lead.id)).await
        });

        match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Submission task failed");
                record_outcome(&self.sessions, id, None).await
            }
        }
    }

    /// Hand-off message and link for the session's route.
    pub async fn handoff(&self, id: Uuid) -> Result<Handoff, QuoteError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(QuoteError::SessionNotFound(id))?;
        let route = session.state.route.ok_or(QuoteError::RouteNotSelected)?;
        let form = &session.state.form;
        Ok(Handoff {
            message: handoff::handoff_message(&self.handoff.studio_name, route, form),
            url: handoff::handoff_url(&self.handoff, route, form).to_string(),
        })
    }
}

/// Record the insert result on the session and report it.
async fn record_outcome(
    sessions: &RwLock<HashMap<Uuid, QuoteSession>>,
    id: Uuid,
    lead_id: Option<Uuid>,
) -> Result<SubmitReport, QuoteError> {
    let mut sessions = sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or(QuoteError::SessionNotFound(id))?;
    session.state.finish_submission(lead_id.is_some());
    session.last_activity = Utc::now();

    Ok(SubmitReport {
        submitted: lead_id.is_some(),
        lead_id,
        rejected: None,
        session: QuoteSnapshot::of(id, &session.state),
    })
}

/// Drop sessions idle longer than `timeout`, sparing in-flight submissions.
fn prune_idle(sessions: &mut HashMap<Uuid, QuoteSession>, timeout: Duration) -> usize {
    let Ok(timeout) = chrono::Duration::from_std(timeout) else {
        return 0;
    };
    let cutoff = Utc::now() - timeout;
    let before = sessions.len();
    sessions.retain(|_, s| s.state.is_submitting || s.last_activity > cutoff);
    before - sessions.len()
}
