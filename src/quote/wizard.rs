//! QuoteWizard: a single quote session bound to an injected lead store.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, warn};

use super::handoff;
use super::model::{Budget, LeadRecord, ProjectRoute, Timeline};
use super::state::{QuotePhase, SubmitRejection, WizardState};
use crate::config::HandoffConfig;
use crate::error::SubmissionFailure;
use crate::store::Database;

/// Result of a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The lead was stored and the wizard reached Success.
    Submitted(LeadRecord),
    /// The store failed; the wizard stays in Finalize with this message.
    Failed(String),
    /// A precondition failed and no request was issued.
    Rejected(SubmitRejection),
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Insert `lead`, folding every store error into a `SubmissionFailure`.
pub(crate) async fn store_lead(
    store: &dyn Database,
    lead: &LeadRecord,
) -> Result<(), SubmissionFailure> {
    match store.insert_lead(lead).await {
        Ok(()) => {
            info!(lead_id = %lead.id, route = %lead.project_type, "Lead stored");
            Ok(())
        }
        Err(source) => {
            warn!(lead_id = %lead.id, error = %source, "Lead submission failed");
            Err(SubmissionFailure { source })
        }
    }
}

/// Settles an in-flight submit as failed if it is dropped before the
/// store answers.
struct SubmissionGuard<'a>(&'a mut WizardState);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        // No-op once the submit has been settled.
        self.0.finish_submission(false);
    }
}

/// One visitor's pass through the quote form.
pub struct QuoteWizard {
    state: WizardState,
    store: Arc<dyn Database>,
}

impl QuoteWizard {
    pub fn new(store: Arc<dyn Database>) -> Self {
        Self {
            state: WizardState::new(),
            store,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn phase(&self) -> QuotePhase {
        self.state.phase
    }

    pub fn select_route(&mut self, route: ProjectRoute) -> bool {
        let applied = self.state.select_route(route);
        if applied {
            debug!(%route, "Route selected");
        }
        applied
    }

    pub fn update_specific(&mut self, key: &str, value: &str) -> bool {
        self.state.update_specific(key, value)
    }

    pub fn set_budget(&mut self, budget: Budget) -> bool {
        self.state.set_budget(budget)
    }

    pub fn set_timeline(&mut self, timeline: Timeline) -> bool {
        self.state.set_timeline(timeline)
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        self.state.set_name(name)
    }

    pub fn set_email(&mut self, email: &str) -> bool {
        self.state.set_email(email)
    }

    pub fn advance(&mut self) -> bool {
        let applied = self.state.advance();
        if applied {
            debug!(phase = %self.state.phase, "Advanced");
        }
        applied
    }

    pub fn retreat(&mut self) -> bool {
        let applied = self.state.retreat();
        if applied {
            debug!(phase = %self.state.phase, "Stepped back");
        }
        applied
    }

    /// Store the lead. At most one insert is issued per call, and none when
    /// a precondition fails.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let lead = match self.state.begin_submission() {
            Ok(lead) => lead,
            Err(rejection) => {
                debug!(%rejection, "Submit rejected");
                return SubmitOutcome::Rejected(rejection);
            }
        };

        let mut guard = SubmissionGuard(&mut self.state);
        let result = store_lead(self.store.as_ref(), &lead).await;
        guard.0.finish_submission(result.is_ok());
        drop(guard);
        match result {
            Ok(()) => SubmitOutcome::Submitted(lead),
            Err(failure) => SubmitOutcome::Failed(failure.user_message().to_string()),
        }
    }

    /// Prefilled hand-off message, once a route is known.
    pub fn handoff_message(&self, studio_name: &str) -> Option<String> {
        let route = self.state.route?;
        Some(handoff::handoff_message(studio_name, route, &self.state.form))
    }

    /// Messaging deep link, once a route is known.
    pub fn handoff_url(&self, config: &HandoffConfig) -> Option<Url> {
        let route = self.state.route?;
        Some(handoff::handoff_url(config, route, &self.state.form))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::*;
    use crate::error::{DatabaseError, SUBMISSION_FAILURE_MESSAGE};
    use crate::quote::model::{LeadCounts, LeadStatus};
    use crate::store::LibSqlBackend;

    /// Store that records inserts and can be switched to fail.
    #[derive(Default)]
    struct RecordingStore {
        inserts: Mutex<Vec<LeadRecord>>,
        fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            let store = Self::default();
            store.fail.store(true, std::sync::atomic::Ordering::SeqCst);
            store
        }

        fn set_failing(&self, fail: bool) {
            self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
        }

        async fn count(&self) -> usize {
            self.inserts.lock().await.len()
        }
    }

    #[async_trait]
    impl Database for RecordingStore {
        async fn run_migrations(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
        async fn insert_lead(&self, lead: &LeadRecord) -> Result<(), DatabaseError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(DatabaseError::Pool("network unreachable".into()));
            }
            self.inserts.lock().await.push(lead.clone());
            Ok(())
        }
        async fn get_lead(&self, _id: Uuid) -> Result<Option<LeadRecord>, DatabaseError> {
            Ok(None)
        }
        async fn list_leads(&self, _limit: usize) -> Result<Vec<LeadRecord>, DatabaseError> {
            Ok(self.inserts.lock().await.clone())
        }
        async fn update_lead_status(
            &self,
            _id: Uuid,
            _status: LeadStatus,
        ) -> Result<bool, DatabaseError> {
            Ok(false)
        }
        async fn lead_counts(&self) -> Result<LeadCounts, DatabaseError> {
            Ok(LeadCounts::default())
        }
    }

    fn fill_digital(wizard: &mut QuoteWizard, email: &str) {
        assert!(wizard.select_route(ProjectRoute::Digital));
        assert!(wizard.update_specific("tech", "Custom React Web"));
        assert!(wizard.advance());
        wizard.set_budget("₦500k – ₦1.5M".parse().unwrap());
        wizard.set_timeline("ASAP".parse().unwrap());
        assert!(wizard.advance());
        wizard.set_name("Ada Obi");
        wizard.set_email(email);
    }

    #[tokio::test]
    async fn digital_request_is_stored() {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let mut wizard = QuoteWizard::new(db.clone());
        fill_digital(&mut wizard, "ada@x.com");

        let outcome = wizard.submit().await;
        let SubmitOutcome::Submitted(lead) = outcome else {
            panic!("expected submission, got {outcome:?}");
        };
        assert_eq!(wizard.phase(), QuotePhase::Success);
        assert!(!wizard.state().is_submitting);

        let stored = db.get_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(stored.project_type, ProjectRoute::Digital);
        assert_eq!(stored.budget, Budget::Growth);
        assert_eq!(stored.timeline, Timeline::Asap);
        assert_eq!(stored.email, "ada@x.com");
        assert_eq!(stored.status, LeadStatus::New);
        assert_eq!(stored.specifics["tech"], "Custom React Web");
    }

    #[tokio::test]
    async fn empty_email_sends_nothing() {
        let store = Arc::new(RecordingStore::default());
        let mut wizard = QuoteWizard::new(store.clone());
        fill_digital(&mut wizard, "");

        let outcome = wizard.submit().await;
        assert_eq!(outcome, SubmitOutcome::Rejected(SubmitRejection::Incomplete));
        assert_eq!(wizard.phase(), QuotePhase::Finalize);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn store_failure_keeps_finalize_and_allows_retry() {
        let store = Arc::new(RecordingStore::failing());
        let mut wizard = QuoteWizard::new(store.clone());
        fill_digital(&mut wizard, "ada@x.com");

        let outcome = wizard.submit().await;
        assert_eq!(outcome, SubmitOutcome::Failed(SUBMISSION_FAILURE_MESSAGE.to_string()));
        assert_eq!(wizard.phase(), QuotePhase::Finalize);
        assert!(!wizard.state().is_submitting);
        assert!(wizard.state().error.as_deref().is_some_and(|e| !e.is_empty()));

        store.set_failing(false);
        let outcome = wizard.submit().await;
        assert!(outcome.is_submitted());
        assert_eq!(wizard.phase(), QuotePhase::Success);
        assert!(wizard.state().error.is_none());
        assert_eq!(store.count().await, 1);
    }

    /// Store whose inserts never return.
    struct StalledStore;

    #[async_trait]
    impl Database for StalledStore {
        async fn run_migrations(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
        async fn insert_lead(&self, _lead: &LeadRecord) -> Result<(), DatabaseError> {
            std::future::pending().await
        }
        async fn get_lead(&self, _id: Uuid) -> Result<Option<LeadRecord>, DatabaseError> {
            Ok(None)
        }
        async fn list_leads(&self, _limit: usize) -> Result<Vec<LeadRecord>, DatabaseError> {
            Ok(Vec::new())
        }
        async fn update_lead_status(
            &self,
            _id: Uuid,
            _status: LeadStatus,
        ) -> Result<bool, DatabaseError> {
            Ok(false)
        }
        async fn lead_counts(&self) -> Result<LeadCounts, DatabaseError> {
            Ok(LeadCounts::default())
        }
    }

    #[tokio::test]
    async fn dropped_submit_releases_the_form() {
        let mut wizard = QuoteWizard::new(Arc::new(StalledStore));
        fill_digital(&mut wizard, "ada@x.com");

        let dropped =
            tokio::time::timeout(std::time::Duration::from_millis(50), wizard.submit()).await;
        assert!(dropped.is_err());

        assert!(!wizard.state().is_submitting);
        assert_eq!(wizard.phase(), QuotePhase::Finalize);
        assert_eq!(wizard.state().error.as_deref(), Some(SUBMISSION_FAILURE_MESSAGE));
        assert!(wizard.retreat());
    }

    #[tokio::test]
    async fn submit_outside_finalize_is_rejected() {
        let store = Arc::new(RecordingStore::default());
        let mut wizard = QuoteWizard::new(store.clone());
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Rejected(SubmitRejection::WrongPhase)
        );

        fill_digital(&mut wizard, "ada@x.com");
        assert!(wizard.submit().await.is_submitted());
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Rejected(SubmitRejection::WrongPhase)
        );
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn art_route_then_back_clears_route() {
        let mut wizard = QuoteWizard::new(Arc::new(RecordingStore::default()));
        assert!(wizard.select_route(ProjectRoute::Art));
        assert_eq!(wizard.phase(), QuotePhase::DeepDive);

        assert!(wizard.retreat());
        assert_eq!(wizard.phase(), QuotePhase::Gateway);
        assert!(wizard.state().route.is_none());
        assert!(wizard.handoff_message("Jesprec").is_none());
    }

    #[tokio::test]
    async fn handoff_after_success() {
        let mut wizard = QuoteWizard::new(Arc::new(RecordingStore::default()));
        fill_digital(&mut wizard, "ada@x.com");
        wizard.submit().await;

        let message = wizard.handoff_message("Jesprec").unwrap();
        assert!(message.contains("DIGITAL project request (Custom React Web) for Ada Obi"));

        let url = wizard.handoff_url(&HandoffConfig::default()).unwrap();
        assert!(url.as_str().starts_with("https://wa.me/2348086215207?text="));
    }
}
