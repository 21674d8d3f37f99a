//! Quote wizard: the studio's multi-step project request flow.
//!
//! A visitor picks a project route, answers route-specific questions,
//! chooses a budget and timeline, then leaves contact details. Submitting
//! stores a `LeadRecord`; a messaging hand-off link is offered alongside.

pub mod handoff;
pub mod manager;
pub mod model;
pub mod routes;
pub mod state;
pub mod wizard;

pub use manager::{Handoff, QuoteManager, QuoteSnapshot, SubmitReport};
pub use model::{Budget, LeadRecord, LeadStatus, ProjectRoute, QuoteForm, Specifics, Timeline};
pub use routes::{QuoteRouteState, quote_routes};
pub use state::{QuotePhase, SubmitRejection, WizardState};
pub use wizard::{QuoteWizard, SubmitOutcome};
