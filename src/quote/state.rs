//! Quote wizard state machine: tracks which phase the visitor is in.

use serde::{Deserialize, Serialize};

use super::model::{Budget, LeadRecord, ProjectRoute, QuoteForm, Specifics, Timeline};
use crate::error::SUBMISSION_FAILURE_MESSAGE;

/// The phases of the quote wizard.
///
/// Progresses linearly: Gateway → DeepDive → Investment → Finalize → Success.
/// Every phase but Gateway and Success can step back exactly one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotePhase {
    #[default]
    Gateway,
    DeepDive,
    Investment,
    Finalize,
    Success,
}

impl QuotePhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: QuotePhase) -> bool {
        use QuotePhase::*;
        matches!(
            (self, target),
            (Gateway, DeepDive)
                | (DeepDive, Investment)
                | (Investment, Finalize)
                | (Finalize, Success)
                | (DeepDive, Gateway)
                | (Investment, DeepDive)
                | (Finalize, Investment)
        )
    }

    /// Whether this phase is terminal (the request went through).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The next phase in the linear progression, if any.
    pub fn next(&self) -> Option<QuotePhase> {
        use QuotePhase::*;
        match self {
            Gateway => Some(DeepDive),
            DeepDive => Some(Investment),
            Investment => Some(Finalize),
            Finalize => Some(Success),
            Success => None,
        }
    }

    /// The phase a "back" control returns to, if any.
    pub fn previous(&self) -> Option<QuotePhase> {
        use QuotePhase::*;
        match self {
            DeepDive => Some(Gateway),
            Investment => Some(DeepDive),
            Finalize => Some(Investment),
            Gateway | Success => None,
        }
    }

    /// Progress bar fill for this phase.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::Gateway => 20,
            Self::DeepDive => 40,
            Self::Investment => 60,
            Self::Finalize => 80,
            Self::Success => 100,
        }
    }
}

impl std::fmt::Display for QuotePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gateway => "GATEWAY",
            Self::DeepDive => "DEEP_DIVE",
            Self::Investment => "INVESTMENT",
            Self::Finalize => "FINALIZE",
            Self::Success => "SUCCESS",
        };
        write!(f, "{s}")
    }
}

/// Why a submit call did not reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitRejection {
    /// Not in the Finalize phase.
    WrongPhase,
    /// Name, email, budget, or timeline is missing.
    Incomplete,
    /// Another submission is still in flight.
    InFlight,
}

impl std::fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WrongPhase => "wrong_phase",
            Self::Incomplete => "incomplete",
            Self::InFlight => "in_flight",
        };
        write!(f, "{s}")
    }
}

/// State of one quote session.
///
/// All operations are pure in-memory mutations. Operations that could not
/// apply return `false` and leave the state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub phase: QuotePhase,
    pub route: Option<ProjectRoute>,
    pub form: QuoteForm,
    pub is_submitting: bool,
    pub error: Option<String>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input is frozen while a submission is in flight and after success.
    fn is_locked(&self) -> bool {
        self.is_submitting || self.phase.is_terminal()
    }

    /// Pick a route at the gateway and move to the deep dive.
    ///
    /// Details entered for the same route earlier are kept; a different
    /// route starts from empty details.
    pub fn select_route(&mut self, route: ProjectRoute) -> bool {
        if self.is_locked() || self.phase != QuotePhase::Gateway {
            return false;
        }
        let keep = matches!(&self.form.specifics, Some(s) if s.route() == route);
        if !keep {
            self.form.specifics = Some(Specifics::empty(route));
        }
        self.route = Some(route);
        self.phase = QuotePhase::DeepDive;
        true
    }

    /// Insert or overwrite a route detail. Keys foreign to the selected
    /// route are ignored.
    pub fn update_specific(&mut self, key: &str, value: &str) -> bool {
        if self.is_locked() || self.route.is_none() {
            return false;
        }
        match self.form.specifics.as_mut() {
            Some(specifics) => specifics.set(key, value),
            None => false,
        }
    }

    pub fn set_budget(&mut self, budget: Budget) -> bool {
        if self.is_locked() {
            return false;
        }
        self.form.budget = Some(budget);
        true
    }

    pub fn set_timeline(&mut self, timeline: Timeline) -> bool {
        if self.is_locked() {
            return false;
        }
        self.form.timeline = Some(timeline);
        true
    }

    pub fn set_name(&mut self, name: &str) -> bool {
        if self.is_locked() {
            return false;
        }
        self.form.name = name.to_string();
        true
    }

    pub fn set_email(&mut self, email: &str) -> bool {
        if self.is_locked() {
            return false;
        }
        self.form.email = email.to_string();
        true
    }

    /// Guard for `advance`. Leaving the gateway takes `select_route` and
    /// leaving Finalize takes `submit`, so neither advances here.
    pub fn can_advance(&self) -> bool {
        if self.is_locked() {
            return false;
        }
        match self.phase {
            QuotePhase::DeepDive => self.route.is_some(),
            QuotePhase::Investment => self.form.has_investment(),
            QuotePhase::Gateway | QuotePhase::Finalize | QuotePhase::Success => false,
        }
    }

    /// Step forward one phase if the guard holds.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        match self.phase.next() {
            Some(next) if self.phase.can_transition_to(next) => {
                self.phase = next;
                true
            }
            _ => false,
        }
    }

    /// Step back one phase. Returning to the gateway clears the route.
    pub fn retreat(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        let Some(prev) = self.phase.previous() else {
            return false;
        };
        if prev == QuotePhase::Gateway {
            self.route = None;
        }
        self.phase = prev;
        true
    }

    /// Guard for `submit`.
    pub fn can_submit(&self) -> bool {
        self.check_submit().is_ok()
    }

    fn check_submit(&self) -> Result<(), SubmitRejection> {
        if self.is_submitting {
            return Err(SubmitRejection::InFlight);
        }
        if self.phase != QuotePhase::Finalize {
            return Err(SubmitRejection::WrongPhase);
        }
        if self.route.is_none() || !self.form.is_complete() {
            return Err(SubmitRejection::Incomplete);
        }
        Ok(())
    }

    /// Start a submission: check the guard, raise `is_submitting`, clear the
    /// previous error, and build the lead to insert.
    pub fn begin_submission(&mut self) -> Result<LeadRecord, SubmitRejection> {
        self.check_submit()?;
        let (Some(route), Some(budget), Some(timeline)) =
            (self.route, self.form.budget, self.form.timeline)
        else {
            return Err(SubmitRejection::Incomplete);
        };
        let specifics = self
            .form
            .specifics
            .as_ref()
            .map(Specifics::to_map)
            .unwrap_or_default();

        self.is_submitting = true;
        self.error = None;
        Ok(LeadRecord::new(
            &self.form.name,
            &self.form.email,
            route,
            budget,
            timeline,
            specifics,
        ))
    }

    /// Apply the outcome of the insert started by `begin_submission`.
    pub fn finish_submission(&mut self, stored: bool) {
        if !self.is_submitting {
            return;
        }
        self.is_submitting = false;
        if stored {
            self.phase = QuotePhase::Success;
            self.error = None;
        } else {
            self.error = Some(SUBMISSION_FAILURE_MESSAGE.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_finalize() -> WizardState {
        let mut state = WizardState::new();
        assert!(state.select_route(ProjectRoute::Digital));
        assert!(state.advance());
        state.set_budget(Budget::Growth);
        state.set_timeline(Timeline::Asap);
        assert!(state.advance());
        state.set_name("Ada Obi");
        state.set_email("ada@x.com");
        state
    }

    #[test]
    fn valid_transitions() {
        use QuotePhase::*;
        let transitions = [
            (Gateway, DeepDive),
            (DeepDive, Investment),
            (Investment, Finalize),
            (Finalize, Success),
            (DeepDive, Gateway),
            (Investment, DeepDive),
            (Finalize, Investment),
        ];
        for (from, to) in transitions {
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn invalid_transitions() {
        use QuotePhase::*;
        // Skip phases
        assert!(!Gateway.can_transition_to(Investment));
        assert!(!DeepDive.can_transition_to(Finalize));
        assert!(!Investment.can_transition_to(Success));
        // Back more than one
        assert!(!Finalize.can_transition_to(DeepDive));
        // Terminal
        assert!(!Success.can_transition_to(Finalize));
        assert!(!Success.can_transition_to(Gateway));
        // Self-transition
        assert!(!Investment.can_transition_to(Investment));
    }

    #[test]
    fn next_walks_all_phases() {
        use QuotePhase::*;
        let expected = [DeepDive, Investment, Finalize, Success];
        let mut current = Gateway;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
        assert!(current.previous().is_none());
        assert!(Gateway.previous().is_none());
    }

    #[test]
    fn display_matches_serde() {
        use QuotePhase::*;
        for phase in [Gateway, DeepDive, Investment, Finalize, Success] {
            let display = format!("{phase}");
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn default_state() {
        let state = WizardState::default();
        assert_eq!(state.phase, QuotePhase::Gateway);
        assert!(state.route.is_none());
        assert_eq!(state.form, QuoteForm::default());
        assert!(!state.is_submitting);
        assert!(state.error.is_none());
        assert_eq!(state.phase.progress_percent(), 20);
    }

    #[test]
    fn gateway_cannot_advance_without_route() {
        let mut state = WizardState::new();
        assert!(!state.advance());
        assert_eq!(state.phase, QuotePhase::Gateway);
        assert!(!state.retreat());
    }

    #[test]
    fn investment_guard_requires_budget_and_timeline() {
        let cases = [
            (None, None),
            (Some(Budget::Starter), None),
            (None, Some(Timeline::WithinOneMonth)),
        ];
        for (budget, timeline) in cases {
            let mut state = WizardState::new();
            state.select_route(ProjectRoute::Media);
            state.advance();
            if let Some(b) = budget {
                state.set_budget(b);
            }
            if let Some(t) = timeline {
                state.set_timeline(t);
            }
            assert!(!state.advance(), "advanced with {budget:?}/{timeline:?}");
            assert_eq!(state.phase, QuotePhase::Investment);
        }
    }

    #[test]
    fn finalize_only_leaves_through_submit() {
        let mut state = at_finalize();
        assert_eq!(state.phase, QuotePhase::Finalize);
        assert!(!state.advance());
        assert_eq!(state.phase, QuotePhase::Finalize);
    }

    #[test]
    fn back_and_forward_preserves_data() {
        let mut state = at_finalize();
        let before = state.form.clone();

        assert!(state.retreat());
        assert_eq!(state.phase, QuotePhase::Investment);
        assert!(state.advance());
        assert_eq!(state.phase, QuotePhase::Finalize);
        assert_eq!(state.form, before);
    }

    #[test]
    fn retreat_to_gateway_clears_route() {
        let mut state = WizardState::new();
        state.select_route(ProjectRoute::Art);
        assert_eq!(state.phase, QuotePhase::DeepDive);

        assert!(state.retreat());
        assert_eq!(state.phase, QuotePhase::Gateway);
        assert!(state.route.is_none());
    }

    #[test]
    fn reselecting_same_route_keeps_specifics() {
        let mut state = WizardState::new();
        state.select_route(ProjectRoute::Digital);
        state.update_specific("tech", "WordPress CMS");
        state.retreat();

        state.select_route(ProjectRoute::Digital);
        let specifics = state.form.specifics.as_ref().unwrap();
        assert_eq!(specifics.get("tech"), Some("WordPress CMS"));
    }

    #[test]
    fn switching_route_drops_stale_specifics() {
        let mut state = WizardState::new();
        state.select_route(ProjectRoute::Digital);
        state.update_specific("tech", "WordPress CMS");
        state.retreat();

        state.select_route(ProjectRoute::Social);
        let specifics = state.form.specifics.as_ref().unwrap();
        assert_eq!(specifics.route(), ProjectRoute::Social);
        assert!(specifics.to_map().is_empty());
        assert!(!state.update_specific("tech", "Custom React Web"));
        assert!(state.update_specific("goal", "Brand Awareness"));
    }

    #[test]
    fn update_specific_requires_route() {
        let mut state = WizardState::new();
        assert!(!state.update_specific("tech", "Branding Only"));
    }

    #[test]
    fn begin_submission_builds_new_lead() {
        let mut state = at_finalize();
        state.update_specific("tech", "Custom React Web");
        state.error = Some("old".into());

        let lead = state.begin_submission().unwrap();
        assert!(state.is_submitting);
        assert!(state.error.is_none());
        assert_eq!(lead.project_type, ProjectRoute::Digital);
        assert_eq!(lead.budget, Budget::Growth);
        assert_eq!(lead.specifics["tech"], "Custom React Web");
    }

    #[test]
    fn submission_rejections() {
        let mut state = WizardState::new();
        assert_eq!(state.begin_submission(), Err(SubmitRejection::WrongPhase));

        let mut state = at_finalize();
        state.set_email("");
        assert_eq!(state.begin_submission(), Err(SubmitRejection::Incomplete));
        assert!(!state.is_submitting);

        let mut state = at_finalize();
        state.begin_submission().unwrap();
        assert_eq!(state.begin_submission(), Err(SubmitRejection::InFlight));
    }

    #[test]
    fn input_frozen_while_submitting() {
        let mut state = at_finalize();
        state.begin_submission().unwrap();

        assert!(!state.set_name("Someone Else"));
        assert!(!state.retreat());
        assert!(!state.set_budget(Budget::Flagship));
        assert_eq!(state.form.name, "Ada Obi");
        assert_eq!(state.phase, QuotePhase::Finalize);
    }

    #[test]
    fn failed_submission_stays_in_finalize() {
        let mut state = at_finalize();
        state.begin_submission().unwrap();
        state.finish_submission(false);

        assert_eq!(state.phase, QuotePhase::Finalize);
        assert!(!state.is_submitting);
        assert_eq!(state.error.as_deref(), Some(SUBMISSION_FAILURE_MESSAGE));
        assert!(state.can_submit());

        state.begin_submission().unwrap();
        assert!(state.error.is_none());
    }

    #[test]
    fn success_is_terminal() {
        let mut state = at_finalize();
        state.begin_submission().unwrap();
        state.finish_submission(true);

        assert_eq!(state.phase, QuotePhase::Success);
        assert!(!state.retreat());
        assert!(!state.advance());
        assert!(!state.set_name("Other"));
        assert_eq!(state.begin_submission(), Err(SubmitRejection::WrongPhase));
    }

    #[test]
    fn finish_without_begin_is_ignored() {
        let mut state = at_finalize();
        state.finish_submission(true);
        assert_eq!(state.phase, QuotePhase::Finalize);
    }
}
