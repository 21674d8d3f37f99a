//! Quote form and lead data models.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuoteError;

/// The project category picked at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRoute {
    Media,
    Digital,
    Social,
    Art,
}

impl ProjectRoute {
    pub const ALL: [ProjectRoute; 4] = [Self::Media, Self::Digital, Self::Social, Self::Art];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Media => "MEDIA",
            Self::Digital => "DIGITAL",
            Self::Social => "SOCIAL",
            Self::Art => "ART",
        }
    }

    /// Gateway card title.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Media => "Media Production",
            Self::Digital => "Digital Identity",
            Self::Social => "Social & Growth",
            Self::Art => "Art & Framing",
        }
    }

    /// Gateway card subtitle.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Media => "Photo, Video, Drone, Events",
            Self::Digital => "Web, UI/UX, Mobile Apps",
            Self::Social => "Ads, Management, Strategy",
            Self::Art => "Custom Canvas, Gallery Pieces",
        }
    }

    /// The specifics keys collected for this route.
    pub fn specific_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Media => &["nature", "location", "guests"],
            Self::Digital => &["tech", "hosting"],
            Self::Social => &["platform", "goal"],
            Self::Art => &["art_brief"],
        }
    }
}

impl std::fmt::Display for ProjectRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRoute {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEDIA" => Ok(Self::Media),
            "DIGITAL" => Ok(Self::Digital),
            "SOCIAL" => Ok(Self::Social),
            "ART" => Ok(Self::Art),
            _ => Err(QuoteError::UnknownRoute(s.to_string())),
        }
    }
}

/// Detail fields for a media production request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSpecifics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<String>,
}

/// Detail fields for a web/app request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSpecifics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting: Option<String>,
}

/// Detail fields for a social media request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSpecifics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Detail fields for an art commission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtSpecifics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_brief: Option<String>,
}

/// Route-dependent details collected during the deep dive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specifics {
    Media(MediaSpecifics),
    Digital(DigitalSpecifics),
    Social(SocialSpecifics),
    Art(ArtSpecifics),
}

impl Specifics {
    /// An empty set of details for `route`.
    pub fn empty(route: ProjectRoute) -> Self {
        match route {
            ProjectRoute::Media => Self::Media(MediaSpecifics::default()),
            ProjectRoute::Digital => Self::Digital(DigitalSpecifics::default()),
            ProjectRoute::Social => Self::Social(SocialSpecifics::default()),
            ProjectRoute::Art => Self::Art(ArtSpecifics::default()),
        }
    }

    pub fn route(&self) -> ProjectRoute {
        match self {
            Self::Media(_) => ProjectRoute::Media,
            Self::Digital(_) => ProjectRoute::Digital,
            Self::Social(_) => ProjectRoute::Social,
            Self::Art(_) => ProjectRoute::Art,
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match (self, key) {
            (Self::Media(m), "nature") => Some(&mut m.nature),
            (Self::Media(m), "location") => Some(&mut m.location),
            (Self::Media(m), "guests") => Some(&mut m.guests),
            (Self::Digital(d), "tech") => Some(&mut d.tech),
            (Self::Digital(d), "hosting") => Some(&mut d.hosting),
            (Self::Social(s), "platform") => Some(&mut s.platform),
            (Self::Social(s), "goal") => Some(&mut s.goal),
            (Self::Art(a), "art_brief") => Some(&mut a.art_brief),
            _ => None,
        }
    }

    /// Insert or overwrite `key`. Returns `false` when the key does not
    /// belong to this route.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.slot(key) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Look up a populated, non-empty key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match (self, key) {
            (Self::Media(m), "nature") => m.nature.as_deref(),
            (Self::Media(m), "location") => m.location.as_deref(),
            (Self::Media(m), "guests") => m.guests.as_deref(),
            (Self::Digital(d), "tech") => d.tech.as_deref(),
            (Self::Digital(d), "hosting") => d.hosting.as_deref(),
            (Self::Social(s), "platform") => s.platform.as_deref(),
            (Self::Social(s), "goal") => s.goal.as_deref(),
            (Self::Art(a), "art_brief") => a.art_brief.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// Populated keys as a flat map, the shape stored on a lead.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.route()
            .specific_keys()
            .iter()
            .filter_map(|key| self.get(key).map(|v| (key.to_string(), v.to_string())))
            .collect()
    }
}

/// Estimated budget ranges (Naira).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "₦200k – ₦500k")]
    Starter,
    #[serde(rename = "₦500k – ₦1.5M")]
    Growth,
    #[serde(rename = "₦1.5M – ₦5M")]
    Premium,
    #[serde(rename = "₦5M+")]
    Flagship,
}

impl Budget {
    pub const ALL: [Budget; 4] = [Self::Starter, Self::Growth, Self::Premium, Self::Flagship];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Starter => "₦200k – ₦500k",
            Self::Growth => "₦500k – ₦1.5M",
            Self::Premium => "₦1.5M – ₦5M",
            Self::Flagship => "₦5M+",
        }
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Budget {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QuoteError::UnknownBudget(s.to_string()))
    }
}

/// How soon the project should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "ASAP")]
    Asap,
    #[serde(rename = "Within 1 Month")]
    WithinOneMonth,
    #[serde(rename = "3+ Months")]
    ThreePlusMonths,
}

impl Timeline {
    pub const ALL: [Timeline; 3] = [Self::Asap, Self::WithinOneMonth, Self::ThreePlusMonths];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Asap => "ASAP",
            Self::WithinOneMonth => "Within 1 Month",
            Self::ThreePlusMonths => "3+ Months",
        }
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeline {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QuoteError::UnknownTimeline(s.to_string()))
    }
}

/// Everything the visitor has typed or picked so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteForm {
    pub name: String,
    pub email: String,
    pub budget: Option<Budget>,
    pub timeline: Option<Timeline>,
    /// Details for the selected route. Kept across a return to the gateway
    /// so that picking the same route again restores them.
    pub specifics: Option<Specifics>,
}

impl QuoteForm {
    /// Budget and timeline are both chosen.
    pub fn has_investment(&self) -> bool {
        self.budget.is_some() && self.timeline.is_some()
    }

    /// Name, email, budget, and timeline are all present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty() && self.has_investment()
    }
}

/// Review state of a stored lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 3] = [Self::New, Self::Contacted, Self::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Contacted => "CONTACTED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QuoteError::UnknownLeadStatus(s.to_string()))
    }
}

/// A submitted quote request, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub project_type: ProjectRoute,
    pub budget: Budget,
    pub timeline: Timeline,
    pub specifics: BTreeMap<String, String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    /// Build a fresh `NEW` lead.
    pub fn new(
        name: &str,
        email: &str,
        project_type: ProjectRoute,
        budget: Budget,
        timeline: Timeline,
        specifics: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            project_type,
            budget,
            timeline,
            specifics,
            status: LeadStatus::New,
            created_at: Utc::now(),
        }
    }
}

/// Lead totals per status, for the review dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeadCounts {
    pub new: u64,
    pub contacted: u64,
    pub closed: u64,
    pub total: u64,
}
