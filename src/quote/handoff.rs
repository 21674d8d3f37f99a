//! Messaging hand-off: the prefilled chat message offered after a request.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;

use super::model::{ProjectRoute, QuoteForm};
use crate::config::HandoffConfig;

/// Characters left bare in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Brief used when none of the headline details were filled in.
pub const DEFAULT_BRIEF: &str = "New Project";

/// Headline detail for the message: `tech`, then `nature`, then `goal`.
pub fn handoff_brief(form: &QuoteForm) -> &str {
    form.specifics
        .as_ref()
        .and_then(|s| s.get("tech").or_else(|| s.get("nature")).or_else(|| s.get("goal")))
        .unwrap_or(DEFAULT_BRIEF)
}

/// Render the hand-off message for `route`.
pub fn handoff_message(studio_name: &str, route: ProjectRoute, form: &QuoteForm) -> String {
    format!(
        "Hi {studio_name}! I just submitted a {route} project request ({}) for {}. \
         I'd like to fast-track my consultation!",
        handoff_brief(form),
        form.name.trim(),
    )
}

/// Deep link that opens the messaging service with the message prefilled.
pub fn handoff_url(config: &HandoffConfig, route: ProjectRoute, form: &QuoteForm) -> Url {
    let message = handoff_message(&config.studio_name, route, form);
    let encoded = utf8_percent_encode(&message, URI_COMPONENT);
    let mut url = config.base_url.clone();
    url.set_query(Some(&format!("text={encoded}")));
    url
}
