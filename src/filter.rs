//! Removal of browser-driven noise from a recorded session
//!
//! A user action such as a form POST is often answered by a redirect that
//! the browser follows on its own, and every page pulls in images, style
//! sheets and scripts. Those follow-up fetches are not user actions and are
//! dropped. POST requests are always kept.

use tracing::debug;

use crate::capture::Exchange;
use crate::config::FilterConfig;

/// Look-back state carried from one exchange to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Status code of the previous exchange, kept or dropped
    pub previous_status: Option<String>,
}

/// Why an exchange was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Previous response was a redirect; this is the browser following it
    FollowsRedirect(String),
    /// Response content type marks a static resource
    StaticContentType(String),
    /// URL suffix marks a static resource
    StaticUrl(String),
}

/// Outcome for one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Exchange is a user action and is replayed
    Keep,
    /// Exchange is noise
    Drop(DropReason),
}

impl Decision {
    /// Whether the exchange is kept
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Keep/drop classifier for recorded exchanges
#[derive(Debug, Clone, Default)]
pub struct ExchangeFilter {
    rules: FilterConfig,
}

impl ExchangeFilter {
    /// Create a filter with the given rules
    #[must_use]
    pub fn new(rules: FilterConfig) -> Self {
        Self { rules }
    }

    /// Decide on one exchange given the state left by its predecessor
    ///
    /// The returned state always records this exchange's status code,
    /// whatever the decision.
    pub fn step(&self, state: FilterState, exchange: &Exchange) -> (FilterState, Decision) {
        let decision = self.decide(&state, exchange);
        let next = FilterState {
            previous_status: Some(exchange.response.status_code().to_string()),
        };
        (next, decision)
    }

    fn decide(&self, state: &FilterState, exchange: &Exchange) -> Decision {
        let request = &exchange.request;
        if request.method() == "POST" {
            return Decision::Keep;
        }

        if let Some(previous) = &state.previous_status {
            if self.rules.redirect_codes.iter().any(|code| code == previous) {
                return Decision::Drop(DropReason::FollowsRedirect(previous.clone()));
            }
        }

        let content_type = exchange.response.content_type();
        if let Some(kind) = self
            .rules
            .static_content_types
            .iter()
            .find(|kind| content_type.contains(kind.as_str()))
        {
            return Decision::Drop(DropReason::StaticContentType(kind.clone()));
        }

        if let Some(suffix) = self
            .rules
            .static_url_suffixes
            .iter()
            .find(|suffix| request.url().ends_with(suffix.as_str()))
        {
            return Decision::Drop(DropReason::StaticUrl(suffix.clone()));
        }

        Decision::Keep
    }

    /// Keep the user actions of a session, in order
    pub fn apply(&self, exchanges: Vec<Exchange>) -> Vec<Exchange> {
        let total = exchanges.len();
        let (_, kept) = exchanges.into_iter().fold(
            (FilterState::default(), Vec::with_capacity(total)),
            |(state, mut kept), exchange| {
                let (state, decision) = self.step(state, &exchange);
                match decision {
                    Decision::Keep => {
                        debug!(
                            "Keeping {} {} {}",
                            exchange.id,
                            exchange.request.method(),
                            exchange.request.url()
                        );
                        kept.push(exchange);
                    }
                    Decision::Drop(reason) => {
                        debug!(
                            "Dropping {} {} {}: {:?}",
                            exchange.id,
                            exchange.request.method(),
                            exchange.request.url(),
                            reason
                        );
                    }
                }
                (state, kept)
            },
        );

        debug!("Filter kept {} of {} exchanges", kept.len(), total);
        kept
    }
}
