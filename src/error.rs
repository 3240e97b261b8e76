//! Typed error taxonomy for upstream YNAB API failures.
//!
//! Every failure mode the client or token verifier can hit maps to one
//! variant here. The tool layer flattens these into uniform error objects;
//! nothing propagates past the tool boundary as a protocol fault.

use thiserror::Error;

/// Kind of resource a request addressed, used to label not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    /// A budget id (or the `last-used` sentinel).
    Budget,
    /// An account id within a budget.
    Account,
    /// A category id within a budget.
    Category,
    /// A payee id within a budget.
    Payee,
    /// A transaction id within a budget.
    Transaction,
    /// The request addressed more than one resource and upstream did not
    /// say which was missing.
    Unknown,
}

impl ResourceKind {
    /// Human-readable label used in error messages.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Budget => "Budget",
            Self::Account => "Account",
            Self::Category => "Category",
            Self::Payee => "Payee",
            Self::Transaction => "Transaction",
            Self::Unknown => "Resource",
        }
    }

    /// Maps a structured `resource_type` value from a 404 error body.
    pub(crate) fn from_wire(value: &str) -> Self {
        match value {
            "budget" => Self::Budget,
            "account" => Self::Account,
            "category" => Self::Category,
            "payee" => Self::Payee,
            "transaction" => Self::Transaction,
            _ => Self::Unknown,
        }
    }
}

/// Errors surfaced by the YNAB API client and the token verifier.
///
/// Not-found mapping never inspects upstream message text: a 404 body
/// carrying structured `resource_type`/`resource_id` fields classifies
/// precisely, and anything else falls back to the most specific id the
/// request addressed ([`ResourceKind::Unknown`] when that is ambiguous).
#[derive(Debug, Error)]
pub(crate) enum YnabError {
    /// Upstream rejected the bearer token (HTTP 401).
    #[error("Invalid or expired access token")]
    Unauthenticated,

    /// The addressed resource does not exist upstream (HTTP 404).
    #[error("{} with ID '{}' not found", .kind.label(), .id)]
    NotFound {
        /// Which resource kind was missing, when known.
        kind: ResourceKind,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Upstream rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded")]
    RateLimited {
        /// Seconds to wait before retrying, when upstream supplies one.
        retry_after: Option<u64>,
    },

    /// A date filter or patch field was not a valid `YYYY-MM-DD` date.
    /// Raised before any network call is attempted.
    #[error("Invalid date format: '{value}'. Expected format: YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// Any other non-2xx upstream response.
    #[error("{detail}")]
    Api {
        /// HTTP status code returned by upstream.
        status: u16,
        /// Upstream error detail, or a synthesized `API error: {status}`.
        detail: String,
    },

    /// Connection failure, timeout, or response-body decoding failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured API base URL cannot carry request path segments.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect for readability"
)]
mod tests {
    use super::{ResourceKind, YnabError};

    #[test]
    fn not_found_message_names_the_kind() {
        let err = YnabError::NotFound {
            kind: ResourceKind::Budget,
            id: "b-001".to_owned(),
        };
        assert_eq!(err.to_string(), "Budget with ID 'b-001' not found");
    }

    #[test]
    fn ambiguous_not_found_uses_generic_label() {
        let err = YnabError::NotFound {
            kind: ResourceKind::Unknown,
            id: "acc-9".to_owned(),
        };
        assert_eq!(err.to_string(), "Resource with ID 'acc-9' not found");
    }

    #[test]
    fn invalid_date_message_carries_input() {
        let err = YnabError::InvalidDate {
            value: "not-a-date".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date format: 'not-a-date'. Expected format: YYYY-MM-DD"
        );
    }

    #[test]
    fn rate_limited_message_is_fixed() {
        let err = YnabError::RateLimited {
            retry_after: Some(5),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn resource_kind_round_trips_wire_values() {
        assert_eq!(ResourceKind::from_wire("budget"), ResourceKind::Budget);
        assert_eq!(ResourceKind::from_wire("account"), ResourceKind::Account);
        assert_eq!(ResourceKind::from_wire("category"), ResourceKind::Category);
        assert_eq!(ResourceKind::from_wire("payee"), ResourceKind::Payee);
        assert_eq!(
            ResourceKind::from_wire("transaction"),
            ResourceKind::Transaction
        );
        assert_eq!(ResourceKind::from_wire("widget"), ResourceKind::Unknown);
    }
}
