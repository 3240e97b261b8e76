//! Bearer-token verification against the YNAB API.
//!
//! There is no signature to check on a YNAB personal access token, so the
//! only way to validate one is to spend it: a `GET /user` probe with a
//! short dedicated timeout. Verification happens on every tool call and
//! any failure, whatever the cause, means no credential.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, Url};

use crate::client::{YnabClient, http_client};
use crate::error::YnabError;

/// Timeout for the verification probe, independent of the API timeout.
const VERIFY_TIMEOUT_SECS: u64 = 10;

/// Fixed credential horizon. YNAB does not disclose token lifetimes, so
/// verification stamps a conservative one.
const CREDENTIAL_TTL_MINUTES: i64 = 90;

/// A token that passed verification, with the identity behind it.
#[derive(Debug, Clone)]
pub(crate) struct AccessCredential {
    /// The verified bearer token.
    pub(crate) token: String,
    /// YNAB user id the token belongs to.
    pub(crate) user_id: String,
    /// Email on the account, when YNAB discloses it.
    pub(crate) email: Option<String>,
    /// When this verification result stops being trustworthy.
    pub(crate) expires_at: DateTime<Utc>,
}

/// Verifies bearer tokens by probing the API with them.
pub(crate) struct TokenVerifier {
    /// Dedicated pool with the short verification timeout.
    http: Client,
    /// API root the probe is sent to.
    api_base_url: Url,
}

impl core::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("api_base_url", &self.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier probing the given API root.
    pub(crate) fn new(api_base_url: Url) -> Result<Self, YnabError> {
        Ok(Self {
            http: http_client(core::time::Duration::from_secs(VERIFY_TIMEOUT_SECS))?,
            api_base_url,
        })
    }

    /// Checks `token` by fetching the user behind it.
    ///
    /// Returns `None` on any failure: a rejected token, a network error,
    /// or a response that does not parse.
    pub(crate) async fn verify(&self, token: &str) -> Option<AccessCredential> {
        let client = YnabClient::new(
            self.http.clone(),
            self.api_base_url.clone(),
            token.to_owned(),
        );
        match client.get_user().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "access token verified");
                Some(AccessCredential {
                    token: token.to_owned(),
                    user_id: user.id,
                    email: user.email,
                    expires_at: Utc::now() + TimeDelta::minutes(CREDENTIAL_TTL_MINUTES),
                })
            }
            Err(err) => {
                tracing::debug!(%err, "access token verification failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect and indexing for readability"
)]
mod tests {
    use chrono::Utc;
    use reqwest::Url;
    use serde_json::json;

    use super::TokenVerifier;
    use crate::testing::{Reply, StubServer};

    fn verifier_for(server: &StubServer) -> TokenVerifier {
        let api_base_url = Url::parse(&server.url()).expect("stub base url");
        TokenVerifier::new(api_base_url).expect("build verifier")
    }

    #[tokio::test]
    async fn valid_token_yields_a_credential_with_future_expiry() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({"data": {"user": {"id": "u-1", "email": "sam@example.com"}}}),
        )])
        .await;

        let credential = verifier_for(&server)
            .verify("good-token")
            .await
            .expect("credential");

        assert_eq!(credential.token, "good-token");
        assert_eq!(credential.user_id, "u-1");
        assert_eq!(credential.email.as_deref(), Some("sam@example.com"));
        assert!(credential.expires_at > Utc::now());

        let requests = server.requests();
        assert_eq!(requests[0].target, "/v1/user");
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer good-token")
        );
    }

    #[tokio::test]
    async fn rejected_token_yields_no_credential() {
        let server = StubServer::start(vec![Reply::json(
            401,
            &json!({"error": {"detail": "Unauthorized"}}),
        )])
        .await;

        assert!(verifier_for(&server).verify("bad-token").await.is_none());
    }

    #[tokio::test]
    async fn unparseable_success_body_yields_no_credential() {
        let server = StubServer::start(vec![Reply::text(200, "not json at all")]).await;

        assert!(verifier_for(&server).verify("weird-token").await.is_none());
    }
}
