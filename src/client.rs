//! Thin asynchronous client for the YNAB REST v1 API.
//!
//! Every successful response arrives wrapped in a `{"data": ...}` envelope;
//! the client unwraps it and hands back the typed payload. Failures are
//! classified into [`YnabError`] variants from the HTTP status and the
//! structured error body, never from upstream message text.

use core::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ResourceKind, YnabError};
use crate::models::{
    Account, Budget, BudgetSummary, Category, ClearedStatus, FlagColor, Payee, TransactionDetail,
    User,
};

/// Sentinel budget id resolved server-side to the most recently used budget.
pub(crate) const LAST_USED_BUDGET_ID: &str = "last-used";

/// Builds the shared HTTP connection pool with the given request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, YnabError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Checks that `value` is a calendar date in `YYYY-MM-DD` form.
pub(crate) fn validate_date(value: &str) -> Result<(), YnabError> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(YnabError::InvalidDate {
            value: value.to_owned(),
        })
    }
}

/// Server-side filters accepted by the transaction listing endpoints.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionQuery {
    /// Only include transactions on or after this `YYYY-MM-DD` date.
    pub(crate) since_date: Option<String>,
    /// Restrict to `uncategorized` or `unapproved` transactions.
    pub(crate) transaction_type: Option<String>,
}

impl TransactionQuery {
    /// Renders the filters as query parameters, validating the date first.
    fn to_params(&self) -> Result<Vec<(&'static str, String)>, YnabError> {
        let mut params = Vec::new();
        if let Some(since_date) = self.since_date.as_deref() {
            validate_date(since_date)?;
            params.push(("since_date", since_date.to_owned()));
        }
        if let Some(transaction_type) = self.transaction_type.as_deref() {
            params.push(("type", transaction_type.to_owned()));
        }
        Ok(params)
    }
}

/// Fields to change on an existing transaction.
///
/// Only fields that are `Some` are serialized, so everything left `None`
/// keeps its current value upstream.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct TransactionPatch {
    /// New memo text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) memo: Option<String>,
    /// New amount in milliunits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<i64>,
    /// Reassign the transaction to this payee id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payee_id: Option<String>,
    /// Rename the payee, creating it upstream when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) payee_name: Option<String>,
    /// Reassign the transaction to this category id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) category_id: Option<String>,
    /// New cleared status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cleared: Option<ClearedStatus>,
    /// New approval state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) approved: Option<bool>,
    /// New flag colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) flag_color: Option<FlagColor>,
    /// New transaction date in `YYYY-MM-DD` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,
}

/// Standard `{"data": ...}` wrapper around every successful response.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    /// Endpoint-specific payload.
    data: T,
}

/// Payload of `GET /budgets`.
#[derive(Debug, Deserialize)]
struct BudgetsData {
    /// Budgets the token can access.
    budgets: Vec<BudgetSummary>,
}

/// Payload of `GET /budgets/{id}`.
#[derive(Debug, Deserialize)]
struct BudgetData {
    /// The requested budget.
    budget: Budget,
    /// Sync cursor delivered beside the budget, not inside it.
    server_knowledge: Option<i64>,
}

/// Payload of `GET /budgets/{id}/accounts`.
#[derive(Debug, Deserialize)]
struct AccountsData {
    /// Accounts in the budget.
    accounts: Vec<Account>,
}

/// Payload of `GET /budgets/{id}/accounts/{id}`.
#[derive(Debug, Deserialize)]
struct AccountData {
    /// The requested account.
    account: Account,
}

/// Payload of the transaction listing endpoints.
#[derive(Debug, Deserialize)]
struct TransactionsData {
    /// Transactions in reverse chronological order.
    transactions: Vec<TransactionDetail>,
}

/// Payload of `PUT /budgets/{id}/transactions/{id}`.
#[derive(Debug, Deserialize)]
struct TransactionData {
    /// The transaction after the update was applied.
    transaction: TransactionDetail,
}

/// Payload of `GET /budgets/{id}/categories`.
#[derive(Debug, Deserialize)]
struct CategoryGroupsData {
    /// Category groups with their categories nested inside.
    category_groups: Vec<GroupWithCategories>,
}

/// One category group as delivered on the wire.
#[derive(Debug, Deserialize)]
struct GroupWithCategories {
    /// Group display name, denormalised onto each category.
    name: String,
    /// Categories belonging to the group.
    #[serde(default)]
    categories: Vec<Category>,
}

/// Payload of `GET /budgets/{id}/payees`.
#[derive(Debug, Deserialize)]
struct PayeesData {
    /// Payees in the budget.
    payees: Vec<Payee>,
}

/// Payload of `GET /user`.
#[derive(Debug, Deserialize)]
struct UserData {
    /// The authenticated user.
    user: User,
}

/// Standard `{"error": ...}` wrapper around every failure response.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    /// The error description.
    error: ErrorDetail,
}

/// Structured error body; all fields are optional on the wire.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    /// Human-readable description of the failure.
    detail: Option<String>,
    /// Kind of the missing resource on a 404, when upstream names it.
    resource_type: Option<String>,
    /// Identifier of the missing resource on a 404, when upstream names it.
    resource_id: Option<String>,
}

/// Asynchronous client bound to one bearer token.
pub(crate) struct YnabClient {
    /// Shared HTTP connection pool.
    http: Client,
    /// API root, always carrying a trailing slash.
    base_url: Url,
    /// Bearer token sent with every request.
    token: String,
}

impl core::fmt::Debug for YnabClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("YnabClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl YnabClient {
    /// Creates a client from an already-configured connection pool.
    pub(crate) const fn new(http: Client, base_url: Url, token: String) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Lists budget summaries, optionally with their account summaries.
    pub(crate) async fn get_budgets(
        &self,
        include_accounts: bool,
    ) -> Result<Vec<BudgetSummary>, YnabError> {
        let mut query = Vec::new();
        if include_accounts {
            query.push(("include_accounts", "true".to_owned()));
        }
        let data: BudgetsData = self
            .get(&["budgets"], &query, ResourceKind::Unknown, "")
            .await?;
        Ok(data.budgets)
    }

    /// Fetches one budget in full detail.
    ///
    /// The `server_knowledge` cursor arrives beside the budget in the
    /// envelope and is folded into the returned value. `budget_id` may be
    /// [`LAST_USED_BUDGET_ID`].
    pub(crate) async fn get_budget(&self, budget_id: &str) -> Result<Budget, YnabError> {
        let BudgetData {
            mut budget,
            server_knowledge,
        } = self
            .get(
                &["budgets", budget_id],
                &[],
                ResourceKind::Budget,
                budget_id,
            )
            .await?;
        budget.server_knowledge = server_knowledge;
        Ok(budget)
    }

    /// Lists the accounts in a budget.
    pub(crate) async fn get_accounts(&self, budget_id: &str) -> Result<Vec<Account>, YnabError> {
        let data: AccountsData = self
            .get(
                &["budgets", budget_id, "accounts"],
                &[],
                ResourceKind::Budget,
                budget_id,
            )
            .await?;
        Ok(data.accounts)
    }

    /// Fetches a single account.
    pub(crate) async fn get_account(
        &self,
        budget_id: &str,
        account_id: &str,
    ) -> Result<Account, YnabError> {
        let data: AccountData = self
            .get(
                &["budgets", budget_id, "accounts", account_id],
                &[],
                ResourceKind::Unknown,
                account_id,
            )
            .await?;
        Ok(data.account)
    }

    /// Lists transactions across the whole budget.
    pub(crate) async fn get_transactions(
        &self,
        budget_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        let params = query.to_params()?;
        let data: TransactionsData = self
            .get(
                &["budgets", budget_id, "transactions"],
                &params,
                ResourceKind::Budget,
                budget_id,
            )
            .await?;
        Ok(data.transactions)
    }

    /// Lists transactions scoped to one account.
    pub(crate) async fn get_account_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        let params = query.to_params()?;
        let data: TransactionsData = self
            .get(
                &["budgets", budget_id, "accounts", account_id, "transactions"],
                &params,
                ResourceKind::Unknown,
                account_id,
            )
            .await?;
        Ok(data.transactions)
    }

    /// Lists transactions scoped to one category.
    pub(crate) async fn get_category_transactions(
        &self,
        budget_id: &str,
        category_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        let params = query.to_params()?;
        let data: TransactionsData = self
            .get(
                &[
                    "budgets",
                    budget_id,
                    "categories",
                    category_id,
                    "transactions",
                ],
                &params,
                ResourceKind::Unknown,
                category_id,
            )
            .await?;
        Ok(data.transactions)
    }

    /// Lists transactions scoped to one payee.
    pub(crate) async fn get_payee_transactions(
        &self,
        budget_id: &str,
        payee_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        let params = query.to_params()?;
        let data: TransactionsData = self
            .get(
                &["budgets", budget_id, "payees", payee_id, "transactions"],
                &params,
                ResourceKind::Unknown,
                payee_id,
            )
            .await?;
        Ok(data.transactions)
    }

    /// Lists categories flattened across their groups.
    ///
    /// The wire format nests categories inside category groups; callers get
    /// a flat list with each group's name denormalised onto its members.
    pub(crate) async fn get_categories(&self, budget_id: &str) -> Result<Vec<Category>, YnabError> {
        let data: CategoryGroupsData = self
            .get(
                &["budgets", budget_id, "categories"],
                &[],
                ResourceKind::Budget,
                budget_id,
            )
            .await?;
        let mut categories = Vec::new();
        for group in data.category_groups {
            let group_name = group.name;
            for mut category in group.categories {
                category.category_group_name = Some(group_name.clone());
                categories.push(category);
            }
        }
        Ok(categories)
    }

    /// Lists the payees in a budget.
    pub(crate) async fn get_payees(&self, budget_id: &str) -> Result<Vec<Payee>, YnabError> {
        let data: PayeesData = self
            .get(
                &["budgets", budget_id, "payees"],
                &[],
                ResourceKind::Budget,
                budget_id,
            )
            .await?;
        Ok(data.payees)
    }

    /// Applies a partial update to a transaction.
    ///
    /// The request body carries only the fields set on the patch, wrapped
    /// under the `transaction` key. A `date` on the patch is validated
    /// before the request is sent.
    pub(crate) async fn update_transaction(
        &self,
        budget_id: &str,
        transaction_id: &str,
        patch: &TransactionPatch,
    ) -> Result<TransactionDetail, YnabError> {
        if let Some(date) = patch.date.as_deref() {
            validate_date(date)?;
        }
        let url = self.endpoint(&["budgets", budget_id, "transactions", transaction_id])?;
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(&json!({ "transaction": patch }))
            .send()
            .await?;
        let data: TransactionData =
            Self::decode(response, ResourceKind::Unknown, transaction_id).await?;
        Ok(data.transaction)
    }

    /// Fetches the identity behind the bearer token.
    pub(crate) async fn get_user(&self) -> Result<User, YnabError> {
        let data: UserData = self.get(&["user"], &[], ResourceKind::Unknown, "").await?;
        Ok(data.user)
    }

    /// Issues a `GET` and unwraps the `data` envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
        fallback_kind: ResourceKind,
        fallback_id: &str,
    ) -> Result<T, YnabError> {
        let url = self.endpoint(segments)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        Self::decode(response, fallback_kind, fallback_id).await
    }

    /// Builds an absolute endpoint URL by appending path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, YnabError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| YnabError::BaseUrl(self.base_url.to_string()))?;
            let _path = path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Unwraps the success envelope or classifies the failure.
    async fn decode<T: DeserializeOwned>(
        response: Response,
        fallback_kind: ResourceKind,
        fallback_id: &str,
    ) -> Result<T, YnabError> {
        let status = response.status();
        if status.is_success() {
            let envelope: DataEnvelope<T> = response.json().await?;
            return Ok(envelope.data);
        }
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());
        let body = response.bytes().await.unwrap_or_default();
        Err(upstream_error(
            status.as_u16(),
            &body,
            retry_after,
            fallback_kind,
            fallback_id,
        ))
    }
}

/// Classifies a non-success response into a [`YnabError`].
///
/// A 404 prefers the structured `resource_type`/`resource_id` fields from
/// the error body; without them it falls back to the most specific id the
/// request addressed.
fn upstream_error(
    status: u16,
    body: &[u8],
    retry_after: Option<u64>,
    fallback_kind: ResourceKind,
    fallback_id: &str,
) -> YnabError {
    let error = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    match status {
        401 => YnabError::Unauthenticated,
        404 => {
            let kind = error
                .as_ref()
                .and_then(|detail| detail.resource_type.as_deref())
                .map_or(fallback_kind, ResourceKind::from_wire);
            let id = error
                .as_ref()
                .and_then(|detail| detail.resource_id.clone())
                .unwrap_or_else(|| fallback_id.to_owned());
            YnabError::NotFound { kind, id }
        }
        429 => YnabError::RateLimited { retry_after },
        _ => YnabError::Api {
            status,
            detail: error
                .and_then(|detail| detail.detail)
                .unwrap_or_else(|| format!("API error: {status}")),
        },
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
    use core::time::Duration;

    use reqwest::Url;
    use serde_json::json;

    use super::{TransactionPatch, TransactionQuery, YnabClient, http_client, validate_date};
    use crate::error::{ResourceKind, YnabError};
    use crate::testing::{Reply, StubServer};

    fn client_for(server: &StubServer) -> YnabClient {
        let base_url = Url::parse(&server.url()).expect("stub base url");
        let http = http_client(Duration::from_secs(5)).expect("http client");
        YnabClient::new(http, base_url, "test-token".to_owned())
    }

    #[tokio::test]
    async fn budgets_come_out_of_the_data_envelope() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({
                "data": {
                    "budgets": [
                        {"id": "b1", "name": "Household"},
                        {"id": "b2", "name": "Business"}
                    ]
                }
            }),
        )])
        .await;

        let budgets = client_for(&server)
            .get_budgets(false)
            .await
            .expect("list budgets");

        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].name, "Household");
        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].target, "/v1/budgets");
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer test-token")
        );
    }

    #[tokio::test]
    async fn include_accounts_becomes_a_query_parameter() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({"data": {"budgets": []}}),
        )])
        .await;

        let budgets = client_for(&server)
            .get_budgets(true)
            .await
            .expect("list budgets");

        assert!(budgets.is_empty());
        let requests = server.requests();
        assert_eq!(requests[0].target, "/v1/budgets?include_accounts=true");
    }

    #[tokio::test]
    async fn budget_detail_absorbs_the_server_knowledge_cursor() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({
                "data": {
                    "budget": {"id": "b1", "name": "Household"},
                    "server_knowledge": 42
                }
            }),
        )])
        .await;

        let budget = client_for(&server)
            .get_budget("b1")
            .await
            .expect("fetch budget");

        assert_eq!(budget.name, "Household");
        assert_eq!(budget.server_knowledge, Some(42));
        let requests = server.requests();
        assert_eq!(requests[0].target, "/v1/budgets/b1");
    }

    #[tokio::test]
    async fn structured_not_found_names_the_resource() {
        let server = StubServer::start(vec![Reply::json(
            404,
            &json!({
                "error": {
                    "detail": "Account not found",
                    "resource_type": "account",
                    "resource_id": "acc-9"
                }
            }),
        )])
        .await;

        let err = client_for(&server)
            .get_account("b1", "acc-9")
            .await
            .expect_err("missing account");

        assert_eq!(err.to_string(), "Account with ID 'acc-9' not found");
        assert!(matches!(
            err,
            YnabError::NotFound {
                kind: ResourceKind::Account,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn bare_not_found_falls_back_to_the_addressed_id() {
        let server = StubServer::start(vec![
            Reply::json(404, &json!({"error": {"detail": "Not found"}})),
            Reply::json(404, &json!({"error": {"detail": "Not found"}})),
        ])
        .await;
        let client = client_for(&server);

        let budget_err = client
            .get_budget("nope")
            .await
            .expect_err("missing budget");
        assert_eq!(budget_err.to_string(), "Budget with ID 'nope' not found");
        assert!(matches!(
            budget_err,
            YnabError::NotFound {
                kind: ResourceKind::Budget,
                ..
            }
        ));

        let account_err = client
            .get_account("b1", "acc-1")
            .await
            .expect_err("missing account");
        assert_eq!(account_err.to_string(), "Resource with ID 'acc-1' not found");
        assert!(matches!(
            account_err,
            YnabError::NotFound {
                kind: ResourceKind::Unknown,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_unauthenticated() {
        let server = StubServer::start(vec![Reply::json(
            401,
            &json!({"error": {"detail": "Unauthorized"}}),
        )])
        .await;

        let err = client_for(&server)
            .get_budgets(false)
            .await
            .expect_err("rejected token");

        assert!(matches!(err, YnabError::Unauthenticated));
        assert_eq!(err.to_string(), "Invalid or expired access token");
    }

    #[tokio::test]
    async fn rate_limit_carries_the_retry_after_header() {
        let server = StubServer::start(vec![
            Reply::json(429, &json!({"error": {"detail": "Too many requests"}}))
                .with_header("Retry-After", "20"),
        ])
        .await;

        let err = client_for(&server)
            .get_budgets(false)
            .await
            .expect_err("rate limited");

        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert!(matches!(
            err,
            YnabError::RateLimited {
                retry_after: Some(20),
            }
        ));
    }

    #[tokio::test]
    async fn server_errors_keep_the_upstream_detail() {
        let server = StubServer::start(vec![
            Reply::json(500, &json!({"error": {"detail": "boom"}})),
            Reply::text(502, "<html>bad gateway</html>"),
        ])
        .await;
        let client = client_for(&server);

        let detailed = client
            .get_budgets(false)
            .await
            .expect_err("server error");
        assert_eq!(detailed.to_string(), "boom");
        assert!(matches!(detailed, YnabError::Api { status: 500, .. }));

        let bare = client.get_budgets(false).await.expect_err("bad gateway");
        assert_eq!(bare.to_string(), "API error: 502");
        assert!(matches!(bare, YnabError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn bad_since_date_fails_before_any_request() {
        let server = StubServer::start(Vec::new()).await;
        let query = TransactionQuery {
            since_date: Some("2024-13-01".to_owned()),
            transaction_type: None,
        };

        let err = client_for(&server)
            .get_transactions("b1", &query)
            .await
            .expect_err("invalid date");

        assert!(matches!(err, YnabError::InvalidDate { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid date format: '2024-13-01'. Expected format: YYYY-MM-DD"
        );
        assert!(server.requests().is_empty());
    }

    #[test]
    fn leap_days_are_valid_dates() {
        validate_date("2024-02-29").expect("2024 is a leap year");
        let _not_leap = validate_date("2023-02-29").expect_err("2023 is not a leap year");
        let _not_date = validate_date("not-a-date").expect_err("not a date at all");
    }

    #[tokio::test]
    async fn since_date_and_type_travel_as_query_parameters() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({"data": {"transactions": []}}),
        )])
        .await;
        let query = TransactionQuery {
            since_date: Some("2024-06-01".to_owned()),
            transaction_type: Some("unapproved".to_owned()),
        };

        let transactions = client_for(&server)
            .get_transactions("b1", &query)
            .await
            .expect("list transactions");

        assert!(transactions.is_empty());
        let requests = server.requests();
        assert_eq!(
            requests[0].target,
            "/v1/budgets/b1/transactions?since_date=2024-06-01&type=unapproved"
        );
    }

    #[tokio::test]
    async fn categories_flatten_groups_and_carry_the_group_name() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({
                "data": {
                    "category_groups": [
                        {
                            "name": "Immediate Obligations",
                            "categories": [
                                {
                                    "id": "c1",
                                    "category_group_id": "g1",
                                    "name": "Rent",
                                    "hidden": false,
                                    "budgeted": 1_200_000,
                                    "activity": -1_200_000,
                                    "balance": 0
                                }
                            ]
                        },
                        {
                            "name": "Fun Money",
                            "categories": [
                                {
                                    "id": "c2",
                                    "category_group_id": "g2",
                                    "name": "Dining Out",
                                    "hidden": false,
                                    "budgeted": 250_000,
                                    "activity": -80_000,
                                    "balance": 170_000
                                }
                            ]
                        }
                    ]
                }
            }),
        )])
        .await;

        let categories = client_for(&server)
            .get_categories("b1")
            .await
            .expect("list categories");

        assert_eq!(categories.len(), 2);
        assert_eq!(
            categories[0].category_group_name.as_deref(),
            Some("Immediate Obligations")
        );
        assert_eq!(categories[1].category_group_name.as_deref(), Some("Fun Money"));
        assert_eq!(categories[1].name, "Dining Out");
    }

    #[tokio::test]
    async fn update_sends_only_the_patched_fields() {
        let server = StubServer::start(vec![Reply::json(
            200,
            &json!({
                "data": {
                    "transaction": {
                        "id": "t1",
                        "date": "2024-06-05",
                        "amount": -4_500,
                        "memo": "groceries",
                        "cleared": "cleared",
                        "approved": true,
                        "account_id": "a1",
                        "account_name": "Checking"
                    }
                }
            }),
        )])
        .await;
        let patch = TransactionPatch {
            memo: Some("groceries".to_owned()),
            ..TransactionPatch::default()
        };

        let updated = client_for(&server)
            .update_transaction("b1", "t1", &patch)
            .await
            .expect("update transaction");

        assert_eq!(updated.memo.as_deref(), Some("groceries"));
        let requests = server.requests();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].target, "/v1/budgets/b1/transactions/t1");
        let body: serde_json::Value =
            serde_json::from_str(&requests[0].body).expect("request body");
        assert_eq!(body, json!({"transaction": {"memo": "groceries"}}));
    }

    #[tokio::test]
    async fn update_rejects_a_bad_date_before_any_request() {
        let server = StubServer::start(Vec::new()).await;
        let patch = TransactionPatch {
            date: Some("05/06/2024".to_owned()),
            ..TransactionPatch::default()
        };

        let err = client_for(&server)
            .update_transaction("b1", "t1", &patch)
            .await
            .expect_err("invalid date");

        assert!(matches!(err, YnabError::InvalidDate { .. }));
        assert!(server.requests().is_empty());
    }
}
