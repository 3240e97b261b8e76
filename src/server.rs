//! MCP server implementation over the YNAB API client.
//!
//! Uses `rmcp` macros to expose YNAB budget queries, transaction
//! filtering and updates as MCP tools, plus guided analysis prompts.
//! Every tool verifies the configured access token upstream before
//! touching data, and every failure is flattened into the uniform
//! error body instead of a protocol fault.

extern crate alloc;

use alloc::sync::Arc;

use chrono::{TimeDelta, Utc};
use reqwest::Client;
use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, GetPromptRequestParams, GetPromptResult, ListPromptsResult,
    PaginatedRequestParams, PromptMessage, PromptMessageRole, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, prompt, prompt_handler, prompt_router,
    tool, tool_handler, tool_router,
};
use serde_json::json;

use crate::auth::TokenVerifier;
use crate::client::{TransactionPatch, YnabClient, http_client, validate_date};
use crate::config::Config;
use crate::error::YnabError;
use crate::filter::{TransactionFilter, fetch_transactions};
use crate::models::{ClearedStatus, FlagColor, major_to_milliunits};
use crate::params::{
    AnalyzeSpendingParams, BudgetPromptArgs, FindPayeeParams, GetAccountParams,
    GetAccountsParams, GetBudgetParams, GetBudgetsParams, GetCategoriesParams,
    GetPayeesParams, GetTransactionsParams, PayeeIdParam, SpendingPromptArgs,
    UpdateTransactionParams,
};
use crate::prompts;
use crate::response::{
    AccountResponse, BudgetResponse, BudgetSummaryResponse, CategoryResponse, ErrorBody,
    PayeeResponse, SpendingAnalysis, TransactionListing, TransactionResponse,
};
use crate::widget::TransactionsWidget;

/// MCP server wrapping the YNAB budgeting API.
#[derive(Clone)]
pub(crate) struct YnabMcpServer {
    /// Runtime configuration read at startup.
    config: Config,
    /// Connection pool shared by all data calls.
    http: Client,
    /// Token verifier probing `/user` upstream (shared via Arc).
    verifier: Arc<TokenVerifier>,
    /// Tool router for dispatching MCP tool calls.
    tool_router: ToolRouter<Self>,
    /// Prompt router for dispatching MCP prompt requests.
    prompt_router: PromptRouter<Self>,
}

impl core::fmt::Debug for YnabMcpServer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("YnabMcpServer").finish_non_exhaustive()
    }
}

/// Serializes a value to a pretty-printed JSON string for tool output.
fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|err| {
        McpError::internal_error(format!("failed to serialize response: {err}"), None)
    })
}

/// Creates a successful tool result containing JSON text.
fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = to_json_text(value)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Creates an error-flagged tool result carrying the uniform error body.
fn error_result(body: &ErrorBody) -> Result<CallToolResult, McpError> {
    let text = to_json_text(body)?;
    Ok(CallToolResult::error(vec![Content::text(text)]))
}

/// Flattens an API failure into an error-flagged tool result.
fn failure(err: YnabError) -> Result<CallToolResult, McpError> {
    error_result(&ErrorBody::from_error(err))
}

/// Wraps rendered prompt text as a single user message.
fn prompt_result(text: String) -> GetPromptResult {
    GetPromptResult {
        description: None,
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    }
}

#[tool_router]
impl YnabMcpServer {
    /// Creates a new MCP server from the given configuration.
    pub(crate) fn new(config: Config) -> Result<Self, YnabError> {
        let http = http_client(config.request_timeout)?;
        let verifier = Arc::new(TokenVerifier::new(config.api_base_url.clone())?);
        Ok(Self {
            config,
            http,
            verifier,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        })
    }

    /// Logs which YNAB user the configured token belongs to.
    ///
    /// Called once at startup. A missing token or failed probe is only
    /// logged; tools report the uniform error bodies on their own.
    pub(crate) async fn log_startup_identity(&self) {
        let Some(token) = self.config.access_token.as_deref() else {
            tracing::warn!("YNAB_ACCESS_TOKEN is not set; tools will report missing credentials");
            return;
        };
        let Some(credential) = self.verifier.verify(token).await else {
            tracing::warn!("configured access token failed verification");
            return;
        };
        tracing::info!(
            user_id = %credential.user_id,
            email = credential.email.as_deref().unwrap_or("unknown"),
            valid_until = %credential.expires_at,
            "access token verified at startup"
        );
    }

    /// Local check that a bearer token is configured at all.
    fn configured_token(&self) -> Result<&str, ErrorBody> {
        self.config
            .access_token
            .as_deref()
            .ok_or_else(ErrorBody::no_credential)
    }

    /// Verifies `token` upstream and binds an API client to it.
    async fn verified_client(&self, token: &str) -> Result<YnabClient, ErrorBody> {
        let credential = self
            .verifier
            .verify(token)
            .await
            .ok_or_else(|| ErrorBody::from_error(YnabError::Unauthenticated))?;
        Ok(YnabClient::new(
            self.http.clone(),
            self.config.api_base_url.clone(),
            credential.token,
        ))
    }

    /// Runs both authentication steps for tools with no extra input
    /// validation of their own.
    async fn authenticate(&self) -> Result<YnabClient, ErrorBody> {
        let token = self.configured_token()?;
        self.verified_client(token).await
    }

    // ── Budget tools ────────────────────────────────────────────────

    /// Lists every budget the token can access.
    #[tool(
        description = "Get all budgets for the authenticated user. Read-only. Set include_accounts=true to embed account summaries in each budget"
    )]
    async fn get_budgets(
        &self,
        params: Parameters<GetBudgetsParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_budgets(params.0.include_accounts).await {
            Ok(budgets) => {
                let rows: Vec<BudgetSummaryResponse> = budgets
                    .iter()
                    .map(BudgetSummaryResponse::from_summary)
                    .collect();
                let count = rows.len();
                json_result(&json!({ "budgets": rows, "count": count }))
            }
            Err(err) => failure(err),
        }
    }

    /// Fetches one budget in full detail.
    #[tool(
        description = "Get detailed information for a specific budget, including its accounts, payees, categories and transactions. Read-only. Use budget_id 'last-used' for the most recently used budget"
    )]
    async fn get_budget(
        &self,
        params: Parameters<GetBudgetParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_budget(&params.0.budget_id).await {
            Ok(budget) => json_result(&BudgetResponse::from_budget(&budget)),
            Err(err) => failure(err),
        }
    }

    // ── Account tools ───────────────────────────────────────────────

    /// Lists the accounts in a budget.
    #[tool(
        description = "Get all accounts for a specific budget including balances and account types. Read-only"
    )]
    async fn get_accounts(
        &self,
        params: Parameters<GetAccountsParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_accounts(&params.0.budget_id).await {
            Ok(accounts) => {
                let rows: Vec<AccountResponse> =
                    accounts.iter().map(AccountResponse::from_account).collect();
                let count = rows.len();
                json_result(&json!({ "accounts": rows, "count": count }))
            }
            Err(err) => failure(err),
        }
    }

    /// Fetches a single account.
    #[tool(
        description = "Get information for a specific account. Read-only. Requires both budget_id and account_id"
    )]
    async fn get_account(
        &self,
        params: Parameters<GetAccountParams>,
    ) -> Result<CallToolResult, McpError> {
        let GetAccountParams {
            budget_id,
            account_id,
        } = params.0;
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_account(&budget_id, &account_id).await {
            Ok(account) => json_result(&AccountResponse::from_account(&account)),
            Err(err) => failure(err),
        }
    }

    // ── Transaction tools ───────────────────────────────────────────

    /// Lists transactions through the narrowest endpoint the filters
    /// allow, echoing the applied scope in the envelope.
    #[tool(
        description = "Get transactions for a specific budget with smart compound filtering by account, category, payee(s), date and type. Read-only. The narrowest server-side endpoint is chosen and remaining filters apply in memory; set empty_memo=true to find transactions needing descriptions"
    )]
    async fn get_transactions(
        &self,
        params: Parameters<GetTransactionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let GetTransactionsParams {
            budget_id,
            account_id,
            payee_id,
            category_id,
            since_date,
            transaction_type,
            empty_memo,
            widget,
        } = params.0;
        let token = match self.configured_token() {
            Ok(token) => token,
            Err(denied) => return error_result(&denied),
        };
        if let Some(Err(err)) = since_date.as_deref().map(validate_date) {
            return failure(err);
        }
        let client = match self.verified_client(token).await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };

        let filter = TransactionFilter {
            budget_id,
            account_id,
            category_id,
            payee_ids: payee_id.map(PayeeIdParam::into_list).unwrap_or_default(),
            since_date,
            transaction_type,
            empty_memo,
        };
        match fetch_transactions(&client, &filter).await {
            Ok(transactions) => {
                let card = widget.then(|| TransactionsWidget::from_transactions(&transactions));
                let rows: Vec<TransactionResponse> = transactions
                    .iter()
                    .map(TransactionResponse::from_detail)
                    .collect();
                json_result(&TransactionListing::new(rows, &filter, card))
            }
            Err(err) => failure(err),
        }
    }

    // ── Category and payee tools ────────────────────────────────────

    /// Lists the categories in a budget, flattened across groups.
    #[tool(
        description = "Get all categories and category groups for a specific budget. Read-only. Includes budgeted amounts, activity and goal progress"
    )]
    async fn get_categories(
        &self,
        params: Parameters<GetCategoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_categories(&params.0.budget_id).await {
            Ok(categories) => {
                let rows: Vec<CategoryResponse> = categories
                    .iter()
                    .map(CategoryResponse::from_category)
                    .collect();
                let count = rows.len();
                json_result(&json!({ "categories": rows, "count": count }))
            }
            Err(err) => failure(err),
        }
    }

    /// Lists the payees in a budget.
    #[tool(
        description = "Get all payees (merchants, people, places) for a specific budget. Read-only"
    )]
    async fn get_payees(
        &self,
        params: Parameters<GetPayeesParams>,
    ) -> Result<CallToolResult, McpError> {
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_payees(&params.0.budget_id).await {
            Ok(payees) => {
                let rows: Vec<PayeeResponse> =
                    payees.iter().map(PayeeResponse::from_payee).collect();
                let count = rows.len();
                json_result(&json!({ "payees": rows, "count": count }))
            }
            Err(err) => failure(err),
        }
    }

    /// Finds payees whose names contain the search term.
    #[tool(
        description = "Find payees by name using case-insensitive partial matching. Read-only. Returns every payee whose name contains the search term"
    )]
    async fn find_payee_by_name(
        &self,
        params: Parameters<FindPayeeParams>,
    ) -> Result<CallToolResult, McpError> {
        let FindPayeeParams {
            payee_name,
            budget_id,
        } = params.0;
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        match client.get_payees(&budget_id).await {
            Ok(payees) => {
                let needle = payee_name.trim().to_lowercase();
                let matches: Vec<PayeeResponse> = payees
                    .iter()
                    .filter(|payee| {
                        !payee.name.is_empty()
                            && payee.name.to_lowercase().contains(needle.as_str())
                    })
                    .map(PayeeResponse::from_payee)
                    .collect();
                let count = matches.len();
                json_result(&json!({
                    "payees": matches,
                    "count": count,
                    "search_term": payee_name,
                    "budget_id": budget_id,
                }))
            }
            Err(err) => failure(err),
        }
    }

    // ── Analysis tools ──────────────────────────────────────────────

    /// Aggregates recent outflows into totals and a category leaderboard.
    #[tool(
        description = "Analyze spending patterns and trends for a budget over a specified time period. Read-only. Reports total outflow, top spending categories and the average daily spend"
    )]
    async fn analyze_spending(
        &self,
        params: Parameters<AnalyzeSpendingParams>,
    ) -> Result<CallToolResult, McpError> {
        let AnalyzeSpendingParams { budget_id, months } = params.0;
        let client = match self.authenticate().await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };
        let window_months = months.max(1);
        let since = Utc::now().date_naive() - TimeDelta::days(i64::from(window_months) * 30);
        let filter = TransactionFilter {
            budget_id,
            since_date: Some(since.format("%Y-%m-%d").to_string()),
            ..TransactionFilter::default()
        };
        match fetch_transactions(&client, &filter).await {
            Ok(transactions) => {
                json_result(&SpendingAnalysis::from_transactions(
                    &transactions,
                    window_months,
                ))
            }
            Err(err) => failure(err),
        }
    }

    // ── Write tools ─────────────────────────────────────────────────

    /// Applies a partial update to one transaction.
    #[tool(
        description = "Update an existing transaction with new details: memo, amount, payee, category, cleared status, approval, flag color or date. Only the supplied fields change. Idempotent write"
    )]
    async fn update_transaction(
        &self,
        params: Parameters<UpdateTransactionParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateTransactionParams {
            budget_id,
            transaction_id,
            memo,
            amount,
            payee_id,
            payee_name,
            category_id,
            cleared,
            approved,
            flag_color,
            date,
        } = params.0;
        let token = match self.configured_token() {
            Ok(token) => token,
            Err(denied) => return error_result(&denied),
        };
        let cleared_status = match cleared.as_deref() {
            None => None,
            Some(value) => match ClearedStatus::from_input(value) {
                Some(status) => Some(status),
                None => {
                    return error_result(&ErrorBody::message(format!(
                        "Invalid cleared status '{value}'. Must be one of: cleared, uncleared, reconciled"
                    )));
                }
            },
        };
        let flag = match flag_color.as_deref() {
            None => None,
            Some(value) => match FlagColor::from_input(value) {
                Some(color) => Some(color),
                None => {
                    return error_result(&ErrorBody::message(format!(
                        "Invalid flag color '{value}'. Must be one of: red, orange, yellow, green, blue, purple"
                    )));
                }
            },
        };
        if let Some(Err(err)) = date.as_deref().map(validate_date) {
            return failure(err);
        }
        let client = match self.verified_client(token).await {
            Ok(client) => client,
            Err(denied) => return error_result(&denied),
        };

        let patch = TransactionPatch {
            memo,
            amount: amount.map(major_to_milliunits),
            payee_id,
            payee_name,
            category_id,
            cleared: cleared_status,
            approved,
            flag_color: flag,
            date,
        };
        match client
            .update_transaction(&budget_id, &transaction_id, &patch)
            .await
        {
            Ok(transaction) => json_result(&TransactionResponse::from_detail(&transaction)),
            Err(err) => failure(err),
        }
    }
}

#[allow(
    clippy::multiple_inherent_impl,
    clippy::unused_async,
    clippy::unused_self,
    reason = "prompt handlers must be async receiver methods on the router's own impl block"
)]
#[prompt_router]
impl YnabMcpServer {
    /// Renders the comprehensive budget review prompt.
    #[prompt(description = "Generate a prompt for comprehensive budget summary analysis")]
    async fn budget_summary(
        &self,
        params: Parameters<BudgetPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(prompt_result(prompts::budget_summary(&params.0.budget_id)))
    }

    /// Renders the detailed spending analysis prompt.
    #[prompt(description = "Generate a prompt for detailed spending analysis")]
    async fn spending_analysis(
        &self,
        params: Parameters<SpendingPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        let SpendingPromptArgs {
            budget_id,
            category_name,
            months,
        } = params.0;
        Ok(prompt_result(prompts::spending_analysis(
            &budget_id,
            &category_name,
            months,
        )))
    }

    /// Renders the budget setup and optimization prompt.
    #[prompt(description = "Generate a prompt for budget setup and optimization guidance")]
    async fn budget_setup(
        &self,
        params: Parameters<BudgetPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(prompt_result(prompts::budget_setup(&params.0.budget_id)))
    }

    /// Renders the debt payoff strategy prompt.
    #[prompt(description = "Generate a prompt for debt analysis and payoff strategy")]
    async fn debt_analysis(
        &self,
        params: Parameters<BudgetPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Ok(prompt_result(prompts::debt_analysis(&params.0.budget_id)))
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for YnabMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "YNAB budgeting MCP server. \
                 Query budgets, accounts, categories, payees and transactions, \
                 analyze spending patterns, and update transaction details. \
                 Requires the YNAB_ACCESS_TOKEN environment variable."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect and JSON indexing for readability"
)]
mod tests {
    use rmcp::handler::server::wrapper::Parameters;
    use rmcp::model::CallToolResult;
    use serde_json::json;

    use super::YnabMcpServer;
    use crate::config::Config;
    use crate::params::{
        AnalyzeSpendingParams, FindPayeeParams, GetAccountParams, GetBudgetsParams,
        GetTransactionsParams, SpendingPromptArgs, UpdateTransactionParams,
    };
    use crate::testing::{Reply, StubServer};

    fn server_for(stub: &StubServer, token: Option<&str>) -> YnabMcpServer {
        let url = stub.url();
        let configured = token.map(str::to_owned);
        let config = Config::from_vars(|name| match name {
            "YNAB_API_BASE_URL" => Some(url.clone()),
            "YNAB_ACCESS_TOKEN" => configured.clone(),
            _ => None,
        })
        .expect("config should build");
        YnabMcpServer::new(config).expect("server should build")
    }

    fn user_ok() -> Reply {
        Reply::json(
            200,
            &json!({ "data": { "user": { "id": "u-1", "email": null } } }),
        )
    }

    fn sample_transaction(id: &str, memo: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "date": "2024-06-05",
            "amount": -4_500,
            "memo": memo,
            "cleared": "cleared",
            "approved": true,
            "account_id": "a1",
            "account_name": "Checking"
        })
    }

    fn body_of(result: &CallToolResult) -> serde_json::Value {
        let value = serde_json::to_value(result).expect("result should serialize");
        let text = value["content"][0]["text"]
            .as_str()
            .expect("result should carry text content");
        serde_json::from_str(text).expect("content should be JSON")
    }

    fn is_error(result: &CallToolResult) -> bool {
        let value = serde_json::to_value(result).expect("result should serialize");
        value["isError"] == serde_json::Value::Bool(true)
    }

    fn params_from<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Parameters<T> {
        Parameters(serde_json::from_value(value).expect("params should deserialize"))
    }

    #[tokio::test]
    async fn missing_token_reports_no_credential_without_calling_upstream() {
        let stub = StubServer::start(Vec::new()).await;
        let server = server_for(&stub, None);

        let result = server
            .get_budgets(params_from::<GetBudgetsParams>(json!({})))
            .await
            .expect("tool should produce a result");

        assert!(is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["error"], "No valid authentication token found");
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_token_reports_unauthenticated_after_one_probe() {
        let stub = StubServer::start(vec![Reply::text(401, "unauthorized")]).await;
        let server = server_for(&stub, Some("bad-token"));

        let result = server
            .get_budgets(params_from::<GetBudgetsParams>(json!({})))
            .await
            .expect("tool should produce a result");

        assert!(is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["error"], "Invalid or expired access token");
        assert_eq!(body["status_code"].as_u64(), Some(401));
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, "/v1/user");
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer bad-token")
        );
    }

    #[tokio::test]
    async fn budgets_listing_wraps_rows_and_count() {
        let stub = StubServer::start(vec![
            user_ok(),
            Reply::json(
                200,
                &json!({ "data": { "budgets": [{ "id": "b1", "name": "Family" }] } }),
            ),
        ])
        .await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .get_budgets(params_from::<GetBudgetsParams>(json!({})))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["count"].as_u64(), Some(1));
        assert_eq!(body["budgets"][0]["name"], "Family");
        let requests = stub.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].target, "/v1/user");
        assert_eq!(requests[1].target, "/v1/budgets");
    }

    #[tokio::test]
    async fn single_account_is_returned_bare() {
        let account = json!({
            "data": {
                "account": {
                    "id": "a1",
                    "name": "Checking",
                    "type": "checking",
                    "on_budget": true,
                    "closed": false,
                    "balance": 1_500_000,
                    "cleared_balance": 1_500_000,
                    "uncleared_balance": 0
                }
            }
        });
        let stub = StubServer::start(vec![user_ok(), Reply::json(200, &account)]).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .get_account(params_from::<GetAccountParams>(json!({
                "budget_id": "b1",
                "account_id": "a1"
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["id"], "a1");
        assert_eq!(body["type"], "checking");
        let formatted = body["balance_formatted"].as_f64().expect("formatted balance");
        assert!((formatted - 1_500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn invalid_cleared_status_never_calls_upstream() {
        let stub = StubServer::start(Vec::new()).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .update_transaction(params_from::<UpdateTransactionParams>(json!({
                "budget_id": "b1",
                "transaction_id": "t1",
                "cleared": "sorta"
            })))
            .await
            .expect("tool should produce a result");

        assert!(is_error(&result));
        let body = body_of(&result);
        assert_eq!(
            body["error"],
            "Invalid cleared status 'sorta'. Must be one of: cleared, uncleared, reconciled"
        );
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_flag_color_never_calls_upstream() {
        let stub = StubServer::start(Vec::new()).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .update_transaction(params_from::<UpdateTransactionParams>(json!({
                "budget_id": "b1",
                "transaction_id": "t1",
                "flag_color": "pink"
            })))
            .await
            .expect("tool should produce a result");

        assert!(is_error(&result));
        let body = body_of(&result);
        assert_eq!(
            body["error"],
            "Invalid flag color 'pink'. Must be one of: red, orange, yellow, green, blue, purple"
        );
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_since_date_skips_verification() {
        let stub = StubServer::start(Vec::new()).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .get_transactions(params_from::<GetTransactionsParams>(json!({
                "budget_id": "b1",
                "since_date": "June 1st"
            })))
            .await
            .expect("tool should produce a result");

        assert!(is_error(&result));
        let body = body_of(&result);
        assert_eq!(
            body["error"],
            "Invalid date format: 'June 1st'. Expected format: YYYY-MM-DD"
        );
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn transactions_envelope_echoes_the_applied_filters() {
        let listing = json!({
            "data": { "transactions": [sample_transaction("t1", Some("groceries"))] }
        });
        let stub = StubServer::start(vec![user_ok(), Reply::json(200, &listing)]).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .get_transactions(params_from::<GetTransactionsParams>(json!({
                "budget_id": "b1",
                "account_id": "a1",
                "empty_memo": false,
                "widget": false
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["count"].as_u64(), Some(1));
        assert_eq!(body["account_id"], "a1");
        assert_eq!(body["budget_id"], "b1");
        assert_eq!(body["empty_memo"], serde_json::Value::Bool(false));
        let keys = body.as_object().expect("body should be an object");
        assert!(!keys.contains_key("category_id"));
        assert!(!keys.contains_key("filtered_by"));
        assert!(!keys.contains_key("widget"));
        let requests = stub.requests();
        assert_eq!(
            requests[1].target,
            "/v1/budgets/b1/accounts/a1/transactions"
        );
    }

    #[tokio::test]
    async fn widget_card_attaches_by_default() {
        let listing = json!({
            "data": { "transactions": [sample_transaction("t1", None)] }
        });
        let stub = StubServer::start(vec![user_ok(), Reply::json(200, &listing)]).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .get_transactions(params_from::<GetTransactionsParams>(json!({
                "budget_id": "b1"
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["widget"]["summary"]["rowCount"].as_u64(), Some(1));
        assert!(body["widget"]["rows"].is_array());
        let requests = stub.requests();
        assert_eq!(requests[1].target, "/v1/budgets/b1/transactions");
    }

    #[tokio::test]
    async fn analyze_spending_requests_the_trailing_window() {
        let stub = StubServer::start(vec![
            user_ok(),
            Reply::json(200, &json!({ "data": { "transactions": [] } })),
        ])
        .await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .analyze_spending(params_from::<AnalyzeSpendingParams>(json!({
                "budget_id": "b1",
                "months": 2
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["analysis_period_days"].as_u64(), Some(60));
        assert_eq!(body["total_spending_milliunits"].as_u64(), Some(0));
        let requests = stub.requests();
        assert!(
            requests[1]
                .target
                .starts_with("/v1/budgets/b1/transactions?since_date=")
        );
    }

    #[tokio::test]
    async fn update_transaction_sends_a_partial_patch() {
        let updated = json!({
            "data": { "transaction": sample_transaction("t9", Some("paid")) }
        });
        let stub = StubServer::start(vec![user_ok(), Reply::json(200, &updated)]).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .update_transaction(params_from::<UpdateTransactionParams>(json!({
                "budget_id": "b1",
                "transaction_id": "t9",
                "memo": "paid",
                "amount": -25.99,
                "cleared": " CLEARED "
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["id"], "t9");
        assert_eq!(body["memo"], "paid");
        let requests = stub.requests();
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(requests[1].target, "/v1/budgets/b1/transactions/t9");
        let sent: serde_json::Value =
            serde_json::from_str(&requests[1].body).expect("request body should be JSON");
        assert_eq!(sent["transaction"]["memo"], "paid");
        assert_eq!(sent["transaction"]["amount"].as_i64(), Some(-25_990));
        assert_eq!(sent["transaction"]["cleared"], "cleared");
        let patch_keys = sent["transaction"]
            .as_object()
            .expect("patch should be an object");
        assert!(!patch_keys.contains_key("approved"));
        assert!(!patch_keys.contains_key("date"));
    }

    #[tokio::test]
    async fn find_payee_matches_case_insensitively_and_echoes_the_term() {
        let payees = json!({
            "data": {
                "payees": [
                    { "id": "p1", "name": "Starbucks Coffee" },
                    { "id": "p2", "name": "Amazon" },
                    { "id": "p3", "name": "" }
                ]
            }
        });
        let stub = StubServer::start(vec![user_ok(), Reply::json(200, &payees)]).await;
        let server = server_for(&stub, Some("tok"));

        let result = server
            .find_payee_by_name(params_from::<FindPayeeParams>(json!({
                "budget_id": "b1",
                "payee_name": "  STARB  "
            })))
            .await
            .expect("tool should produce a result");

        assert!(!is_error(&result));
        let body = body_of(&result);
        assert_eq!(body["count"].as_u64(), Some(1));
        assert_eq!(body["payees"][0]["name"], "Starbucks Coffee");
        assert_eq!(body["search_term"], "  STARB  ");
        assert_eq!(body["budget_id"], "b1");
    }

    #[tokio::test]
    async fn spending_prompt_renders_one_user_message() {
        let stub = StubServer::start(Vec::new()).await;
        let server = server_for(&stub, None);

        let result = server
            .spending_analysis(params_from::<SpendingPromptArgs>(json!({
                "budget_id": "b-1",
                "category_name": "Dining Out",
                "months": 6
            })))
            .await
            .expect("prompt should render");

        assert_eq!(result.messages.len(), 1);
        let value = serde_json::to_value(&result).expect("result should serialize");
        let text = value["messages"][0]["content"]["text"]
            .as_str()
            .expect("message should carry text");
        assert!(text.contains("'Dining Out'"));
        assert!(text.contains("for the last 180 days"));
    }
}
