//! Parameter structs for MCP tool inputs.
//!
//! Each struct derives [`serde::Deserialize`] and [`schemars::JsonSchema`]
//! so that `rmcp` can auto-generate JSON schemas for tool parameters.
//! Tools that operate on a budget default to the `last-used` sentinel,
//! which the API resolves to the most recently opened budget.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::client::LAST_USED_BUDGET_ID;

/// Default budget id for tools where the budget may be omitted.
fn default_budget_id() -> String {
    LAST_USED_BUDGET_ID.to_owned()
}

/// Serde default for flags that are on unless switched off.
const fn default_true() -> bool {
    true
}

/// Serde default for the spending analysis window.
const fn default_months() -> u32 {
    3
}

/// Parameters for the `get_budgets` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub(crate) struct GetBudgetsParams {
    /// If `true`, include account summaries with each budget.
    #[serde(default)]
    pub(crate) include_accounts: bool,
}

/// Parameters for the `get_budget` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetBudgetParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Parameters for the `get_accounts` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetAccountsParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Parameters for the `get_account` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetAccountParams {
    /// Budget ID the account belongs to.
    pub(crate) budget_id: String,
    /// Account ID to fetch.
    pub(crate) account_id: String,
}

/// One payee id, or several.
///
/// Accepts either a JSON string or a JSON array of strings, matching how
/// models tend to pass the value either way.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub(crate) enum PayeeIdParam {
    /// A single payee ID.
    One(String),
    /// Several payee IDs.
    Many(Vec<String>),
}

impl PayeeIdParam {
    /// Normalises the input to a list of payee IDs.
    ///
    /// A single string that itself holds a JSON array (a common model
    /// quirk) is decoded; when that fails it is kept as one literal ID.
    pub(crate) fn into_list(self) -> Vec<String> {
        match self {
            Self::One(value) => {
                if value.trim_start().starts_with('[') {
                    serde_json::from_str::<Vec<String>>(&value)
                        .unwrap_or_else(|_err| vec![value])
                } else {
                    vec![value]
                }
            }
            Self::Many(values) => values,
        }
    }
}

/// Parameters for the `get_transactions` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetTransactionsParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
    /// Restrict to one account.
    pub(crate) account_id: Option<String>,
    /// Restrict to one payee ID, or a list of payee IDs.
    pub(crate) payee_id: Option<PayeeIdParam>,
    /// Restrict to one category.
    pub(crate) category_id: Option<String>,
    /// Only include transactions on or after this date, format `YYYY-MM-DD`.
    pub(crate) since_date: Option<String>,
    /// Restrict to `uncategorized` or `unapproved` transactions.
    pub(crate) transaction_type: Option<String>,
    /// `true` keeps only transactions with blank memos, `false` only those
    /// with memo text. Useful for finding rows that need descriptions.
    pub(crate) empty_memo: Option<bool>,
    /// If `true`, attach a compact widget summary of the listed rows.
    #[serde(default = "default_true")]
    pub(crate) widget: bool,
}

/// Parameters for the `get_categories` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetCategoriesParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Parameters for the `get_payees` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct GetPayeesParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Parameters for the `find_payee_by_name` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct FindPayeeParams {
    /// Payee name to search for (case-insensitive substring match).
    pub(crate) payee_name: String,
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Parameters for the `analyze_spending` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct AnalyzeSpendingParams {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
    /// How many months of history to analyze.
    #[serde(default = "default_months")]
    pub(crate) months: u32,
}

/// Parameters for the `update_transaction` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct UpdateTransactionParams {
    /// Budget ID the transaction belongs to.
    pub(crate) budget_id: String,
    /// Transaction ID to update.
    pub(crate) transaction_id: String,
    /// Transaction memo (max 500 characters).
    pub(crate) memo: Option<String>,
    /// Amount in standard currency units, e.g. `50.00` or `-25.99`.
    pub(crate) amount: Option<f64>,
    /// Payee ID (use `get_payees` or `find_payee_by_name` to look one up).
    pub(crate) payee_id: Option<String>,
    /// Payee name; creates the payee upstream when it does not exist.
    pub(crate) payee_name: Option<String>,
    /// Category ID (use `get_categories` to look one up).
    pub(crate) category_id: Option<String>,
    /// Cleared status: `cleared`, `uncleared`, or `reconciled`.
    pub(crate) cleared: Option<String>,
    /// Whether the transaction is approved.
    pub(crate) approved: Option<bool>,
    /// Flag colour: `red`, `orange`, `yellow`, `green`, `blue`, or `purple`.
    pub(crate) flag_color: Option<String>,
    /// Transaction date, format `YYYY-MM-DD`.
    pub(crate) date: Option<String>,
}

/// Arguments for the budget-scoped prompts (`budget_summary`,
/// `budget_setup`, `debt_analysis`).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct BudgetPromptArgs {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
}

/// Arguments for the `spending_analysis` prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub(crate) struct SpendingPromptArgs {
    /// Budget ID (use `last-used` for the most recent budget).
    #[serde(default = "default_budget_id")]
    pub(crate) budget_id: String,
    /// Category to focus on; empty analyzes the whole budget.
    #[serde(default)]
    pub(crate) category_name: String,
    /// How many months of history to analyze.
    #[serde(default = "default_months")]
    pub(crate) months: u32,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect for readability"
)]
mod tests {
    use super::{
        AnalyzeSpendingParams, FindPayeeParams, GetAccountParams, GetBudgetParams,
        GetBudgetsParams, GetTransactionsParams, PayeeIdParam, SpendingPromptArgs,
        UpdateTransactionParams,
    };

    #[test]
    fn get_budgets_defaults_to_summaries_only() {
        let json = r#"{}"#;
        let params: GetBudgetsParams =
            serde_json::from_str(json).expect("should deserialize empty object");
        assert!(!params.include_accounts);
    }

    #[test]
    fn get_budget_defaults_to_last_used() {
        let json = r#"{}"#;
        let params: GetBudgetParams =
            serde_json::from_str(json).expect("should deserialize empty object");
        assert_eq!(params.budget_id, "last-used");
    }

    #[test]
    fn get_account_requires_both_ids() {
        let json = r#"{"budget_id": "b-001", "account_id": "acc-001"}"#;
        let params: GetAccountParams =
            serde_json::from_str(json).expect("should deserialize both ids");
        assert_eq!(params.budget_id, "b-001");
        assert_eq!(params.account_id, "acc-001");

        let _missing = serde_json::from_str::<GetAccountParams>(r#"{"budget_id": "b-001"}"#)
            .expect_err("account_id should be required");
    }

    #[test]
    fn get_transactions_minimal() {
        let json = r#"{}"#;
        let params: GetTransactionsParams =
            serde_json::from_str(json).expect("should deserialize empty");
        assert_eq!(params.budget_id, "last-used");
        assert!(params.account_id.is_none());
        assert!(params.payee_id.is_none());
        assert!(params.category_id.is_none());
        assert!(params.since_date.is_none());
        assert!(params.transaction_type.is_none());
        assert!(params.empty_memo.is_none());
        assert!(params.widget);
    }

    #[test]
    fn get_transactions_full() {
        let json = r#"{
            "budget_id": "b-001",
            "account_id": "acc-001",
            "payee_id": "p-001",
            "category_id": "cat-001",
            "since_date": "2024-01-01",
            "transaction_type": "unapproved",
            "empty_memo": true,
            "widget": false
        }"#;
        let params: GetTransactionsParams =
            serde_json::from_str(json).expect("should deserialize full params");
        assert_eq!(params.budget_id, "b-001");
        assert_eq!(params.account_id.as_deref(), Some("acc-001"));
        assert_eq!(params.category_id.as_deref(), Some("cat-001"));
        assert_eq!(params.since_date.as_deref(), Some("2024-01-01"));
        assert_eq!(params.transaction_type.as_deref(), Some("unapproved"));
        assert_eq!(params.empty_memo, Some(true));
        assert!(!params.widget);
        let payees = params.payee_id.expect("payee id").into_list();
        assert_eq!(payees, vec!["p-001".to_owned()]);
    }

    #[test]
    fn payee_id_accepts_a_json_array() {
        let json = r#"{"payee_id": ["p-001", "p-002"]}"#;
        let params: GetTransactionsParams =
            serde_json::from_str(json).expect("should deserialize array");
        let payees = params.payee_id.expect("payee id").into_list();
        assert_eq!(payees, vec!["p-001".to_owned(), "p-002".to_owned()]);
    }

    #[test]
    fn payee_id_decodes_a_stringified_array() {
        let param = PayeeIdParam::One(r#"["p-001", "p-002"]"#.to_owned());
        assert_eq!(
            param.into_list(),
            vec!["p-001".to_owned(), "p-002".to_owned()]
        );
    }

    #[test]
    fn malformed_stringified_array_stays_one_id() {
        let param = PayeeIdParam::One("[not-json".to_owned());
        assert_eq!(param.into_list(), vec!["[not-json".to_owned()]);
    }

    #[test]
    fn find_payee_requires_a_name() {
        let json = r#"{"payee_name": "Coffee"}"#;
        let params: FindPayeeParams =
            serde_json::from_str(json).expect("should deserialize name");
        assert_eq!(params.payee_name, "Coffee");
        assert_eq!(params.budget_id, "last-used");

        let _missing = serde_json::from_str::<FindPayeeParams>(r#"{}"#)
            .expect_err("payee_name should be required");
    }

    #[test]
    fn analyze_spending_defaults_to_three_months() {
        let json = r#"{}"#;
        let params: AnalyzeSpendingParams =
            serde_json::from_str(json).expect("should deserialize empty");
        assert_eq!(params.budget_id, "last-used");
        assert_eq!(params.months, 3);
    }

    #[test]
    fn update_transaction_keeps_unset_fields_as_none() {
        let json = r#"{
            "budget_id": "b-001",
            "transaction_id": "tx-001",
            "memo": "groceries"
        }"#;
        let params: UpdateTransactionParams =
            serde_json::from_str(json).expect("should deserialize");
        assert_eq!(params.memo.as_deref(), Some("groceries"));
        assert!(params.amount.is_none());
        assert!(params.payee_id.is_none());
        assert!(params.payee_name.is_none());
        assert!(params.category_id.is_none());
        assert!(params.cleared.is_none());
        assert!(params.approved.is_none());
        assert!(params.flag_color.is_none());
        assert!(params.date.is_none());
    }

    #[test]
    fn spending_prompt_args_default_like_the_tools() {
        let params: SpendingPromptArgs =
            serde_json::from_str("{}").expect("should deserialize empty object");
        assert_eq!(params.budget_id, "last-used");
        assert_eq!(params.category_name, "");
        assert_eq!(params.months, 3);
    }
}
