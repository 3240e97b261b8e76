//! Full-field response structs for MCP tool outputs.
//!
//! Monetary fields stay in milliunits and gain a `*_formatted` companion in
//! major currency units, derived with [`milliunits_to_major`] when the
//! response is built. Failures flatten into [`ErrorBody`], which carries
//! only the keys relevant to the failure.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ResourceKind, YnabError};
use crate::filter::TransactionFilter;
use crate::models::{
    Account, AccountType, Budget, BudgetSummary, Category, CategoryGoal, CategoryGroup,
    ClearedStatus, CurrencyFormat, DateFormat, FlagColor, GoalType, Payee, SubTransaction,
    Transaction, TransactionDetail, milliunits_to_major,
};
use crate::widget::TransactionsWidget;

/// Uniform error object returned by every tool on failure.
///
/// Optional keys are omitted when empty, so a validation failure is just
/// `{"error": ...}` while a missing budget also names the `budget_id`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ErrorBody {
    /// Human-readable error message.
    error: String,
    /// Upstream HTTP status, when the failure came from an HTTP response.
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    /// The missing budget id, for budget not-found failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    budget_id: Option<String>,
    /// The missing account id, for account not-found failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    /// The missing category id, for category not-found failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<String>,
    /// The missing payee id, for payee not-found failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    payee_id: Option<String>,
    /// The missing transaction id, for transaction not-found failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    /// Seconds to wait before retrying, for rate-limit failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ErrorBody {
    /// Error object carrying only a message, used for input validation
    /// failures caught before any request is made.
    pub(crate) fn message(error: String) -> Self {
        Self {
            error,
            status_code: None,
            budget_id: None,
            account_id: None,
            category_id: None,
            payee_id: None,
            transaction_id: None,
            retry_after: None,
        }
    }

    /// Error object for a request made without a usable access token.
    pub(crate) fn no_credential() -> Self {
        Self::message("No valid authentication token found".to_owned())
    }

    /// Flattens a client error into the uniform shape, attaching the
    /// identifier or status code the variant carries.
    pub(crate) fn from_error(err: YnabError) -> Self {
        let mut body = Self::message(err.to_string());
        match err {
            YnabError::Unauthenticated => body.status_code = Some(401),
            YnabError::NotFound { kind, id } => match kind {
                ResourceKind::Budget => body.budget_id = Some(id),
                ResourceKind::Account => body.account_id = Some(id),
                ResourceKind::Category => body.category_id = Some(id),
                ResourceKind::Payee => body.payee_id = Some(id),
                ResourceKind::Transaction => body.transaction_id = Some(id),
                ResourceKind::Unknown => body.status_code = Some(404),
            },
            YnabError::RateLimited { retry_after } => {
                body.status_code = Some(429);
                body.retry_after = retry_after;
            }
            YnabError::Api { status, .. } => body.status_code = Some(status),
            YnabError::InvalidDate { .. } | YnabError::Transport(_) | YnabError::BaseUrl(_) => {}
        }
        body
    }
}

/// Account expanded with display balances.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AccountResponse {
    /// Account id.
    id: String,
    /// Account name.
    name: String,
    /// Account classification.
    #[serde(rename = "type")]
    account_type: AccountType,
    /// Whether the account participates in the budget.
    on_budget: bool,
    /// Whether the account is closed.
    closed: bool,
    /// Free-form note.
    note: Option<String>,
    /// Working balance in milliunits.
    balance: i64,
    /// Working balance in major units.
    balance_formatted: f64,
    /// Cleared balance in milliunits.
    cleared_balance: i64,
    /// Cleared balance in major units.
    cleared_balance_formatted: f64,
    /// Uncleared balance in milliunits.
    uncleared_balance: i64,
    /// Uncleared balance in major units.
    uncleared_balance_formatted: f64,
    /// Payee id used for transfers into this account.
    transfer_payee_id: Option<String>,
    /// Whether the account has been soft-deleted upstream.
    deleted: bool,
}

impl AccountResponse {
    /// Expands an account, deriving the formatted balances.
    pub(crate) fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            on_budget: account.on_budget,
            closed: account.closed,
            note: account.note.clone(),
            balance: account.balance,
            balance_formatted: milliunits_to_major(account.balance),
            cleared_balance: account.cleared_balance,
            cleared_balance_formatted: milliunits_to_major(account.cleared_balance),
            uncleared_balance: account.uncleared_balance,
            uncleared_balance_formatted: milliunits_to_major(account.uncleared_balance),
            transfer_payee_id: account.transfer_payee_id.clone(),
            deleted: account.deleted,
        }
    }
}

/// Category group for display.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryGroupResponse {
    /// Group id.
    id: String,
    /// Group name.
    name: String,
    /// Whether the group is hidden.
    hidden: bool,
    /// Whether the group has been soft-deleted upstream.
    deleted: bool,
}

impl CategoryGroupResponse {
    /// Copies a category group into the response shape.
    pub(crate) fn from_group(group: &CategoryGroup) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            hidden: group.hidden,
            deleted: group.deleted,
        }
    }
}

/// Goal configuration expanded with display amounts.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GoalResponse {
    /// Goal flavor.
    goal_type: GoalType,
    /// Whether the goal asks for the whole target each period.
    needs_whole_amount: Option<bool>,
    /// Day of month the goal is due.
    day: Option<i32>,
    /// Month the goal was created, as `YYYY-MM-DD`.
    creation_month: Option<String>,
    /// Target in milliunits.
    target: Option<i64>,
    /// Target in major units.
    target_formatted: Option<f64>,
    /// Target month, as `YYYY-MM-DD`.
    target_month: Option<String>,
    /// Completion percentage.
    percentage_complete: Option<i32>,
    /// Months left to fund the goal.
    months_to_budget: Option<i32>,
    /// Amount still needed this period, in milliunits.
    under_funded: Option<i64>,
    /// Amount still needed this period, in major units.
    under_funded_formatted: Option<f64>,
    /// Total funded toward the goal, in milliunits.
    overall_funded: Option<i64>,
    /// Total funded toward the goal, in major units.
    overall_funded_formatted: Option<f64>,
    /// Total still needed overall, in milliunits.
    overall_left: Option<i64>,
    /// Total still needed overall, in major units.
    overall_left_formatted: Option<f64>,
}

impl GoalResponse {
    /// Expands an assembled goal, deriving the formatted amounts.
    pub(crate) fn from_goal(goal: CategoryGoal) -> Self {
        Self {
            goal_type: goal.goal_type,
            needs_whole_amount: goal.needs_whole_amount,
            day: goal.day,
            creation_month: goal.creation_month,
            target: goal.target,
            target_formatted: goal.target.map(milliunits_to_major),
            target_month: goal.target_month,
            percentage_complete: goal.percentage_complete,
            months_to_budget: goal.months_to_budget,
            under_funded: goal.under_funded,
            under_funded_formatted: goal.under_funded.map(milliunits_to_major),
            overall_funded: goal.overall_funded,
            overall_funded_formatted: goal.overall_funded.map(milliunits_to_major),
            overall_left: goal.overall_left,
            overall_left_formatted: goal.overall_left.map(milliunits_to_major),
        }
    }
}

/// Category expanded with display amounts and an assembled goal.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryResponse {
    /// Category id.
    id: String,
    /// Owning group id.
    category_group_id: String,
    /// Owning group name, when known.
    category_group_name: Option<String>,
    /// Category name.
    name: String,
    /// Whether the category is hidden.
    hidden: bool,
    /// Free-form note.
    note: Option<String>,
    /// Budgeted amount in milliunits.
    budgeted: i64,
    /// Budgeted amount in major units.
    budgeted_formatted: f64,
    /// Activity in milliunits.
    activity: i64,
    /// Activity in major units.
    activity_formatted: f64,
    /// Available balance in milliunits.
    balance: i64,
    /// Available balance in major units.
    balance_formatted: f64,
    /// Goal configuration, when one is set.
    goal: Option<GoalResponse>,
    /// Whether the category has been soft-deleted upstream.
    deleted: bool,
}

impl CategoryResponse {
    /// Expands a category, deriving formatted amounts and nesting the goal.
    pub(crate) fn from_category(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            category_group_id: category.category_group_id.clone(),
            category_group_name: category.category_group_name.clone(),
            name: category.name.clone(),
            hidden: category.hidden,
            note: category.note.clone(),
            budgeted: category.budgeted,
            budgeted_formatted: milliunits_to_major(category.budgeted),
            activity: category.activity,
            activity_formatted: milliunits_to_major(category.activity),
            balance: category.balance,
            balance_formatted: milliunits_to_major(category.balance),
            goal: category.goal().map(GoalResponse::from_goal),
            deleted: category.deleted,
        }
    }
}

/// Payee for display.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PayeeResponse {
    /// Payee id.
    id: String,
    /// Payee name.
    name: String,
    /// For transfer payees, the account money moves into.
    transfer_account_id: Option<String>,
    /// Whether this payee represents a transfer between accounts.
    is_transfer: bool,
    /// Whether the payee has been soft-deleted upstream.
    deleted: bool,
}

impl PayeeResponse {
    /// Copies a payee into the response shape, marking transfer payees.
    pub(crate) fn from_payee(payee: &Payee) -> Self {
        Self {
            id: payee.id.clone(),
            name: payee.name.clone(),
            transfer_account_id: payee.transfer_account_id.clone(),
            is_transfer: payee.is_transfer(),
            deleted: payee.deleted,
        }
    }
}

/// Split line expanded with a display amount.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubTransactionResponse {
    /// Subtransaction id.
    id: String,
    /// Parent transaction id.
    transaction_id: String,
    /// Amount in milliunits.
    amount: i64,
    /// Amount in major units.
    amount_formatted: f64,
    /// Free-form memo.
    memo: Option<String>,
    /// Payee id.
    payee_id: Option<String>,
    /// Payee name.
    payee_name: Option<String>,
    /// Category id.
    category_id: Option<String>,
    /// Category name.
    category_name: Option<String>,
    /// For transfers, the other account.
    transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    transfer_transaction_id: Option<String>,
    /// Whether the subtransaction has been soft-deleted upstream.
    deleted: bool,
}

impl SubTransactionResponse {
    /// Expands a split line, deriving the formatted amount.
    pub(crate) fn from_subtransaction(sub: &SubTransaction) -> Self {
        Self {
            id: sub.id.clone(),
            transaction_id: sub.transaction_id.clone(),
            amount: sub.amount,
            amount_formatted: milliunits_to_major(sub.amount),
            memo: sub.memo.clone(),
            payee_id: sub.payee_id.clone(),
            payee_name: sub.payee_name.clone(),
            category_id: sub.category_id.clone(),
            category_name: sub.category_name.clone(),
            transfer_account_id: sub.transfer_account_id.clone(),
            transfer_transaction_id: sub.transfer_transaction_id.clone(),
            deleted: sub.deleted,
        }
    }
}

/// Transaction listing entry expanded with display amounts and split lines.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransactionResponse {
    /// Transaction id.
    id: String,
    /// Transaction date, as `YYYY-MM-DD`.
    date: String,
    /// Signed amount in milliunits, negative for outflows.
    amount: i64,
    /// Signed amount in major units.
    amount_formatted: f64,
    /// Free-form memo.
    memo: Option<String>,
    /// Cleared state.
    cleared: ClearedStatus,
    /// Whether the transaction has been approved.
    approved: bool,
    /// Flag color, when flagged.
    flag_color: Option<FlagColor>,
    /// Owning account id.
    account_id: String,
    /// Owning account name.
    account_name: String,
    /// Payee id.
    payee_id: Option<String>,
    /// Payee name.
    payee_name: Option<String>,
    /// Category id.
    category_id: Option<String>,
    /// Category name.
    category_name: Option<String>,
    /// For transfers, the other account.
    transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    transfer_transaction_id: Option<String>,
    /// Whether the amount is split across subtransactions.
    is_split: bool,
    /// Split lines, empty for a plain transaction.
    subtransactions: Vec<SubTransactionResponse>,
    /// Whether the transaction has been soft-deleted upstream.
    deleted: bool,
}

impl TransactionResponse {
    /// Expands a listing transaction, deriving formatted amounts for the
    /// row and each split line.
    pub(crate) fn from_detail(detail: &TransactionDetail) -> Self {
        Self {
            id: detail.id.clone(),
            date: detail.date.clone(),
            amount: detail.amount,
            amount_formatted: milliunits_to_major(detail.amount),
            memo: detail.memo.clone(),
            cleared: detail.cleared,
            approved: detail.approved,
            flag_color: detail.flag_color,
            account_id: detail.account_id.clone(),
            account_name: detail.account_name.clone(),
            payee_id: detail.payee_id.clone(),
            payee_name: detail.payee_name.clone(),
            category_id: detail.category_id.clone(),
            category_name: detail.category_name.clone(),
            transfer_account_id: detail.transfer_account_id.clone(),
            transfer_transaction_id: detail.transfer_transaction_id.clone(),
            is_split: detail.is_split(),
            subtransactions: detail
                .subtransactions
                .iter()
                .map(SubTransactionResponse::from_subtransaction)
                .collect(),
            deleted: detail.deleted,
        }
    }
}

/// Transaction as nested inside a full budget export, expanded with a
/// display amount. Export rows carry ids only, never denormalized names.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BudgetTransactionResponse {
    /// Transaction id.
    id: String,
    /// Transaction date, as `YYYY-MM-DD`.
    date: String,
    /// Signed amount in milliunits, negative for outflows.
    amount: i64,
    /// Signed amount in major units.
    amount_formatted: f64,
    /// Free-form memo.
    memo: Option<String>,
    /// Cleared state.
    cleared: ClearedStatus,
    /// Whether the transaction has been approved.
    approved: bool,
    /// Flag color, when flagged.
    flag_color: Option<FlagColor>,
    /// Owning account id.
    account_id: String,
    /// Payee id.
    payee_id: Option<String>,
    /// Category id.
    category_id: Option<String>,
    /// For transfers, the other account.
    transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    transfer_transaction_id: Option<String>,
    /// Whether the transaction has been soft-deleted upstream.
    deleted: bool,
}

impl BudgetTransactionResponse {
    /// Expands an export transaction, deriving the formatted amount.
    pub(crate) fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id.clone(),
            date: transaction.date.clone(),
            amount: transaction.amount,
            amount_formatted: milliunits_to_major(transaction.amount),
            memo: transaction.memo.clone(),
            cleared: transaction.cleared,
            approved: transaction.approved,
            flag_color: transaction.flag_color,
            account_id: transaction.account_id.clone(),
            payee_id: transaction.payee_id.clone(),
            category_id: transaction.category_id.clone(),
            transfer_account_id: transaction.transfer_account_id.clone(),
            transfer_transaction_id: transaction.transfer_transaction_id.clone(),
            deleted: transaction.deleted,
        }
    }
}

/// Budget list entry for display.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BudgetSummaryResponse {
    /// Budget id.
    id: String,
    /// Budget name.
    name: String,
    /// Last modification timestamp.
    last_modified_on: Option<DateTime<Utc>>,
    /// First month covered, as `YYYY-MM-DD`.
    first_month: Option<String>,
    /// Last month covered, as `YYYY-MM-DD`.
    last_month: Option<String>,
    /// Date format metadata.
    date_format: Option<DateFormat>,
    /// Currency format metadata.
    currency_format: Option<CurrencyFormat>,
    /// Account summaries, empty unless the caller asked for them.
    accounts: Vec<AccountResponse>,
}

impl BudgetSummaryResponse {
    /// Expands a budget list entry, including any inline accounts.
    pub(crate) fn from_summary(summary: &BudgetSummary) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            last_modified_on: summary.last_modified_on,
            first_month: summary.first_month.clone(),
            last_month: summary.last_month.clone(),
            date_format: summary.date_format.clone(),
            currency_format: summary.currency_format.clone(),
            accounts: summary
                .accounts
                .iter()
                .map(AccountResponse::from_account)
                .collect(),
        }
    }
}

/// Full budget export for display.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct BudgetResponse {
    /// Budget id.
    id: String,
    /// Budget name.
    name: String,
    /// Last modification timestamp.
    last_modified_on: Option<DateTime<Utc>>,
    /// First month covered, as `YYYY-MM-DD`.
    first_month: Option<String>,
    /// Last month covered, as `YYYY-MM-DD`.
    last_month: Option<String>,
    /// Date format metadata.
    date_format: Option<DateFormat>,
    /// Currency format metadata.
    currency_format: Option<CurrencyFormat>,
    /// Accounts in the budget.
    accounts: Vec<AccountResponse>,
    /// Payees in the budget.
    payees: Vec<PayeeResponse>,
    /// Category groups in the budget.
    category_groups: Vec<CategoryGroupResponse>,
    /// Categories in the budget.
    categories: Vec<CategoryResponse>,
    /// Transactions in the budget.
    transactions: Vec<BudgetTransactionResponse>,
    /// Change cursor for incremental sync, passed through untouched.
    server_knowledge: Option<i64>,
}

impl BudgetResponse {
    /// Expands a full budget export, deriving display amounts throughout.
    pub(crate) fn from_budget(budget: &Budget) -> Self {
        Self {
            id: budget.id.clone(),
            name: budget.name.clone(),
            last_modified_on: budget.last_modified_on,
            first_month: budget.first_month.clone(),
            last_month: budget.last_month.clone(),
            date_format: budget.date_format.clone(),
            currency_format: budget.currency_format.clone(),
            accounts: budget
                .accounts
                .iter()
                .map(AccountResponse::from_account)
                .collect(),
            payees: budget.payees.iter().map(PayeeResponse::from_payee).collect(),
            category_groups: budget
                .category_groups
                .iter()
                .map(CategoryGroupResponse::from_group)
                .collect(),
            categories: budget
                .categories
                .iter()
                .map(CategoryResponse::from_category)
                .collect(),
            transactions: budget
                .transactions
                .iter()
                .map(BudgetTransactionResponse::from_transaction)
                .collect(),
            server_knowledge: budget.server_knowledge,
        }
    }
}

/// Envelope for `get_transactions`, echoing back the filters that shaped
/// the listing.
///
/// Scope keys appear only when the corresponding filter was given, and
/// `filtered_by` only when a category scope was narrowed by payee in
/// memory, so callers can tell which constraints produced the rows.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransactionListing {
    /// The matching transactions.
    transactions: Vec<TransactionResponse>,
    /// Number of matching transactions.
    count: usize,
    /// Account scope, when the listing was account-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    /// Category scope, when the listing was category-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<String>,
    /// Payee scope, when the listing was payee-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    payee_id: Option<Vec<String>>,
    /// Budget the listing was drawn from.
    budget_id: String,
    /// Set to `category_then_payee` when payees narrowed a category scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    filtered_by: Option<&'static str>,
    /// Echo of the memo-emptiness filter, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    empty_memo: Option<bool>,
    /// Compact display card, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    widget: Option<TransactionsWidget>,
}

impl TransactionListing {
    /// Wraps listing rows with the scope echoed from `filter`.
    pub(crate) fn new(
        transactions: Vec<TransactionResponse>,
        filter: &TransactionFilter,
        widget: Option<TransactionsWidget>,
    ) -> Self {
        let count = transactions.len();
        let narrowed = filter.narrows_category_then_payee();
        Self {
            transactions,
            count,
            account_id: filter.account_id.clone(),
            category_id: filter.category_id.clone(),
            payee_id: (!filter.payee_ids.is_empty()).then(|| filter.payee_ids.clone()),
            budget_id: filter.budget_id.clone(),
            filtered_by: narrowed.then_some("category_then_payee"),
            empty_memo: filter.empty_memo,
            widget,
        }
    }
}

/// One category's share of the spending leaderboard.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategorySpend {
    /// Category name.
    category: String,
    /// Spending in milliunits, always positive.
    amount_milliunits: i64,
    /// Spending in major units.
    amount_formatted: f64,
}

/// Aggregated spending over a trailing window of whole 30-day months.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SpendingAnalysis {
    /// Window length in days.
    analysis_period_days: u32,
    /// Total outflow in milliunits, always positive.
    total_spending_milliunits: i64,
    /// Total outflow in major units.
    total_spending_formatted: f64,
    /// Number of outflow transactions.
    transaction_count: usize,
    /// Top categories by outflow, at most ten.
    top_spending_categories: Vec<CategorySpend>,
    /// Mean outflow per day in major units, zero when nothing was spent.
    average_daily_spending: f64,
}

impl SpendingAnalysis {
    /// Aggregates outflows (negative amounts) from a transaction listing.
    ///
    /// Uncategorized outflows count toward the totals but never appear on
    /// the category leaderboard. Ties rank alphabetically so the output is
    /// stable across runs.
    pub(crate) fn from_transactions(transactions: &[TransactionDetail], months: u32) -> Self {
        let days = 30 * months.max(1);
        let mut total_spending = 0_i64;
        let mut outflow_count = 0_usize;
        let mut by_category: HashMap<String, i64> = HashMap::new();
        for transaction in transactions {
            if transaction.amount >= 0 {
                continue;
            }
            total_spending += transaction.amount.abs();
            outflow_count += 1;
            if let Some(name) = transaction.category_name.as_deref() {
                *by_category.entry(name.to_owned()).or_default() += transaction.amount.abs();
            }
        }
        let mut ranked: Vec<(String, i64)> = by_category.into_iter().collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
        ranked.truncate(10);
        let average_daily_spending = if total_spending == 0 {
            0.0_f64
        } else {
            milliunits_to_major(total_spending) / f64::from(days)
        };
        Self {
            analysis_period_days: days,
            total_spending_milliunits: total_spending,
            total_spending_formatted: milliunits_to_major(total_spending),
            transaction_count: outflow_count,
            top_spending_categories: ranked
                .into_iter()
                .map(|(category, amount)| CategorySpend {
                    category,
                    amount_milliunits: amount,
                    amount_formatted: milliunits_to_major(amount),
                })
                .collect(),
            average_daily_spending,
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
    use super::{
        AccountResponse, BudgetSummaryResponse, CategoryResponse, ErrorBody, PayeeResponse,
        SpendingAnalysis, TransactionListing, TransactionResponse,
    };
    use crate::error::{ResourceKind, YnabError};
    use crate::filter::TransactionFilter;
    use crate::models::{
        Account, AccountType, BudgetSummary, Category, ClearedStatus, FlagColor, GoalType, Payee,
        SubTransaction, TransactionDetail,
    };
    use crate::widget::TransactionsWidget;

    fn sample_account() -> Account {
        Account {
            id: "acc-1".to_owned(),
            name: "Chase Credit".to_owned(),
            account_type: AccountType::CreditCard,
            on_budget: true,
            closed: false,
            note: None,
            balance: 50_000,
            cleared_balance: -25_990,
            uncleared_balance: 0,
            transfer_payee_id: Some("payee-9".to_owned()),
            deleted: false,
        }
    }

    fn sample_category(goal_target: Option<i64>) -> Category {
        Category {
            id: "cat-1".to_owned(),
            category_group_id: "group-1".to_owned(),
            category_group_name: Some("Bills".to_owned()),
            name: "Rent".to_owned(),
            hidden: false,
            note: None,
            budgeted: 1_500_000,
            activity: -1_499_000,
            balance: 1_000,
            goal_type: goal_target.map(|_target| GoalType::Need),
            goal_needs_whole_amount: None,
            goal_day: None,
            goal_creation_month: None,
            goal_target,
            goal_target_month: Some("2024-12-01".to_owned()),
            goal_percentage_complete: Some(80),
            goal_months_to_budget: None,
            goal_under_funded: None,
            goal_overall_funded: None,
            goal_overall_left: None,
            deleted: false,
        }
    }

    fn outflow(id: &str, amount: i64, category: Option<&str>) -> TransactionDetail {
        TransactionDetail {
            id: id.to_owned(),
            date: "2024-06-15".to_owned(),
            amount,
            memo: None,
            cleared: ClearedStatus::Cleared,
            approved: true,
            flag_color: None,
            account_id: "acc-1".to_owned(),
            account_name: "Checking".to_owned(),
            payee_id: None,
            payee_name: None,
            category_id: category.map(|_name| "cat-1".to_owned()),
            category_name: category.map(str::to_owned),
            transfer_account_id: None,
            transfer_transaction_id: None,
            subtransactions: Vec::new(),
            deleted: false,
        }
    }

    #[test]
    fn account_response_derives_formatted_balances() {
        let resp = AccountResponse::from_account(&sample_account());
        assert!((resp.balance_formatted - 50.0).abs() < f64::EPSILON);
        assert!((resp.cleared_balance_formatted - (-25.99)).abs() < f64::EPSILON);
        assert!(resp.uncleared_balance_formatted.abs() < f64::EPSILON);
    }

    #[test]
    fn account_response_serializes_type_under_wire_name() {
        let resp = AccountResponse::from_account(&sample_account());
        let value = serde_json::to_value(&resp).expect("should serialize");
        assert_eq!(value["type"], "creditCard");
        assert!(value.get("account_type").is_none());
    }

    #[test]
    fn category_response_nests_the_goal() {
        let resp = CategoryResponse::from_category(&sample_category(Some(1_500_000)));
        assert!((resp.budgeted_formatted - 1500.0).abs() < f64::EPSILON);
        assert!((resp.activity_formatted - (-1499.0)).abs() < f64::EPSILON);
        let goal = resp.goal.expect("goal should be present");
        assert_eq!(goal.target, Some(1_500_000));
        let formatted = goal.target_formatted.expect("target should be formatted");
        assert!((formatted - 1500.0).abs() < f64::EPSILON);
        assert_eq!(goal.percentage_complete, Some(80));
    }

    #[test]
    fn category_without_goal_serializes_a_null_goal() {
        let resp = CategoryResponse::from_category(&sample_category(None));
        let value = serde_json::to_value(&resp).expect("should serialize");
        assert!(value["goal"].is_null());
        assert!(value.get("goal_type").is_none());
    }

    #[test]
    fn payee_response_marks_transfers() {
        let transfer = PayeeResponse::from_payee(&Payee {
            id: "p-1".to_owned(),
            name: "Transfer : Savings".to_owned(),
            transfer_account_id: Some("acc-2".to_owned()),
            deleted: false,
        });
        let external = PayeeResponse::from_payee(&Payee {
            id: "p-2".to_owned(),
            name: "Grocer".to_owned(),
            transfer_account_id: None,
            deleted: false,
        });
        assert!(transfer.is_transfer);
        assert!(!external.is_transfer);
    }

    #[test]
    fn transaction_response_expands_split_lines() {
        let mut detail = outflow("tx-1", -30_000, Some("Groceries"));
        detail.flag_color = Some(FlagColor::Green);
        detail.subtransactions = vec![
            SubTransaction {
                id: "sub-1".to_owned(),
                transaction_id: "tx-1".to_owned(),
                amount: -20_000,
                memo: None,
                payee_id: None,
                payee_name: None,
                category_id: None,
                category_name: Some("Groceries".to_owned()),
                transfer_account_id: None,
                transfer_transaction_id: None,
                deleted: false,
            },
            SubTransaction {
                id: "sub-2".to_owned(),
                transaction_id: "tx-1".to_owned(),
                amount: -10_000,
                memo: None,
                payee_id: None,
                payee_name: None,
                category_id: None,
                category_name: Some("Household".to_owned()),
                transfer_account_id: None,
                transfer_transaction_id: None,
                deleted: false,
            },
        ];
        let resp = TransactionResponse::from_detail(&detail);
        assert!(resp.is_split);
        assert_eq!(resp.subtransactions.len(), 2);
        assert!((resp.amount_formatted - (-30.0)).abs() < f64::EPSILON);
        assert!((resp.subtransactions[0].amount_formatted - (-20.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn plain_transaction_is_not_split() {
        let resp = TransactionResponse::from_detail(&outflow("tx-2", -5_000, None));
        assert!(!resp.is_split);
        assert!(resp.subtransactions.is_empty());
    }

    #[test]
    fn budget_summary_keeps_inline_accounts() {
        let summary = BudgetSummary {
            id: "budget-1".to_owned(),
            name: "Family".to_owned(),
            last_modified_on: None,
            first_month: Some("2023-01-01".to_owned()),
            last_month: Some("2024-06-01".to_owned()),
            date_format: None,
            currency_format: None,
            accounts: vec![sample_account()],
        };
        let resp = BudgetSummaryResponse::from_summary(&summary);
        assert_eq!(resp.accounts.len(), 1);
        let value = serde_json::to_value(&resp).expect("should serialize");
        assert!(value["accounts"].is_array());
        assert!(value["currency_format"].is_null());
    }

    #[test]
    fn spending_analysis_aggregates_outflows() {
        let rows = vec![
            outflow("t1", -50_000, Some("Groceries")),
            outflow("t2", -25_990, Some("Dining")),
            outflow("t3", 100_000, Some("Income")),
            outflow("t4", -10, None),
        ];
        let analysis = SpendingAnalysis::from_transactions(&rows, 1);
        assert_eq!(analysis.analysis_period_days, 30);
        assert_eq!(analysis.total_spending_milliunits, 76_000);
        assert!((analysis.total_spending_formatted - 76.0).abs() < f64::EPSILON);
        assert_eq!(analysis.transaction_count, 3);
        assert_eq!(analysis.top_spending_categories.len(), 2);
        assert_eq!(analysis.top_spending_categories[0].category, "Groceries");
        assert_eq!(
            analysis.top_spending_categories[0].amount_milliunits,
            50_000
        );
        assert!((analysis.average_daily_spending - 76.0 / 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn spending_analysis_ranks_equal_amounts_by_name() {
        let rows = vec![
            outflow("t1", -10_000, Some("Zoo")),
            outflow("t2", -10_000, Some("Aquarium")),
        ];
        let analysis = SpendingAnalysis::from_transactions(&rows, 1);
        assert_eq!(analysis.top_spending_categories[0].category, "Aquarium");
        assert_eq!(analysis.top_spending_categories[1].category, "Zoo");
    }

    #[test]
    fn spending_leaderboard_caps_at_ten_categories() {
        let rows: Vec<_> = (0_u8..12)
            .map(|index| outflow(&format!("t{index}"), -1_000, Some(&format!("Cat {index:02}"))))
            .collect();
        let analysis = SpendingAnalysis::from_transactions(&rows, 1);
        assert_eq!(analysis.top_spending_categories.len(), 10);
        assert_eq!(analysis.transaction_count, 12);
    }

    #[test]
    fn spending_analysis_without_outflows_is_all_zeroes() {
        let rows = vec![outflow("t1", 40_000, Some("Income"))];
        let analysis = SpendingAnalysis::from_transactions(&rows, 3);
        assert_eq!(analysis.analysis_period_days, 90);
        assert_eq!(analysis.total_spending_milliunits, 0);
        assert_eq!(analysis.transaction_count, 0);
        assert!(analysis.top_spending_categories.is_empty());
        assert!(analysis.average_daily_spending.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_months_still_covers_one_month() {
        let rows = vec![outflow("t1", -3_000, None)];
        let analysis = SpendingAnalysis::from_transactions(&rows, 0);
        assert_eq!(analysis.analysis_period_days, 30);
    }

    #[test]
    fn error_body_names_the_missing_budget() {
        let body = ErrorBody::from_error(YnabError::NotFound {
            kind: ResourceKind::Budget,
            id: "b-404".to_owned(),
        });
        let value = serde_json::to_value(&body).expect("should serialize");
        assert_eq!(value["error"], "Budget with ID 'b-404' not found");
        assert_eq!(value["budget_id"], "b-404");
        assert!(value.get("status_code").is_none());
        assert!(value.get("account_id").is_none());
    }

    #[test]
    fn ambiguous_not_found_carries_the_status_instead() {
        let body = ErrorBody::from_error(YnabError::NotFound {
            kind: ResourceKind::Unknown,
            id: "x-1".to_owned(),
        });
        assert_eq!(body.status_code, Some(404));
        assert_eq!(body.budget_id, None);
    }

    #[test]
    fn rate_limit_error_carries_retry_after() {
        let body = ErrorBody::from_error(YnabError::RateLimited {
            retry_after: Some(20),
        });
        assert_eq!(body.error, "Rate limit exceeded");
        assert_eq!(body.status_code, Some(429));
        assert_eq!(body.retry_after, Some(20));
    }

    #[test]
    fn validation_errors_are_message_only() {
        let body = ErrorBody::from_error(YnabError::InvalidDate {
            value: "not-a-date".to_owned(),
        });
        let value = serde_json::to_value(&body).expect("should serialize");
        let keys = value.as_object().expect("should be an object");
        assert_eq!(keys.len(), 1);
        assert_eq!(
            value["error"],
            "Invalid date format: 'not-a-date'. Expected format: YYYY-MM-DD"
        );
    }

    #[test]
    fn missing_credential_body_is_bare() {
        let body = ErrorBody::no_credential();
        let value = serde_json::to_value(&body).expect("should serialize");
        let keys = value.as_object().expect("should be an object");
        assert_eq!(keys.len(), 1);
        assert_eq!(value["error"], "No valid authentication token found");
    }

    #[test]
    fn upstream_error_keeps_status_and_detail() {
        let body = ErrorBody::from_error(YnabError::Api {
            status: 502,
            detail: "API error: 502".to_owned(),
        });
        assert_eq!(body.error, "API error: 502");
        assert_eq!(body.status_code, Some(502));
    }

    #[test]
    fn account_scoped_listing_echoes_its_filters() {
        let detail = outflow("t-1", -12_500, Some("Groceries"));
        let rows = vec![TransactionResponse::from_detail(&detail)];
        let filter = TransactionFilter {
            budget_id: "b-1".to_owned(),
            account_id: Some("acc-1".to_owned()),
            category_id: Some("cat-1".to_owned()),
            payee_ids: vec!["p-1".to_owned()],
            empty_memo: Some(true),
            ..TransactionFilter::default()
        };
        let value = serde_json::to_value(TransactionListing::new(rows, &filter, None))
            .expect("should serialize");
        assert_eq!(value["count"].as_u64(), Some(1));
        assert_eq!(value["account_id"], "acc-1");
        assert_eq!(value["category_id"], "cat-1");
        assert_eq!(value["payee_id"][0], "p-1");
        assert_eq!(value["budget_id"], "b-1");
        assert_eq!(value["empty_memo"], serde_json::Value::Bool(true));
        let keys = value.as_object().expect("should be an object");
        assert!(!keys.contains_key("filtered_by"));
        assert!(!keys.contains_key("widget"));
    }

    #[test]
    fn category_then_payee_listing_is_labelled() {
        let filter = TransactionFilter {
            budget_id: "b-1".to_owned(),
            category_id: Some("cat-1".to_owned()),
            payee_ids: vec!["p-1".to_owned(), "p-2".to_owned()],
            ..TransactionFilter::default()
        };
        let value = serde_json::to_value(TransactionListing::new(Vec::new(), &filter, None))
            .expect("should serialize");
        assert_eq!(value["filtered_by"], "category_then_payee");
        assert_eq!(value["payee_id"][1], "p-2");
        let keys = value.as_object().expect("should be an object");
        assert!(!keys.contains_key("account_id"));
    }

    #[test]
    fn unscoped_listing_echoes_only_the_budget() {
        let filter = TransactionFilter {
            budget_id: "b-1".to_owned(),
            ..TransactionFilter::default()
        };
        let value = serde_json::to_value(TransactionListing::new(Vec::new(), &filter, None))
            .expect("should serialize");
        let keys = value.as_object().expect("should be an object");
        assert_eq!(keys.len(), 3);
        assert_eq!(value["count"].as_u64(), Some(0));
        assert_eq!(value["budget_id"], "b-1");
    }

    #[test]
    fn listing_carries_the_widget_when_given() {
        let detail = outflow("t-1", -12_500, Some("Groceries"));
        let card = TransactionsWidget::from_transactions(core::slice::from_ref(&detail));
        let rows = vec![TransactionResponse::from_detail(&detail)];
        let filter = TransactionFilter {
            budget_id: "b-1".to_owned(),
            ..TransactionFilter::default()
        };
        let value = serde_json::to_value(TransactionListing::new(rows, &filter, Some(card)))
            .expect("should serialize");
        assert_eq!(value["widget"]["summary"]["rowCount"].as_u64(), Some(1));
        assert!(value["widget"]["rows"].is_array());
    }
}
