//! Typed records for the YNAB REST API.
//!
//! Monetary fields are integers in milliunits (1000 milliunits = 1 major
//! currency unit). Display values are always derived with
//! [`milliunits_to_major`] at read time, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Converts a milliunit amount into major currency units.
///
/// `50000` becomes `50.0` and `-25990` becomes `-25.99`.
#[allow(
    clippy::cast_precision_loss,
    reason = "milliunit amounts fit well within f64's 53-bit mantissa"
)]
pub(crate) const fn milliunits_to_major(amount: i64) -> f64 {
    amount as f64 / 1000.0_f64
}

/// Converts a major-unit amount into milliunits, rounding to the nearest
/// milliunit so inputs like `10.004` do not truncate to `10003`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "amounts are far below the range where f64 rounding overflows i64"
)]
pub(crate) const fn major_to_milliunits(amount: f64) -> i64 {
    (amount * 1000.0_f64).round() as i64
}

/// Account classification as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum AccountType {
    /// Checking account.
    Checking,
    /// Savings account.
    Savings,
    /// Physical cash.
    Cash,
    /// Credit card.
    CreditCard,
    /// Line of credit.
    LineOfCredit,
    /// Tracking-only asset.
    OtherAsset,
    /// Tracking-only liability.
    OtherLiability,
    /// Mortgage loan.
    Mortgage,
    /// Auto loan.
    AutoLoan,
    /// Student loan.
    StudentLoan,
    /// Personal loan.
    PersonalLoan,
    /// Medical debt.
    MedicalDebt,
    /// Any other debt.
    OtherDebt,
}

/// Cleared state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ClearedStatus {
    /// Matched against a bank statement.
    Cleared,
    /// Not yet cleared.
    Uncleared,
    /// Locked by a reconciliation.
    Reconciled,
}

impl ClearedStatus {
    /// Parses lenient user input such as `"Cleared"` or `" reconciled "`.
    pub(crate) fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cleared" => Some(Self::Cleared),
            "uncleared" => Some(Self::Uncleared),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }
}

/// Flag color from the fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FlagColor {
    /// Red flag.
    Red,
    /// Orange flag.
    Orange,
    /// Yellow flag.
    Yellow,
    /// Green flag.
    Green,
    /// Blue flag.
    Blue,
    /// Purple flag.
    Purple,
}

impl FlagColor {
    /// Parses lenient user input such as `"Red"` or `" blue "`.
    pub(crate) fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => Some(Self::Red),
            "orange" => Some(Self::Orange),
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "purple" => Some(Self::Purple),
            _ => None,
        }
    }
}

/// Category goal flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum GoalType {
    /// Target category balance.
    #[serde(rename = "TB")]
    TargetBalance,
    /// Target category balance by a date.
    #[serde(rename = "TBD")]
    TargetBalanceByDate,
    /// Monthly funding.
    #[serde(rename = "MF")]
    MonthlyFunding,
    /// Plan-your-spending goal.
    #[serde(rename = "NEED")]
    Need,
    /// Debt payoff goal.
    #[serde(rename = "DEBT")]
    Debt,
}

/// Currency formatting metadata attached to a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CurrencyFormat {
    /// ISO 4217 currency code.
    pub(crate) iso_code: String,
    /// Rendered example such as `123,456.78`.
    pub(crate) example_format: String,
    /// Number of decimal digits.
    pub(crate) decimal_digits: u32,
    /// Decimal separator character.
    pub(crate) decimal_separator: String,
    /// Whether the symbol precedes the amount.
    pub(crate) symbol_first: bool,
    /// Thousands separator character.
    pub(crate) group_separator: String,
    /// Currency symbol.
    pub(crate) currency_symbol: String,
    /// Whether the symbol is displayed at all.
    pub(crate) display_symbol: bool,
}

/// Date formatting metadata attached to a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DateFormat {
    /// Format template such as `MM/DD/YYYY`.
    pub(crate) format: String,
}

/// Budget list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BudgetSummary {
    /// Budget id.
    pub(crate) id: String,
    /// Budget name.
    pub(crate) name: String,
    /// Last modification timestamp.
    pub(crate) last_modified_on: Option<DateTime<Utc>>,
    /// First month covered, as `YYYY-MM-DD`.
    pub(crate) first_month: Option<String>,
    /// Last month covered, as `YYYY-MM-DD`.
    pub(crate) last_month: Option<String>,
    /// Date format metadata.
    pub(crate) date_format: Option<DateFormat>,
    /// Currency format metadata.
    pub(crate) currency_format: Option<CurrencyFormat>,
    /// Account summaries, present when the caller asked for them.
    #[serde(default)]
    pub(crate) accounts: Vec<Account>,
}

/// Full budget export with all related entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Budget {
    /// Budget id.
    pub(crate) id: String,
    /// Budget name.
    pub(crate) name: String,
    /// Last modification timestamp.
    pub(crate) last_modified_on: Option<DateTime<Utc>>,
    /// First month covered, as `YYYY-MM-DD`.
    pub(crate) first_month: Option<String>,
    /// Last month covered, as `YYYY-MM-DD`.
    pub(crate) last_month: Option<String>,
    /// Date format metadata.
    pub(crate) date_format: Option<DateFormat>,
    /// Currency format metadata.
    pub(crate) currency_format: Option<CurrencyFormat>,
    /// Accounts in the budget.
    #[serde(default)]
    pub(crate) accounts: Vec<Account>,
    /// Payees in the budget.
    #[serde(default)]
    pub(crate) payees: Vec<Payee>,
    /// Category groups in the budget.
    #[serde(default)]
    pub(crate) category_groups: Vec<CategoryGroup>,
    /// Categories in the budget.
    #[serde(default)]
    pub(crate) categories: Vec<Category>,
    /// Transactions in the budget.
    #[serde(default)]
    pub(crate) transactions: Vec<Transaction>,
    /// Change cursor for incremental sync, passed through untouched.
    pub(crate) server_knowledge: Option<i64>,
}

/// Account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Account {
    /// Account id.
    pub(crate) id: String,
    /// Account name.
    pub(crate) name: String,
    /// Account classification.
    #[serde(rename = "type")]
    pub(crate) account_type: AccountType,
    /// Whether the account participates in the budget.
    pub(crate) on_budget: bool,
    /// Whether the account is closed.
    pub(crate) closed: bool,
    /// Free-form note.
    pub(crate) note: Option<String>,
    /// Working balance in milliunits.
    pub(crate) balance: i64,
    /// Cleared balance in milliunits.
    pub(crate) cleared_balance: i64,
    /// Uncleared balance in milliunits.
    pub(crate) uncleared_balance: i64,
    /// Payee id used for transfers into this account.
    pub(crate) transfer_payee_id: Option<String>,
    /// Whether the account has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

/// Category group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryGroup {
    /// Group id.
    pub(crate) id: String,
    /// Group name.
    pub(crate) name: String,
    /// Whether the group is hidden.
    pub(crate) hidden: bool,
    /// Whether the group has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

/// Category record.
///
/// Goal fields arrive flat on the wire; [`Category::goal`] assembles them
/// into one sub-record when a goal is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Category {
    /// Category id.
    pub(crate) id: String,
    /// Owning group id.
    pub(crate) category_group_id: String,
    /// Owning group name, denormalized at read time.
    pub(crate) category_group_name: Option<String>,
    /// Category name.
    pub(crate) name: String,
    /// Whether the category is hidden.
    pub(crate) hidden: bool,
    /// Free-form note.
    pub(crate) note: Option<String>,
    /// Budgeted amount in milliunits.
    pub(crate) budgeted: i64,
    /// Activity in milliunits.
    pub(crate) activity: i64,
    /// Available balance in milliunits.
    pub(crate) balance: i64,
    /// Goal flavor, when a goal is configured.
    pub(crate) goal_type: Option<GoalType>,
    /// Whether the goal asks for the whole target each period.
    pub(crate) goal_needs_whole_amount: Option<bool>,
    /// Day of month the goal is due.
    pub(crate) goal_day: Option<i32>,
    /// Month the goal was created, as `YYYY-MM-DD`.
    pub(crate) goal_creation_month: Option<String>,
    /// Goal target in milliunits.
    pub(crate) goal_target: Option<i64>,
    /// Goal target month, as `YYYY-MM-DD`.
    pub(crate) goal_target_month: Option<String>,
    /// Goal completion percentage.
    pub(crate) goal_percentage_complete: Option<i32>,
    /// Months left to fund the goal.
    pub(crate) goal_months_to_budget: Option<i32>,
    /// Amount still needed this period, in milliunits.
    pub(crate) goal_under_funded: Option<i64>,
    /// Total funded toward the goal, in milliunits.
    pub(crate) goal_overall_funded: Option<i64>,
    /// Total still needed overall, in milliunits.
    pub(crate) goal_overall_left: Option<i64>,
    /// Whether the category has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

impl Category {
    /// Assembles the flat wire fields into a goal sub-record.
    ///
    /// Returns `None` when no goal is configured.
    pub(crate) fn goal(&self) -> Option<CategoryGoal> {
        self.goal_type.map(|goal_type| CategoryGoal {
            goal_type,
            needs_whole_amount: self.goal_needs_whole_amount,
            day: self.goal_day,
            creation_month: self.goal_creation_month.clone(),
            target: self.goal_target,
            target_month: self.goal_target_month.clone(),
            percentage_complete: self.goal_percentage_complete,
            months_to_budget: self.goal_months_to_budget,
            under_funded: self.goal_under_funded,
            overall_funded: self.goal_overall_funded,
            overall_left: self.goal_overall_left,
        })
    }
}

/// Goal configuration assembled from a category's flat wire fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CategoryGoal {
    /// Goal flavor.
    pub(crate) goal_type: GoalType,
    /// Whether the goal asks for the whole target each period.
    pub(crate) needs_whole_amount: Option<bool>,
    /// Day of month the goal is due.
    pub(crate) day: Option<i32>,
    /// Month the goal was created, as `YYYY-MM-DD`.
    pub(crate) creation_month: Option<String>,
    /// Target in milliunits.
    pub(crate) target: Option<i64>,
    /// Target month, as `YYYY-MM-DD`.
    pub(crate) target_month: Option<String>,
    /// Completion percentage.
    pub(crate) percentage_complete: Option<i32>,
    /// Months left to fund the goal.
    pub(crate) months_to_budget: Option<i32>,
    /// Amount still needed this period, in milliunits.
    pub(crate) under_funded: Option<i64>,
    /// Total funded toward the goal, in milliunits.
    pub(crate) overall_funded: Option<i64>,
    /// Total still needed overall, in milliunits.
    pub(crate) overall_left: Option<i64>,
}

/// Payee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Payee {
    /// Payee id.
    pub(crate) id: String,
    /// Payee name.
    pub(crate) name: String,
    /// For transfer payees, the account money moves into.
    pub(crate) transfer_account_id: Option<String>,
    /// Whether the payee has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

impl Payee {
    /// True when this payee represents a transfer between accounts rather
    /// than cash flow to an external party.
    pub(crate) const fn is_transfer(&self) -> bool {
        self.transfer_account_id.is_some()
    }
}

/// Split line inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SubTransaction {
    /// Subtransaction id.
    pub(crate) id: String,
    /// Parent transaction id.
    pub(crate) transaction_id: String,
    /// Amount in milliunits.
    pub(crate) amount: i64,
    /// Free-form memo.
    pub(crate) memo: Option<String>,
    /// Payee id.
    pub(crate) payee_id: Option<String>,
    /// Payee name.
    pub(crate) payee_name: Option<String>,
    /// Category id.
    pub(crate) category_id: Option<String>,
    /// Category name.
    pub(crate) category_name: Option<String>,
    /// For transfers, the other account.
    pub(crate) transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    pub(crate) transfer_transaction_id: Option<String>,
    /// Whether the subtransaction has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

/// Transaction record as nested inside a full budget export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Transaction {
    /// Transaction id.
    pub(crate) id: String,
    /// Transaction date, as `YYYY-MM-DD`.
    pub(crate) date: String,
    /// Signed amount in milliunits, negative for outflows.
    pub(crate) amount: i64,
    /// Free-form memo.
    pub(crate) memo: Option<String>,
    /// Cleared state.
    pub(crate) cleared: ClearedStatus,
    /// Whether the transaction has been approved.
    pub(crate) approved: bool,
    /// Flag color, when flagged.
    pub(crate) flag_color: Option<FlagColor>,
    /// Owning account id.
    pub(crate) account_id: String,
    /// Payee id.
    pub(crate) payee_id: Option<String>,
    /// Category id.
    pub(crate) category_id: Option<String>,
    /// For transfers, the other account.
    pub(crate) transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    pub(crate) transfer_transaction_id: Option<String>,
    /// Whether the transaction has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

/// Transaction record with denormalized names and split lines, as returned
/// by every transaction listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TransactionDetail {
    /// Transaction id.
    pub(crate) id: String,
    /// Transaction date, as `YYYY-MM-DD`.
    pub(crate) date: String,
    /// Signed amount in milliunits, negative for outflows.
    pub(crate) amount: i64,
    /// Free-form memo.
    pub(crate) memo: Option<String>,
    /// Cleared state.
    pub(crate) cleared: ClearedStatus,
    /// Whether the transaction has been approved.
    pub(crate) approved: bool,
    /// Flag color, when flagged.
    pub(crate) flag_color: Option<FlagColor>,
    /// Owning account id.
    pub(crate) account_id: String,
    /// Owning account name.
    pub(crate) account_name: String,
    /// Payee id.
    pub(crate) payee_id: Option<String>,
    /// Payee name.
    pub(crate) payee_name: Option<String>,
    /// Category id.
    pub(crate) category_id: Option<String>,
    /// Category name.
    pub(crate) category_name: Option<String>,
    /// For transfers, the other account.
    pub(crate) transfer_account_id: Option<String>,
    /// For transfers, the mirrored transaction.
    pub(crate) transfer_transaction_id: Option<String>,
    /// Split lines, empty for a plain transaction.
    #[serde(default)]
    pub(crate) subtransactions: Vec<SubTransaction>,
    /// Whether the transaction has been soft-deleted upstream.
    #[serde(default)]
    pub(crate) deleted: bool,
}

impl TransactionDetail {
    /// True when the amount is split across subtransactions.
    pub(crate) const fn is_split(&self) -> bool {
        !self.subtransactions.is_empty()
    }
}

/// Authenticated user record returned by the `/user` probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct User {
    /// User id.
    pub(crate) id: String,
    /// Account email, when the API exposes it.
    pub(crate) email: Option<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect for readability"
)]
mod tests {
    use super::{
        AccountType, Category, ClearedStatus, FlagColor, GoalType, Payee, TransactionDetail,
        major_to_milliunits, milliunits_to_major,
    };

    #[test]
    fn milliunits_convert_exactly() {
        assert!((milliunits_to_major(50_000) - 50.0).abs() < f64::EPSILON);
        assert!((milliunits_to_major(-25_990) - (-25.99)).abs() < f64::EPSILON);
        assert!(milliunits_to_major(0).abs() < f64::EPSILON);
    }

    #[test]
    fn major_units_round_to_nearest_milliunit() {
        assert_eq!(major_to_milliunits(50.0), 50_000);
        assert_eq!(major_to_milliunits(-25.99), -25_990);
        // 10.004 * 1000 lands just below 10004 in binary floating point.
        assert_eq!(major_to_milliunits(10.004), 10_004);
    }

    #[test]
    fn account_deserializes_from_wire_shape() {
        let json = r#"{
            "id": "acc-1",
            "name": "Chase Credit",
            "type": "creditCard",
            "on_budget": true,
            "closed": false,
            "note": null,
            "balance": -45230,
            "cleared_balance": -40000,
            "uncleared_balance": -5230,
            "transfer_payee_id": "payee-9"
        }"#;
        let account: super::Account = serde_json::from_str(json).expect("account should parse");
        assert_eq!(account.account_type, AccountType::CreditCard);
        assert_eq!(account.balance, -45_230);
        assert!(!account.deleted);
    }

    #[test]
    fn budget_summary_parses_timestamp_and_defaults_accounts() {
        let json = r#"{
            "id": "budget-1",
            "name": "Family",
            "last_modified_on": "2024-06-01T12:30:00+00:00",
            "first_month": "2023-01-01",
            "last_month": "2024-06-01"
        }"#;
        let summary: super::BudgetSummary =
            serde_json::from_str(json).expect("summary should parse");
        assert!(summary.last_modified_on.is_some());
        assert!(summary.accounts.is_empty());
        assert!(summary.currency_format.is_none());
    }

    #[test]
    fn category_goal_is_assembled_when_configured() {
        let json = r#"{
            "id": "cat-1",
            "category_group_id": "group-1",
            "category_group_name": "Bills",
            "name": "Rent",
            "hidden": false,
            "note": null,
            "budgeted": 1500000,
            "activity": -1500000,
            "balance": 0,
            "goal_type": "NEED",
            "goal_target": 1500000,
            "goal_target_month": "2024-12-01",
            "goal_percentage_complete": 80
        }"#;
        let category: Category = serde_json::from_str(json).expect("category should parse");
        let goal = category.goal().expect("goal should be present");
        assert_eq!(goal.goal_type, GoalType::Need);
        assert_eq!(goal.target, Some(1_500_000));
        assert_eq!(goal.percentage_complete, Some(80));
    }

    #[test]
    fn category_without_goal_yields_none() {
        let json = r#"{
            "id": "cat-2",
            "category_group_id": "group-1",
            "name": "Misc",
            "hidden": false,
            "budgeted": 0,
            "activity": 0,
            "balance": 0
        }"#;
        let category: Category = serde_json::from_str(json).expect("category should parse");
        assert!(category.goal().is_none());
    }

    #[test]
    fn goal_type_uses_wire_spelling() {
        let rendered = serde_json::to_string(&GoalType::Need).expect("should serialize");
        assert_eq!(rendered, "\"NEED\"");
        let parsed: GoalType = serde_json::from_str("\"TBD\"").expect("should parse");
        assert_eq!(parsed, GoalType::TargetBalanceByDate);
    }

    #[test]
    fn cleared_status_parses_lenient_input() {
        assert_eq!(
            ClearedStatus::from_input(" Cleared "),
            Some(ClearedStatus::Cleared)
        );
        assert_eq!(
            ClearedStatus::from_input("RECONCILED"),
            Some(ClearedStatus::Reconciled)
        );
        assert_eq!(ClearedStatus::from_input("pending"), None);
    }

    #[test]
    fn flag_color_parses_lenient_input() {
        assert_eq!(FlagColor::from_input("Blue"), Some(FlagColor::Blue));
        assert_eq!(FlagColor::from_input("magenta"), None);
    }

    #[test]
    fn transaction_detail_reports_splits() {
        let json = r#"{
            "id": "tx-1",
            "date": "2024-06-15",
            "amount": -30000,
            "memo": "costco run",
            "cleared": "cleared",
            "approved": true,
            "flag_color": "green",
            "account_id": "acc-1",
            "account_name": "Checking",
            "payee_name": "Costco",
            "subtransactions": [
                {
                    "id": "sub-1",
                    "transaction_id": "tx-1",
                    "amount": -20000,
                    "category_name": "Groceries"
                },
                {
                    "id": "sub-2",
                    "transaction_id": "tx-1",
                    "amount": -10000,
                    "category_name": "Household"
                }
            ]
        }"#;
        let detail: TransactionDetail = serde_json::from_str(json).expect("detail should parse");
        assert!(detail.is_split());
        assert_eq!(detail.subtransactions.len(), 2);
        assert_eq!(detail.cleared, ClearedStatus::Cleared);
        assert_eq!(detail.flag_color, Some(FlagColor::Green));
    }

    #[test]
    fn payee_transfer_predicate_follows_transfer_account() {
        let transfer = Payee {
            id: "p-1".to_owned(),
            name: "Transfer : Savings".to_owned(),
            transfer_account_id: Some("acc-2".to_owned()),
            deleted: false,
        };
        let external = Payee {
            id: "p-2".to_owned(),
            name: "Grocer".to_owned(),
            transfer_account_id: None,
            deleted: false,
        };
        assert!(transfer.is_transfer());
        assert!(!external.is_transfer());
    }
}
