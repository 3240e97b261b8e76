//! Compact card rendering for transaction listings.
//!
//! Produces a totals header plus up to six display-ready rows. Amounts
//! render as `$1,234.56` with the sign ahead of the currency symbol, dates
//! shorten to `Jun 5`, and memos are clipped to forty characters.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{TransactionDetail, milliunits_to_major};

/// Maximum number of rows the card renders.
const WIDGET_ROW_LIMIT: usize = 6;

/// Inserts `,` separators every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::new();
    for (offset, digit) in digits.chars().enumerate() {
        if offset > 0 && (digits.len() - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Renders a milliunit amount as a grouped dollar string, with the sign
/// ahead of the symbol: `-25990` becomes `-$25.99`.
fn format_amount(milliunits: i64) -> String {
    let major = milliunits_to_major(milliunits).abs();
    let plain = format!("{major:.2}");
    let (digits, cents) = plain
        .split_once('.')
        .unwrap_or_else(|| (plain.as_str(), "00"));
    let grouped = group_thousands(digits);
    if milliunits < 0 {
        format!("-${grouped}.{cents}")
    } else {
        format!("${grouped}.{cents}")
    }
}

/// Shortens an ISO date to `Mon D`. Empty input renders as a dash and
/// anything unparseable passes through verbatim.
fn format_date(value: &str) -> String {
    if value.is_empty() {
        return "\u{2014}".to_owned();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_or_else(
        |_err| value.to_owned(),
        |parsed| parsed.format("%b %-d").to_string(),
    )
}

/// Trims a memo and clips it to forty characters, with an ellipsis when
/// clipped. Blank memos collapse to `None`.
fn clean_memo(memo: Option<&str>) -> Option<String> {
    let text = memo?.trim();
    if text.is_empty() {
        return None;
    }
    if text.chars().count() <= 40 {
        return Some(text.to_owned());
    }
    let clipped: String = text.chars().take(37).collect();
    Some(format!("{clipped}\u{2026}"))
}

/// Accent color for a signed amount.
const fn amount_color(milliunits: i64) -> &'static str {
    if milliunits < 0 {
        "danger"
    } else if milliunits > 0 {
        "success"
    } else {
        "secondary"
    }
}

/// One rendered row of the transactions card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WidgetRow {
    /// Transaction id, or a positional `row-{n}` placeholder.
    id: String,
    /// Payee display name, falling back to the account name.
    payee: String,
    /// Rendered amount, e.g. `-$25.99`.
    amount: String,
    /// Row accent: `danger`, `success`, or `secondary`.
    amount_color: &'static str,
    /// Shortened date, e.g. `Jun 5`.
    date: String,
    /// Category display name.
    category: String,
    /// Whether the transaction still awaits approval.
    needs_approval: bool,
    /// Cleaned memo, when one survives clipping.
    memo: Option<String>,
}

impl WidgetRow {
    /// Renders one listing row, substituting placeholders for blanks.
    fn from_detail(index: usize, detail: &TransactionDetail) -> Self {
        let id = if detail.id.is_empty() {
            format!("row-{index}")
        } else {
            detail.id.clone()
        };
        let payee = detail
            .payee_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| Some(detail.account_name.as_str()).filter(|name| !name.is_empty()))
            .unwrap_or("Unknown payee")
            .to_owned();
        let category = detail
            .category_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Uncategorized")
            .to_owned();
        Self {
            id,
            payee,
            amount: format_amount(detail.amount),
            amount_color: amount_color(detail.amount),
            date: format_date(&detail.date),
            category,
            needs_approval: !detail.approved,
            memo: clean_memo(detail.memo.as_deref()),
        }
    }
}

/// Header block of the transactions card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WidgetSummary {
    /// Card title.
    title: &'static str,
    /// One-line description of what is shown.
    subtitle: String,
    /// Total number of transactions in the listing.
    row_count: usize,
    /// Number of rows actually rendered.
    display_count: usize,
    /// Rendered total outflow.
    outflow: String,
    /// Rendered total inflow.
    inflow: String,
    /// Rendered net cash flow.
    net: String,
    /// Accent for the net figure.
    net_color: &'static str,
}

/// Compact card summarizing a transaction listing.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransactionsWidget {
    /// Header block with totals.
    summary: WidgetSummary,
    /// Up to six rendered rows.
    rows: Vec<WidgetRow>,
}

impl TransactionsWidget {
    /// Renders the card for a transaction listing. Totals cover the whole
    /// listing even when only the leading rows are displayed.
    pub(crate) fn from_transactions(transactions: &[TransactionDetail]) -> Self {
        let total_count = transactions.len();
        let mut outflow_total = 0_i64;
        let mut inflow_total = 0_i64;
        for transaction in transactions {
            if transaction.amount < 0 {
                outflow_total += transaction.amount;
            } else if transaction.amount > 0 {
                inflow_total += transaction.amount;
            }
        }
        let net_total = outflow_total + inflow_total;
        let rows: Vec<WidgetRow> = transactions
            .iter()
            .take(WIDGET_ROW_LIMIT)
            .enumerate()
            .map(|(index, transaction)| WidgetRow::from_detail(index, transaction))
            .collect();
        let display_count = rows.len();
        let subtitle = if total_count == 0 {
            "No transactions found".to_owned()
        } else if total_count > display_count {
            format!("Showing {display_count} of {total_count} transactions")
        } else if display_count == 1 {
            "1 transaction".to_owned()
        } else {
            format!("{display_count} transactions")
        };
        Self {
            summary: WidgetSummary {
                title: "Recent transactions",
                subtitle,
                row_count: total_count,
                display_count,
                outflow: format_amount(outflow_total),
                inflow: format_amount(inflow_total),
                net: format_amount(net_total),
                net_color: amount_color(net_total),
            },
            rows,
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
    use super::{TransactionsWidget, clean_memo, format_amount, format_date};
    use crate::models::{ClearedStatus, TransactionDetail};

    fn row(id: &str, amount: i64, payee: Option<&str>, memo: Option<&str>) -> TransactionDetail {
        TransactionDetail {
            id: id.to_owned(),
            date: "2024-06-05".to_owned(),
            amount,
            memo: memo.map(str::to_owned),
            cleared: ClearedStatus::Uncleared,
            approved: true,
            flag_color: None,
            account_id: "acc-1".to_owned(),
            account_name: "Checking".to_owned(),
            payee_id: None,
            payee_name: payee.map(str::to_owned),
            category_id: None,
            category_name: None,
            transfer_account_id: None,
            transfer_transaction_id: None,
            subtransactions: Vec::new(),
            deleted: false,
        }
    }

    #[test]
    fn amounts_group_thousands_and_keep_the_sign_outside() {
        assert_eq!(format_amount(50_000), "$50.00");
        assert_eq!(format_amount(-25_990), "-$25.99");
        assert_eq!(format_amount(0), "$0.00");
        assert_eq!(format_amount(1_234_567_890), "$1,234,567.89");
        assert_eq!(format_amount(-1_000_000), "-$1,000.00");
        assert_eq!(format_amount(-400), "-$0.40");
    }

    #[test]
    fn dates_shorten_without_zero_padding() {
        assert_eq!(format_date("2024-06-05"), "Jun 5");
        assert_eq!(format_date("2024-12-25"), "Dec 25");
    }

    #[test]
    fn blank_and_unparseable_dates_degrade_gracefully() {
        assert_eq!(format_date(""), "\u{2014}");
        assert_eq!(format_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn memos_trim_collapse_and_clip() {
        assert_eq!(clean_memo(None), None);
        assert_eq!(clean_memo(Some("   ")), None);
        assert_eq!(clean_memo(Some(" ok ")), Some("ok".to_owned()));
        let long = "a".repeat(41);
        let clipped = clean_memo(Some(&long)).expect("long memo should survive");
        assert_eq!(clipped.chars().count(), 38);
        assert!(clipped.ends_with('\u{2026}'));
        let exact = "b".repeat(40);
        assert_eq!(clean_memo(Some(&exact)), Some(exact.clone()));
    }

    #[test]
    fn card_caps_rows_and_totals_the_whole_listing() {
        let rows: Vec<_> = (0_u8..7)
            .map(|index| row(&format!("t{index}"), -10_000, None, None))
            .collect();
        let widget = TransactionsWidget::from_transactions(&rows);
        assert_eq!(widget.rows.len(), 6);
        assert_eq!(widget.summary.row_count, 7);
        assert_eq!(widget.summary.display_count, 6);
        assert_eq!(widget.summary.subtitle, "Showing 6 of 7 transactions");
        assert_eq!(widget.summary.outflow, "-$70.00");
        assert_eq!(widget.summary.inflow, "$0.00");
        assert_eq!(widget.summary.net, "-$70.00");
        assert_eq!(widget.summary.net_color, "danger");
    }

    #[test]
    fn empty_listing_renders_a_placeholder_summary() {
        let widget = TransactionsWidget::from_transactions(&[]);
        assert_eq!(widget.summary.subtitle, "No transactions found");
        assert_eq!(widget.summary.row_count, 0);
        assert_eq!(widget.summary.net, "$0.00");
        assert_eq!(widget.summary.net_color, "secondary");
        assert!(widget.rows.is_empty());
    }

    #[test]
    fn single_transaction_subtitle_is_singular() {
        let widget = TransactionsWidget::from_transactions(&[row("t1", 5_000, None, None)]);
        assert_eq!(widget.summary.subtitle, "1 transaction");
        assert_eq!(widget.summary.inflow, "$5.00");
        assert_eq!(widget.summary.net_color, "success");
    }

    #[test]
    fn rows_fall_back_through_payee_account_and_category() {
        let named = row("t1", -2_500, Some("Grocer"), Some("  weekly run  "));
        let mut anonymous = row("", 0, None, None);
        anonymous.account_name = String::new();
        let widget = TransactionsWidget::from_transactions(&[named, anonymous]);
        assert_eq!(widget.rows[0].payee, "Grocer");
        assert_eq!(widget.rows[0].memo.as_deref(), Some("weekly run"));
        assert_eq!(widget.rows[0].category, "Uncategorized");
        assert_eq!(widget.rows[0].amount_color, "danger");
        assert_eq!(widget.rows[0].date, "Jun 5");
        assert_eq!(widget.rows[1].payee, "Unknown payee");
        assert_eq!(widget.rows[1].id, "row-1");
        assert_eq!(widget.rows[1].amount_color, "secondary");
    }

    #[test]
    fn unapproved_rows_are_flagged_for_review() {
        let mut pending = row("t1", -1_000, Some("Cafe"), None);
        pending.approved = false;
        let widget = TransactionsWidget::from_transactions(&[pending]);
        assert!(widget.rows[0].needs_approval);
        let fallback = TransactionsWidget::from_transactions(&[row("t2", -1_000, None, None)]);
        assert_eq!(fallback.rows[0].payee, "Checking");
        assert!(!fallback.rows[0].needs_approval);
    }

    #[test]
    fn serialized_keys_are_camel_case() {
        let widget = TransactionsWidget::from_transactions(&[row("t1", -1_000, None, None)]);
        let value = serde_json::to_value(&widget).expect("should serialize");
        let summary = value["summary"].as_object().expect("summary object");
        assert!(summary.contains_key("rowCount"));
        assert!(summary.contains_key("displayCount"));
        assert!(summary.contains_key("netColor"));
        assert!(!summary.contains_key("row_count"));
        let first = value["rows"][0].as_object().expect("row object");
        assert!(first.contains_key("amountColor"));
        assert!(first.contains_key("needsApproval"));
        assert!(!first.contains_key("needs_approval"));
    }
}
