//! Compound transaction filtering.
//!
//! A filter resolves to the narrowest server-side listing endpoint its
//! fields allow, and whatever that endpoint cannot express runs as an
//! in-memory predicate over the fetched rows. Scope precedence is
//! account, then category, then payee, then the whole budget.

use crate::client::{TransactionQuery, YnabClient};
use crate::error::YnabError;
use crate::models::TransactionDetail;

/// Where transaction listings come from.
///
/// Implemented by the API client; tests substitute a canned source.
pub(crate) trait TransactionSource {
    /// Lists transactions across the whole budget.
    async fn budget_transactions(
        &self,
        budget_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError>;

    /// Lists transactions scoped to one account.
    async fn account_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError>;

    /// Lists transactions scoped to one category.
    async fn category_transactions(
        &self,
        budget_id: &str,
        category_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError>;

    /// Lists transactions scoped to one payee.
    async fn payee_transactions(
        &self,
        budget_id: &str,
        payee_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError>;
}

impl TransactionSource for YnabClient {
    async fn budget_transactions(
        &self,
        budget_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        self.get_transactions(budget_id, query).await
    }

    async fn account_transactions(
        &self,
        budget_id: &str,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        self.get_account_transactions(budget_id, account_id, query)
            .await
    }

    async fn category_transactions(
        &self,
        budget_id: &str,
        category_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        self.get_category_transactions(budget_id, category_id, query)
            .await
    }

    async fn payee_transactions(
        &self,
        budget_id: &str,
        payee_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>, YnabError> {
        self.get_payee_transactions(budget_id, payee_id, query).await
    }
}

/// Compound filter over a budget's transactions.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    /// Budget to list from; may be the `last-used` sentinel.
    pub(crate) budget_id: String,
    /// Restrict to one account.
    pub(crate) account_id: Option<String>,
    /// Restrict to one category.
    pub(crate) category_id: Option<String>,
    /// Restrict to these payees; empty means no payee restriction.
    pub(crate) payee_ids: Vec<String>,
    /// Only include transactions on or after this `YYYY-MM-DD` date.
    pub(crate) since_date: Option<String>,
    /// Restrict to `uncategorized` or `unapproved` transactions.
    pub(crate) transaction_type: Option<String>,
    /// Keep only transactions with blank memos (`true`) or with text (`false`).
    pub(crate) empty_memo: Option<bool>,
}

impl TransactionFilter {
    /// The server-side portion of the filter.
    fn query(&self) -> TransactionQuery {
        TransactionQuery {
            since_date: self.since_date.clone(),
            transaction_type: self.transaction_type.clone(),
        }
    }

    /// Whether this filter resolves through the category endpoint with the
    /// payee predicate applied in memory afterwards.
    pub(crate) fn narrows_category_then_payee(&self) -> bool {
        self.account_id.is_none() && self.category_id.is_some() && !self.payee_ids.is_empty()
    }
}

/// Fetches transactions through the narrowest endpoint the filter allows,
/// then applies the remaining predicates in memory.
///
/// With several payees and no narrower scope, the payee endpoint is
/// queried once per payee in input order and the results concatenated
/// without deduplication.
#[allow(
    clippy::future_not_send,
    reason = "send-ness follows the source implementation; the live client yields Send futures"
)]
pub(crate) async fn fetch_transactions<S: TransactionSource>(
    source: &S,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionDetail>, YnabError> {
    let query = filter.query();
    let budget_id = filter.budget_id.as_str();

    let mut transactions = match (filter.account_id.as_deref(), filter.category_id.as_deref()) {
        (Some(account_id), category_id) => {
            let rows = source
                .account_transactions(budget_id, account_id, &query)
                .await?;
            retain_category(retain_payees(rows, &filter.payee_ids), category_id)
        }
        (None, Some(category_id)) => {
            let rows = source
                .category_transactions(budget_id, category_id, &query)
                .await?;
            retain_payees(rows, &filter.payee_ids)
        }
        (None, None) if filter.payee_ids.is_empty() => {
            source.budget_transactions(budget_id, &query).await?
        }
        (None, None) => {
            let mut rows = Vec::new();
            for payee_id in &filter.payee_ids {
                rows.extend(
                    source
                        .payee_transactions(budget_id, payee_id, &query)
                        .await?,
                );
            }
            rows
        }
    };

    if let Some(wants_empty) = filter.empty_memo {
        transactions
            .retain(|transaction| is_memo_empty(transaction.memo.as_deref()) == wants_empty);
    }
    Ok(transactions)
}

/// Keeps only transactions whose payee is one of `payee_ids`.
///
/// An empty list means no restriction.
fn retain_payees(mut rows: Vec<TransactionDetail>, payee_ids: &[String]) -> Vec<TransactionDetail> {
    if !payee_ids.is_empty() {
        rows.retain(|transaction| {
            transaction
                .payee_id
                .as_deref()
                .is_some_and(|payee_id| payee_ids.iter().any(|wanted| wanted == payee_id))
        });
    }
    rows
}

/// Keeps only transactions in the given category.
fn retain_category(
    mut rows: Vec<TransactionDetail>,
    category_id: Option<&str>,
) -> Vec<TransactionDetail> {
    if let Some(wanted) = category_id {
        rows.retain(|transaction| transaction.category_id.as_deref() == Some(wanted));
    }
    rows
}

/// Whether a memo is missing, empty, or only whitespace.
pub(crate) fn is_memo_empty(memo: Option<&str>) -> bool {
    memo.is_none_or(|text| text.trim().is_empty())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    clippy::unused_async,
    reason = "test code uses expect for readability and a canned async source"
)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{TransactionFilter, TransactionSource, fetch_transactions, is_memo_empty};
    use crate::client::TransactionQuery;
    use crate::error::YnabError;
    use crate::models::{ClearedStatus, TransactionDetail};

    struct StubSource {
        rows: HashMap<String, Vec<TransactionDetail>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                rows: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with(mut self, endpoint: &str, rows: Vec<TransactionDetail>) -> Self {
            let _previous = self.rows.insert(endpoint.to_owned(), rows);
            self
        }

        fn record(&self, endpoint: String) -> Vec<TransactionDetail> {
            self.calls.lock().expect("record call").push(endpoint.clone());
            self.rows.get(&endpoint).cloned().unwrap_or_default()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("list calls").clone()
        }
    }

    impl TransactionSource for StubSource {
        async fn budget_transactions(
            &self,
            budget_id: &str,
            _query: &TransactionQuery,
        ) -> Result<Vec<TransactionDetail>, YnabError> {
            Ok(self.record(format!("budget:{budget_id}")))
        }

        async fn account_transactions(
            &self,
            _budget_id: &str,
            account_id: &str,
            _query: &TransactionQuery,
        ) -> Result<Vec<TransactionDetail>, YnabError> {
            Ok(self.record(format!("account:{account_id}")))
        }

        async fn category_transactions(
            &self,
            _budget_id: &str,
            category_id: &str,
            _query: &TransactionQuery,
        ) -> Result<Vec<TransactionDetail>, YnabError> {
            Ok(self.record(format!("category:{category_id}")))
        }

        async fn payee_transactions(
            &self,
            _budget_id: &str,
            payee_id: &str,
            _query: &TransactionQuery,
        ) -> Result<Vec<TransactionDetail>, YnabError> {
            Ok(self.record(format!("payee:{payee_id}")))
        }
    }

    fn row(
        id: &str,
        payee_id: Option<&str>,
        category_id: Option<&str>,
        memo: Option<&str>,
    ) -> TransactionDetail {
        TransactionDetail {
            id: id.to_owned(),
            date: "2024-06-01".to_owned(),
            amount: -1_000,
            memo: memo.map(str::to_owned),
            cleared: ClearedStatus::Cleared,
            approved: true,
            flag_color: None,
            account_id: "a1".to_owned(),
            account_name: "Checking".to_owned(),
            payee_id: payee_id.map(str::to_owned),
            payee_name: None,
            category_id: category_id.map(str::to_owned),
            category_name: None,
            transfer_account_id: None,
            transfer_transaction_id: None,
            subtransactions: Vec::new(),
            deleted: false,
        }
    }

    fn unscoped(budget_id: &str) -> TransactionFilter {
        TransactionFilter {
            budget_id: budget_id.to_owned(),
            ..TransactionFilter::default()
        }
    }

    #[tokio::test]
    async fn account_scope_wins_and_narrows_the_rest_in_memory() {
        let source = StubSource::new().with(
            "account:a1",
            vec![
                row("t1", Some("p1"), Some("c1"), None),
                row("t2", Some("p2"), Some("c1"), None),
                row("t3", Some("p1"), Some("c2"), None),
            ],
        );
        let filter = TransactionFilter {
            account_id: Some("a1".to_owned()),
            category_id: Some("c1".to_owned()),
            payee_ids: vec!["p1".to_owned()],
            ..unscoped("b1")
        };

        let rows = fetch_transactions(&source, &filter)
            .await
            .expect("fetch rows");

        assert_eq!(source.calls(), vec!["account:a1".to_owned()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|r| r.id.as_str()), Some("t1"));
    }

    #[tokio::test]
    async fn category_with_payees_queries_the_category_endpoint_once() {
        let source = StubSource::new().with(
            "category:c1",
            vec![
                row("t1", Some("p1"), Some("c1"), None),
                row("t2", Some("p3"), Some("c1"), None),
                row("t3", None, Some("c1"), None),
            ],
        );
        let filter = TransactionFilter {
            category_id: Some("c1".to_owned()),
            payee_ids: vec!["p1".to_owned(), "p2".to_owned()],
            ..unscoped("b1")
        };
        assert!(filter.narrows_category_then_payee());

        let rows = fetch_transactions(&source, &filter)
            .await
            .expect("fetch rows");

        assert_eq!(source.calls(), vec!["category:c1".to_owned()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|r| r.id.as_str()), Some("t1"));
    }

    #[tokio::test]
    async fn multiple_payees_fetch_in_order_without_deduplication() {
        let shared = row("t1", Some("p1"), None, None);
        let source = StubSource::new()
            .with("payee:p1", vec![shared.clone()])
            .with(
                "payee:p2",
                vec![shared, row("t2", Some("p2"), None, None)],
            );
        let filter = TransactionFilter {
            payee_ids: vec!["p1".to_owned(), "p2".to_owned()],
            ..unscoped("b1")
        };
        assert!(!filter.narrows_category_then_payee());

        let rows = fetch_transactions(&source, &filter)
            .await
            .expect("fetch rows");

        assert_eq!(
            source.calls(),
            vec!["payee:p1".to_owned(), "payee:p2".to_owned()]
        );
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t1", "t2"]);
    }

    #[tokio::test]
    async fn unscoped_filter_uses_the_budget_endpoint() {
        let source = StubSource::new().with("budget:b1", vec![row("t1", None, None, None)]);

        let rows = fetch_transactions(&source, &unscoped("b1"))
            .await
            .expect("fetch rows");

        assert_eq!(source.calls(), vec!["budget:b1".to_owned()]);
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn empty_memo_filter_splits_blank_from_text() {
        let rows = vec![
            row("t1", None, None, None),
            row("t2", None, None, Some("   ")),
            row("t3", None, None, Some("paid rent")),
        ];
        let source = StubSource::new().with("budget:b1", rows.clone());
        let blank_filter = TransactionFilter {
            empty_memo: Some(true),
            ..unscoped("b1")
        };

        let blank = fetch_transactions(&source, &blank_filter)
            .await
            .expect("fetch rows");
        let blank_ids: Vec<&str> = blank.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(blank_ids, vec!["t1", "t2"]);

        let text_source = StubSource::new().with("budget:b1", rows);
        let text_filter = TransactionFilter {
            empty_memo: Some(false),
            ..unscoped("b1")
        };
        let text = fetch_transactions(&text_source, &text_filter)
            .await
            .expect("fetch rows");
        let text_ids: Vec<&str> = text.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(text_ids, vec!["t3"]);
    }

    #[test]
    fn memo_emptiness_covers_missing_blank_and_text() {
        assert!(is_memo_empty(None));
        assert!(is_memo_empty(Some("")));
        assert!(is_memo_empty(Some("   ")));
        assert!(!is_memo_empty(Some("paid rent")));
        assert!(!is_memo_empty(Some(" x ")));
    }
}
