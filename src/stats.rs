//! Approved-transaction aggregation over a reporting window.

use crate::period::ReportingWindow;
use crate::schema::TransactionKind;
use crate::store::RecordStore;
use chrono::Utc;
use log::warn;

/// Accumulated approved totals for one payment method and one window.
/// Computed fresh on every call; never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowStats {
    pub deposit_total: f64,
    pub withdraw_total: f64,
}

/// Sums approved deposit and withdrawal amounts for `method` that fall
/// inside `window` (inclusive at both bounds).
///
/// The two collections are queried independently; a failed query logs and
/// contributes zero so one bad read degrades the report instead of killing
/// the run. Records without a usable timestamp count as occurring "now".
pub async fn aggregate<S: RecordStore>(
    store: &S,
    method: &str,
    window: ReportingWindow,
) -> WindowStats {
    WindowStats {
        deposit_total: sum_collection(store, TransactionKind::Deposit, method, window).await,
        withdraw_total: sum_collection(store, TransactionKind::Withdraw, method, window).await,
    }
}

async fn sum_collection<S: RecordStore>(
    store: &S,
    kind: TransactionKind,
    method: &str,
    window: ReportingWindow,
) -> f64 {
    let records = match store.approved_transactions(kind, method).await {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "Query of {} for method {} failed, counting zero: {}",
                kind.collection(),
                method,
                err
            );
            return 0.0;
        }
    };

    let now = Utc::now();
    // `Sum for f64` folds from -0.0, so an empty contribution would render
    // as "-0,00"; fold from +0.0 to keep the documented plain-zero total.
    records
        .iter()
        .filter(|record| window.contains(record.occurred_at(now)))
        .map(|record| record.amount)
        .fold(0.0, |total, amount| total + amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, Result};
    use crate::schema::{Manager, TransactionRecord};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct FakeStore {
        deposits: Vec<TransactionRecord>,
        withdrawals: Vec<TransactionRecord>,
        fail_withdrawals: bool,
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn fetch_managers(&self) -> Result<Vec<Manager>> {
            Ok(Vec::new())
        }

        async fn approved_transactions(
            &self,
            kind: TransactionKind,
            method: &str,
        ) -> Result<Vec<TransactionRecord>> {
            match kind {
                TransactionKind::Deposit => Ok(filtered(&self.deposits, method)),
                TransactionKind::Withdraw => {
                    if self.fail_withdrawals {
                        Err(ReportError::StoreError("simulated outage".to_string()))
                    } else {
                        Ok(filtered(&self.withdrawals, method))
                    }
                }
            }
        }
    }

    fn filtered(records: &[TransactionRecord], method: &str) -> Vec<TransactionRecord> {
        records
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    fn record(method: &str, amount: f64, at: Option<DateTime<Utc>>) -> TransactionRecord {
        TransactionRecord {
            method: method.to_string(),
            status: "approved".to_string(),
            amount,
            created_at: at,
        }
    }

    fn window() -> ReportingWindow {
        ReportingWindow {
            start: Utc.with_ymd_and_hms(2024, 6, 9, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_sums_only_records_inside_the_window() {
        let w = window();
        let store = FakeStore {
            deposits: vec![
                record("bKash", 1000.0, Some(w.start + Duration::hours(5))),
                record("bKash", 300.0, Some(w.start - Duration::seconds(1))),
                record("bKash", 50.0, Some(w.end + Duration::seconds(1))),
            ],
            withdrawals: vec![record("bKash", 200.0, Some(w.end - Duration::hours(1)))],
            fail_withdrawals: false,
        };

        let stats = aggregate(&store, "bKash", w).await;
        assert_eq!(stats.deposit_total, 1000.0);
        assert_eq!(stats.withdraw_total, 200.0);
    }

    #[tokio::test]
    async fn test_bounds_are_inclusive() {
        let w = window();
        let store = FakeStore {
            deposits: vec![
                record("bKash", 10.0, Some(w.start)),
                record("bKash", 20.0, Some(w.end)),
            ],
            withdrawals: vec![],
            fail_withdrawals: false,
        };

        let stats = aggregate(&store, "bKash", w).await;
        assert_eq!(stats.deposit_total, 30.0);
    }

    #[tokio::test]
    async fn test_missing_timestamp_counts_when_window_covers_now() {
        let now = Utc::now();
        let covers_now = ReportingWindow {
            start: now - Duration::days(6),
            end: now + Duration::hours(12),
        };
        let store = FakeStore {
            deposits: vec![record("bKash", 77.0, None)],
            withdrawals: vec![],
            fail_withdrawals: false,
        };

        let stats = aggregate(&store, "bKash", covers_now).await;
        assert_eq!(stats.deposit_total, 77.0);

        let past_only = ReportingWindow {
            start: now - Duration::days(14),
            end: now - Duration::days(7),
        };
        let stats = aggregate(&store, "bKash", past_only).await;
        assert_eq!(stats.deposit_total, 0.0);
    }

    #[tokio::test]
    async fn test_failed_query_degrades_to_zero() {
        let w = window();
        let store = FakeStore {
            deposits: vec![record("bKash", 500.0, Some(w.start + Duration::days(1)))],
            withdrawals: vec![record("bKash", 100.0, Some(w.start + Duration::days(1)))],
            fail_withdrawals: true,
        };

        let stats = aggregate(&store, "bKash", w).await;
        assert_eq!(stats.deposit_total, 500.0);
        assert_eq!(stats.withdraw_total, 0.0);
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let w = window();
        let store = FakeStore {
            deposits: vec![record("bKash", 250.0, Some(w.start + Duration::days(2)))],
            withdrawals: vec![record("bKash", 40.0, Some(w.start + Duration::days(3)))],
            fail_withdrawals: false,
        };

        let first = aggregate(&store, "bKash", w).await;
        let second = aggregate(&store, "bKash", w).await;
        assert_eq!(first, second);
    }
}
