//! Record shapes read from the document store.
//!
//! The store is schemaless, so every field is validated at this boundary:
//! amounts coerce to `f64` with a zero default, and a missing or unparseable
//! timestamp is kept as `None` and treated as "now" at aggregation time.
//! That default means such a record falls inside any window that ends at or
//! after the moment of aggregation and can be over-counted; this mirrors the
//! system of record and must not be changed without a requirements decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One payment method's operator: where its digest goes and what it holds.
///
/// Read-only here; the balance is mutated by an external process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manager {
    /// Payment method label, e.g. "bKash". Absent means the record is
    /// incomplete and the manager is skipped.
    pub payment: Option<String>,
    /// Chat destination identifier. Absent means skip.
    pub group_id: Option<String>,
    /// Signed current balance in BDT, store of record.
    #[serde(default)]
    pub balance: f64,
}

impl Manager {
    /// A manager participates in a run only with both routing fields present.
    pub fn routing(&self) -> Option<(&str, &str)> {
        match (self.payment.as_deref(), self.group_id.as_deref()) {
            (Some(method), Some(group)) if !method.is_empty() && !group.is_empty() => {
                Some((method, group))
            }
            _ => None,
        }
    }
}

/// Which transaction collection a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub fn collection(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "depositRequests",
            TransactionKind::Withdraw => "withdrawRequests",
        }
    }
}

/// A deposit or withdrawal request as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub method: String,
    pub status: String,
    #[serde(default)]
    pub amount: f64,
    /// `None` when the stored timestamp is missing or unparseable.
    pub created_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// The instant this record occurred at, defaulting to `now` when the
    /// stored timestamp was unusable.
    pub fn occurred_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.created_at.unwrap_or(now)
    }
}

/// Numeric coercion with a zero default, the store-wide rule for amounts.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
