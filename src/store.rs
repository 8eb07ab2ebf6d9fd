//! Document store access.
//!
//! The reporting core only sees the [`RecordStore`] trait; the production
//! implementation speaks the Firestore REST `runQuery` API. Firestore wraps
//! every field value in a typed envelope (`integerValue`, `doubleValue`,
//! `stringValue`, `timestampValue`), so decoding unwraps the envelope and
//! then applies the default rules from [`crate::schema`].

use crate::error::{ReportError, Result};
use crate::schema::{coerce_amount, Manager, TransactionKind, TransactionRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Map, Value};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Read-only access to the manager list and the two transaction collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The full manager list, in store order.
    async fn fetch_managers(&self) -> Result<Vec<Manager>>;

    /// All approved transactions of one kind for one payment method.
    /// Unbounded in time; window filtering happens in the aggregator so the
    /// missing-timestamp default stays observable.
    async fn approved_transactions(
        &self,
        kind: TransactionKind,
        method: &str,
    ) -> Result<Vec<TransactionRecord>>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn fetch_managers(&self) -> Result<Vec<Manager>> {
        (**self).fetch_managers().await
    }

    async fn approved_transactions(
        &self,
        kind: TransactionKind,
        method: &str,
    ) -> Result<Vec<TransactionRecord>> {
        (**self).approved_transactions(kind, method).await
    }
}

pub struct FirestoreStore {
    client: Client,
    project_id: String,
    api_key: String,
    base_url: String,
}

impl FirestoreStore {
    pub fn new(project_id: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            project_id,
            api_key,
            base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }

    async fn run_query(&self, query: Value) -> Result<Vec<Map<String, Value>>> {
        let url = format!(
            "{}/projects/{}/databases/(default)/documents:runQuery?key={}",
            self.base_url, self.project_id, self.api_key
        );

        let res = self
            .client
            .post(&url)
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ReportError::StoreError(format!(
                "runQuery returned status {}: {}",
                status, body
            )));
        }

        // The response is a stream of result entries; entries without a
        // "document" key (read times, partial progress) are skipped.
        let body: Vec<Value> = res.json().await?;
        let docs = body
            .into_iter()
            .filter_map(|entry| {
                entry
                    .get("document")
                    .and_then(|d| d.get("fields"))
                    .and_then(Value::as_object)
                    .cloned()
            })
            .collect();

        Ok(docs)
    }
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn fetch_managers(&self) -> Result<Vec<Manager>> {
        let query = json!({ "from": [{ "collectionId": "musers" }] });
        let docs = self.run_query(query).await?;
        Ok(docs.iter().map(decode_manager).collect())
    }

    async fn approved_transactions(
        &self,
        kind: TransactionKind,
        method: &str,
    ) -> Result<Vec<TransactionRecord>> {
        let query = json!({
            "from": [{ "collectionId": kind.collection() }],
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        equality_filter("method", method),
                        equality_filter("status", "approved"),
                    ]
                }
            }
        });
        let docs = self.run_query(query).await?;
        Ok(docs.iter().map(decode_transaction).collect())
    }
}

fn equality_filter(field: &str, value: &str) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": field },
            "op": "EQUAL",
            "value": { "stringValue": value }
        }
    })
}

fn decode_manager(fields: &Map<String, Value>) -> Manager {
    Manager {
        payment: decode_string(fields, "payment"),
        group_id: decode_string(fields, "groupId"),
        balance: coerce_amount(unwrap_value(fields, "balance")),
    }
}

fn decode_transaction(fields: &Map<String, Value>) -> TransactionRecord {
    TransactionRecord {
        method: decode_string(fields, "method").unwrap_or_default(),
        status: decode_string(fields, "status").unwrap_or_default(),
        amount: coerce_amount(unwrap_value(fields, "amount")),
        created_at: decode_timestamp(fields, "createdAt"),
    }
}

/// Strips the Firestore value envelope, returning the inner scalar.
fn unwrap_value<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let envelope = fields.get(name)?.as_object()?;
    envelope
        .get("integerValue")
        .or_else(|| envelope.get("doubleValue"))
        .or_else(|| envelope.get("stringValue"))
        .or_else(|| envelope.get("timestampValue"))
        .or_else(|| envelope.get("booleanValue"))
}

fn decode_string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match unwrap_value(fields, name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_timestamp(fields: &Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    let raw = unwrap_value(fields, name)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
