//! # Balance Digest
//!
//! A resident reporting service: on fixed Dhaka-local cron triggers it reads
//! per-manager balances and approved transaction totals from a Firestore
//! document store, converts figures to USDT at a fixed rate, and pushes
//! formatted digests to each manager's Telegram chat.
//!
//! ## Core concepts
//!
//! - **Manager**: one payment method's operator, holding a balance and a
//!   chat destination. Skipped entirely when either routing field is absent.
//! - **Reporting window**: an inclusive interval, either the trailing 7
//!   calendar days or the Saturday-to-Friday week containing "now".
//! - **Window stats**: approved deposit and withdrawal totals for one method
//!   inside one window, recomputed from the store on every run.
//! - **Schedule**: a cron trigger paired with a report variant (full digest
//!   or balance-only) and a balance sign convention.
//!
//! Runs hold no state between firings; everything is re-fetched. A failed
//! store query degrades its sum to zero, a failed delivery is logged and
//! counted, and neither aborts the remaining managers.

pub mod config;
pub mod error;
pub mod format;
pub mod health;
pub mod notify;
pub mod period;
pub mod report;
pub mod scheduler;
pub mod schema;
pub mod stats;
pub mod store;

pub use config::{default_schedules, ReportKind, ScheduleSpec, Settings, WindowPolicy};
pub use error::{ReportError, Result};
pub use format::{format_date, format_money};
pub use notify::{Notifier, TelegramNotifier};
pub use period::{saturday_week, trailing_week, ReportingWindow};
pub use report::{compose_balance_only, compose_full, ReportStyle};
pub use scheduler::{ReportJob, RunSummary, Scheduler};
pub use schema::{Manager, TransactionKind, TransactionRecord};
pub use stats::{aggregate, WindowStats};
pub use store::{FirestoreStore, RecordStore};
