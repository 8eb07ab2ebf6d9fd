//! Environment-sourced settings and the built-in schedule table.
//!
//! Required variables are checked once at startup; a missing one is a fatal
//! error and the process must not come up without it.

use crate::error::{ReportError, Result};
use chrono_tz::Tz;
use std::env;

/// All schedules fire in this zone; it is a deployment property of the
/// business, not of the host.
pub const REPORT_TIMEZONE: Tz = chrono_tz::Asia::Dhaka;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_USDT_RATE: f64 = 125.56;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram bot token.
    pub bot_token: String,
    /// Firestore project the collections live in.
    pub firestore_project_id: String,
    /// Firestore REST API key.
    pub firestore_api_key: String,
    /// Listen port for the liveness endpoint.
    pub port: u16,
    /// Fixed BDT-per-USDT rate. Deploy-time constant, not fetched live;
    /// staleness is a known, accepted risk.
    pub usdt_rate: f64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            firestore_project_id: required("FIRESTORE_PROJECT_ID")?,
            firestore_api_key: required("FIRESTORE_API_KEY")?,
            port: parsed_or("PORT", DEFAULT_PORT)?,
            usdt_rate: parsed_or("USDT_RATE", DEFAULT_USDT_RATE)?,
        })
    }
}

/// Which period policy a full report resolves its window with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// Trailing 7 calendar days ending today.
    TrailingWeek,
    /// The Saturday-to-Friday week containing today.
    SaturdayWeek,
}

/// What one trigger produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Turnover totals for the resolved window plus the balance.
    Full(WindowPolicy),
    /// Balance line only; no window, no aggregation.
    BalanceOnly,
}

/// One cron trigger and how its run renders.
#[derive(Debug, Clone)]
pub struct ScheduleSpec {
    pub name: &'static str,
    /// Seconds-resolution cron expression, evaluated in [`REPORT_TIMEZONE`].
    pub cron_expr: &'static str,
    pub kind: ReportKind,
    /// Sign convention for the displayed balance on this schedule.
    pub negate_balance_display: bool,
}

/// The dual-schedule deployment: a full digest at noon and a balance check
/// in the evening. A single-schedule deployment is this table with one row.
pub fn default_schedules() -> Vec<ScheduleSpec> {
    vec![
        ScheduleSpec {
            name: "daily-full-report",
            cron_expr: "0 0 12 * * *",
            kind: ReportKind::Full(WindowPolicy::TrailingWeek),
            negate_balance_display: true,
        },
        ScheduleSpec {
            name: "evening-balance-check",
            cron_expr: "0 0 20 * * *",
            kind: ReportKind::BalanceOnly,
            negate_balance_display: true,
        },
    ]
}

fn required(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ReportError::MissingConfig(name)),
    }
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ReportError::InvalidConfig {
                name,
                details: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}
