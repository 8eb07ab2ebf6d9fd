//! Report message composition.
//!
//! Pure string construction; messages carry Telegram HTML markup and every
//! amount is shown in BDT with the USDT equivalent at a fixed deploy-time
//! rate alongside.

use crate::format::{format_date, format_money};
use crate::period::ReportingWindow;
use crate::stats::WindowStats;
use chrono_tz::Tz;

/// Rendering knobs shared by both report variants.
#[derive(Debug, Clone, Copy)]
pub struct ReportStyle {
    /// Fixed BDT-per-USDT conversion rate.
    pub usdt_rate: f64,
    /// When set, the displayed balance is arithmetically negated. The two
    /// production schedules historically disagreed on this sign; it is an
    /// explicit flag until stakeholders confirm a single convention.
    pub negate_balance_display: bool,
    /// Zone the window dates are rendered in.
    pub timezone: Tz,
}

/// Full digest: window dates, deposit and withdrawal turnover, and balance.
pub fn compose_full(
    style: &ReportStyle,
    method: &str,
    window: &ReportingWindow,
    stats: &WindowStats,
    balance: f64,
) -> String {
    let start = window.start.with_timezone(&style.timezone);
    let end = window.end.with_timezone(&style.timezone);

    let mut msg = String::from("Daily Report\n");
    msg.push_str(&format!("<b>{}</b>\n", method));
    msg.push_str(&format!(
        "{} - {} (Last 7 Days)\n",
        format_date(&start),
        format_date(&end)
    ));
    msg.push_str(&format!(
        "Payment (7d) = {}\n",
        dual_currency(style, stats.deposit_total)
    ));
    msg.push_str(&format!(
        "Withdrawal (7d) = {}\n",
        dual_currency(style, stats.withdraw_total)
    ));
    msg.push_str(&format!("Balance (full) = {}\n", balance_line(style, balance)));
    msg
}

/// Short digest: method label and balance only.
pub fn compose_balance_only(style: &ReportStyle, method: &str, balance: f64) -> String {
    format!(
        "Balance Report\n{}\nBalance (full) = {}",
        method,
        balance_line(style, balance)
    )
}

fn balance_line(style: &ReportStyle, balance: f64) -> String {
    let shown = if style.negate_balance_display {
        -balance
    } else {
        balance
    };
    dual_currency(style, shown)
}

fn dual_currency(style: &ReportStyle, bdt: f64) -> String {
    let usdt = bdt / style.usdt_rate;
    format!("{} BDT ({} USDT)", format_money(bdt), format_money(usdt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn style(negate: bool) -> ReportStyle {
        ReportStyle {
            usdt_rate: 125.56,
            negate_balance_display: negate,
            timezone: chrono_tz::Asia::Dhaka,
        }
    }

    fn window() -> ReportingWindow {
        // 09.06.2024 .. 15.06.2024 in Dhaka local time.
        ReportingWindow {
            start: Utc.with_ymd_and_hms(2024, 6, 8, 18, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 15, 17, 59, 59).unwrap(),
        }
    }

    #[test]
    fn test_full_report_lines() {
        let stats = WindowStats {
            deposit_total: 1000.0,
            withdraw_total: 200.0,
        };
        let msg = compose_full(&style(false), "bKash", &window(), &stats, 5000.0);

        assert!(msg.contains("<b>bKash</b>"));
        assert!(msg.contains("09.06.2024 - 15.06.2024 (Last 7 Days)"));
        assert!(msg.contains("Payment (7d) = 1 000,00 BDT (7,96 USDT)"));
        assert!(msg.contains("Withdrawal (7d) = 200,00 BDT (1,59 USDT)"));
        assert!(msg.contains("Balance (full) = 5 000,00 BDT (39,82 USDT)"));
    }

    #[test]
    fn test_negated_balance_display() {
        let stats = WindowStats::default();
        let msg = compose_full(&style(true), "Nagad", &window(), &stats, 5000.0);
        assert!(msg.contains("Balance (full) = -5 000,00 BDT (-39,82 USDT)"));

        let short = compose_balance_only(&style(true), "Nagad", 5000.0);
        assert!(short.contains("Balance (full) = -5 000,00 BDT (-39,82 USDT)"));
    }

    #[test]
    fn test_balance_only_report_shape() {
        let msg = compose_balance_only(&style(false), "Rocket", 0.0);
        assert_eq!(
            msg,
            "Balance Report\nRocket\nBalance (full) = 0,00 BDT (0,00 USDT)"
        );
    }
}
