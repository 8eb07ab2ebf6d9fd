//! Display formatting for currency amounts and dates.
//!
//! Amounts render with two decimals, a comma decimal separator, and spaces
//! grouping the integer digits in threes: `1234567.89` → `"1 234 567,89"`.
//! Dates render as zero-padded `DD.MM.YYYY`.

use chrono::{DateTime, Datelike, TimeZone};

pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };

    // "{:.2}" always yields exactly one '.' with two digits after it.
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }

    format!("{}{},{}", sign, grouped, frac_part)
}

pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format!(
        "{:02}.{:02}.{:04}",
        date.day(),
        date.month(),
        date.year()
    )
}
