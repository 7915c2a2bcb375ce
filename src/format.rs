//! Display formatting: money, dates and month labels.
//!
//! These run only at render time. Aggregation works on `i64` cents and
//! `YYYY-MM` keys; nothing in this module feeds back into a sum or a
//! grouping key. None of the functions here panic on zero, negative or
//! missing input.

use crate::config::Locale;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

// ── Money ────────────────────────────────────────────────────────────────

/// Format integer cents as a currency string.
///
/// `En` → `$1,500.00`, `Es` → `$1.500,00`. Negative amounts get a leading `-`.
pub fn format_cents(cents: i64, locale: Locale) -> String {
    let (thousands, decimal) = match locale {
        Locale::En => (',', '.'),
        Locale::Es => ('.', ','),
    };
    let abs = cents.unsigned_abs();
    let units = abs / 100;
    let frac = abs % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}${grouped}{decimal}{frac:02}")
}

/// Format an optional amount; missing values render as zero.
pub fn format_opt_cents(cents: Option<i64>, locale: Locale) -> String {
    format_cents(cents.unwrap_or(0), locale)
}

/// Parse a decimal money string into cents without touching floats.
///
/// Accepts an optional sign and `$`, `,` thousands separators, and at most
/// two decimals after a `.`. Returns `None` for anything else.
pub fn parse_cents(raw: &str) -> Option<i64> {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    if s.is_empty() {
        return None;
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if frac.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
        || (whole.is_empty() && frac.is_empty())
    {
        return None;
    }

    let units: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut minor: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    if frac.len() == 1 {
        minor *= 10;
    }
    let cents = units.checked_mul(100)?.checked_add(minor)?;
    Some(if negative { -cents } else { cents })
}

// ── Dates ────────────────────────────────────────────────────────────────

/// Parse the date formats the data layer emits.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS[.fff]` and `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Format a date for a table cell.
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::Es => date.format("%d/%m/%Y").to_string(),
        Locale::En => date.format("%Y-%m-%d").to_string(),
    }
}

/// Format a raw record date, falling back to the raw text when unparsable.
pub fn format_raw_date(raw: &str, locale: Locale) -> String {
    match parse_date(raw) {
        Some(d) => format_date(d, locale),
        None if raw.trim().is_empty() => "-".to_string(),
        None => raw.trim().to_string(),
    }
}

// ── Month labels ─────────────────────────────────────────────────────────

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English → Spanish month names.
const MONTH_NAMES_ES: [(&str, &str); 12] = [
    ("January", "Enero"),
    ("February", "Febrero"),
    ("March", "Marzo"),
    ("April", "Abril"),
    ("May", "Mayo"),
    ("June", "Junio"),
    ("July", "Julio"),
    ("August", "Agosto"),
    ("September", "Septiembre"),
    ("October", "Octubre"),
    ("November", "Noviembre"),
    ("December", "Diciembre"),
];

/// Replace an English month name with the target-locale name.
///
/// Unknown names pass through unchanged.
pub fn localize_month(name: &str, locale: Locale) -> &str {
    match locale {
        Locale::En => name,
        Locale::Es => MONTH_NAMES_ES
            .iter()
            .find(|(en, _)| *en == name)
            .map(|(_, es)| *es)
            .unwrap_or(name),
    }
}

/// Render a `YYYY-MM` grouping key as `"<Month> <YYYY>"`.
///
/// The key itself is never altered; malformed keys are returned verbatim.
pub fn month_label(key: &str, locale: Locale) -> String {
    let Some((year, month)) = key.split_once('-') else {
        return key.to_string();
    };
    match month.parse::<usize>() {
        Ok(m) if (1..=12).contains(&m) && year.len() == 4 => {
            format!("{} {}", localize_month(MONTHS_EN[m - 1], locale), year)
        }
        _ => key.to_string(),
    }
}

// ── Text ─────────────────────────────────────────────────────────────────

/// Truncate to `budget` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= budget {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(budget).collect();
    format!("{}...", cut.trim_end())
}
