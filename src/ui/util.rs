use rust_decimal::Decimal;

use crate::config::Currency;

/// Format an amount with thousand separators in the configured currency.
/// e.g. `1234567` → `"¥1,234,567"`
pub(crate) fn format_amount(val: Decimal, currency: &Currency) -> String {
    let rounded = val.abs().round_dp(currency.decimals);
    let formatted = format!("{:.*}", currency.decimals as usize, rounded);
    let (int_part, dec_part) = match formatted.split_once('.') {
        Some((int_part, dec_part)) => (int_part, Some(dec_part)),
        None => (formatted.as_str(), None),
    };

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let sign = if val < Decimal::ZERO && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let symbol = &currency.symbol;
    match dec_part {
        Some(dec_part) => format!("{sign}{symbol}{with_commas}.{dec_part}"),
        None => format!("{sign}{symbol}{with_commas}"),
    }
}

/// One decimal place, e.g. `60.0%`.
pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{:.1}%", val.round_dp(1))
}

/// Signed percentage for changes, e.g. `+12.5%` / `-3.0%`.
pub(crate) fn format_change(val: Decimal) -> String {
    if val > Decimal::ZERO {
        format!("+{}", format_percent(val))
    } else {
        format_percent(val)
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}
