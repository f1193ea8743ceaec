//! Display formatting for P&L figures on the calendar and the share card.

use crate::services::stats_service::StatsService;

/// Format a P&L value with its sign and currency symbol.
///
/// - zero is shown bare: `₱0`
/// - magnitudes of 1000 and above are abbreviated to thousands with one
///   decimal (`+₱1.5K`), dropping the decimal when the value is a whole
///   number of thousands (`+₱2K`)
/// - anything smaller gets two decimals with thousands separators (`+₱42.50`)
///
/// The value is rounded to cents before any of these rules apply, so
/// `0.004` is `₱0` and `999.996` is `+₱1K`. Positive values carry `+`,
/// negative values carry `-`.
pub fn format_pnl(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{symbol}0");
    }
    let value = StatsService::round_cents(value);
    if value == 0.0 {
        return format!("{symbol}0");
    }

    let sign = if value > 0.0 { "+" } else { "-" };
    let abs = value.abs();

    let body = if abs >= 1000.0 {
        let thousands = abs / 1000.0;
        if abs % 1000.0 == 0.0 {
            format!("{}K", group_thousands(&format!("{thousands:.0}")))
        } else {
            format!("{}K", group_thousands(&format!("{thousands:.1}")))
        }
    } else {
        group_thousands(&format!("{abs:.2}"))
    };

    format!("{sign}{symbol}{body}")
}

/// Win rate as shown on the card: one decimal and a percent sign.
pub fn format_win_rate(win_rate: f64) -> String {
    format!("{win_rate:.1}%")
}

/// Insert `,` between groups of three digits in the integer part of a
/// plain decimal string ("1234567.89" → "1,234,567.89").
pub fn group_thousands(number: &str) -> String {
    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(number.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
