//! Human-readable number formatting for dashboard tiles

const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;
const THOUSAND: f64 = 1_000.0;

const NOT_AVAILABLE: &str = "N/A";

/// Format a count: `1.2B`, `3.4M`, `12,345`, `42`
///
/// `None`, `NaN` and infinities render as `N/A`.
pub fn format_integer(count: Option<f64>) -> String {
    let Some(count) = finite(count) else {
        return NOT_AVAILABLE.to_string();
    };

    if count >= BILLION {
        format!("{:.1}B", count / BILLION)
    } else if count >= MILLION {
        format!("{:.1}M", count / MILLION)
    } else if count >= THOUSAND {
        group_thousands(count)
    } else {
        plain(count)
    }
}

/// Format an amount with two decimals: `$1.50K`, `2.50M`, `0.75`
pub fn format_float(value: Option<f64>, currency_symbol: &str) -> String {
    let Some(value) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };

    if value >= BILLION {
        format!("{currency_symbol}{:.2}B", value / BILLION)
    } else if value >= MILLION {
        format!("{currency_symbol}{:.2}M", value / MILLION)
    } else if value >= THOUSAND {
        format!("{currency_symbol}{:.2}K", value / THOUSAND)
    } else {
        format!("{currency_symbol}{value:.2}")
    }
}

/// Format a token usage count, same tiers as [`format_integer`]
pub fn format_token_count(tokens: Option<f64>) -> String {
    format_integer(tokens)
}

/// Format a cost in dollars, same tiers as [`format_float`]
pub fn format_cost(cost: Option<f64>) -> String {
    format_float(cost, "$")
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn plain(value: f64) -> String {
    // -0 prints as "0"
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// en-US grouping with at most three fraction digits, trailing zeros trimmed
fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (index, ch) in int_part.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut out: String = grouped.chars().rev().collect();

    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
