use chrono::{DateTime, Utc};

/// Placeholder shown for any absent value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an optional number with a fixed number of decimals, or `N/A`
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format an optional rate as `12.5%`, or `N/A`
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Insert thousands separators: 1234567 -> "1,234,567"
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_population(value: Option<u64>) -> String {
    value
        .map(format_thousands)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format an income in whole dollars: `$52,341`, or `$N/A`
pub fn format_income(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 0.0 => format!("${}", format_thousands(v.round() as u64)),
        Some(v) => format!("-${}", format_thousands((-v).round() as u64)),
        None => format!("${}", NOT_AVAILABLE),
    }
}

/// Format the Republican vote margin as `R+44.2%`, or `N/A`
pub fn format_margin(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("R+{:.1}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Human-readable age of a timestamp ("just now", "5m ago", "2h ago", "3d ago")
pub fn age_display(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew (negative ages)
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
