//! Numeric view of reported amount ranges.
//!
//! Amounts stay display strings on the record; these helpers re-parse them
//! for consumers that need bounds or a compact rendering.

/// Parsed bounds of an amount string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBounds {
    /// `$low - $high`.
    Range { low: u64, high: u64 },
    /// A single value.
    Exact(u64),
    /// `Over $n`.
    Over(u64),
    /// `Under $n`.
    Under(u64),
}

impl AmountBounds {
    /// Parse an amount string such as `$15,001 - $50,000`, `$1,001-$15,000`,
    /// `Over $50,000,000` or `$1,000`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix("Over") {
            return parse_dollars(rest).map(AmountBounds::Over);
        }
        if let Some(rest) = text.strip_prefix("Under") {
            return parse_dollars(rest).map(AmountBounds::Under);
        }
        match text.split_once('-') {
            Some((low, high)) => {
                let low = parse_dollars(low)?;
                let high = parse_dollars(high)?;
                Some(AmountBounds::Range { low, high })
            }
            None => parse_dollars(text).map(AmountBounds::Exact),
        }
    }

    /// Lower bound in dollars.
    pub fn low(&self) -> u64 {
        match *self {
            AmountBounds::Range { low, .. } => low,
            AmountBounds::Exact(v) | AmountBounds::Over(v) => v,
            AmountBounds::Under(_) => 0,
        }
    }

    /// Upper bound in dollars, if bounded.
    pub fn high(&self) -> Option<u64> {
        match *self {
            AmountBounds::Range { high, .. } => Some(high),
            AmountBounds::Exact(v) | AmountBounds::Under(v) => Some(v),
            AmountBounds::Over(_) => None,
        }
    }
}

fn parse_dollars(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|&c| c != ',')
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn short(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{}M", value / 1_000_000)
    } else if value >= 1_000 {
        format!("{}K", value / 1_000)
    } else {
        value.to_string()
    }
}

/// Render a range like `$1,000,001 - $5,000,000` as `$1M-$5M`.
///
/// Anything that is not a two-sided range is returned unchanged.
pub fn compact_amount(amount: &str) -> String {
    match AmountBounds::parse(amount) {
        Some(AmountBounds::Range { low, high }) => format!("${}-${}", short(low), short(high)),
        _ => amount.to_string(),
    }
}
