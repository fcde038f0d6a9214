//! Core data types for PTR trade extraction.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel rendered for any field that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Rendering of a ticker for instruments that have none.
pub const NOT_APPLICABLE: &str = "N/A";

/// Maximum ticker symbol length.
pub const MAX_SYMBOL_LEN: usize = 5;

/// A single line of document text with its position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// 0-based index within the document's line sequence.
    pub index: usize,
    /// Line text, untouched.
    pub text: &'a str,
}

impl<'a> RawLine<'a> {
    /// Pair every line of a document with its index.
    pub fn enumerate<S: AsRef<str> + 'a>(lines: &'a [S]) -> impl Iterator<Item = RawLine<'a>> + 'a {
        lines.iter().enumerate().map(|(index, text)| RawLine {
            index,
            text: text.as_ref(),
        })
    }
}

/// Instrument kind of a reported trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    /// Common stock, ETF or fund.
    Stock,
    /// Call option.
    OptionCall,
    /// Put option.
    OptionPut,
}

impl TradeKind {
    /// Is this an option trade?
    #[inline]
    pub fn is_option(self) -> bool {
        matches!(self, TradeKind::OptionCall | TradeKind::OptionPut)
    }

    /// Storage / wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Stock => "stock",
            TradeKind::OptionCall => "option_call",
            TradeKind::OptionPut => "option_put",
        }
    }

    /// Parse the storage name back into a kind.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stock" => Some(TradeKind::Stock),
            "option_call" => Some(TradeKind::OptionCall),
            "option_put" => Some(TradeKind::OptionPut),
            _ => None,
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Direction of a reported trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    /// Purchase.
    Buy,
    /// Sale (full or partial).
    Sell,
}

impl TradeAction {
    /// Map a PTR transaction code (`P` / `S`, any case) to an action.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'P' => Some(TradeAction::Buy),
            'S' => Some(TradeAction::Sell),
            _ => None,
        }
    }

    /// Storage / display name.
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }

    /// Parse the storage name back into an action.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BUY" => Some(TradeAction::Buy),
            "SELL" => Some(TradeAction::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated ticker symbol: 1 to 5 uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Validate and wrap a symbol.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::validation("ticker symbol cannot be empty"));
        }
        if value.len() > MAX_SYMBOL_LEN {
            return Err(Error::validation(format!(
                "ticker symbol '{value}' exceeds {MAX_SYMBOL_LEN} characters"
            )));
        }
        if !value.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::validation(format!(
                "ticker symbol '{value}' must be uppercase letters"
            )));
        }
        Ok(Symbol(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ticker of a traded instrument.
///
/// `NotApplicable` means the instrument has no ticker at all (money market
/// funds, "other" asset codes); `Unknown` means one may exist but was not
/// found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Option<String>", try_from = "Option<String>")]
pub enum Ticker {
    Symbol(Symbol),
    NotApplicable,
    Unknown,
}

impl Ticker {
    /// Build a ticker from a symbol that the caller already matched as
    /// `[A-Z]{1,5}`; anything else degrades to `Unknown`.
    pub fn from_match(value: &str) -> Self {
        Symbol::new(value)
            .map(Ticker::Symbol)
            .unwrap_or(Ticker::Unknown)
    }

    /// The symbol, when one is known.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Ticker::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Storage value: symbol, `N/A`, or NULL for unknown.
    pub fn to_column(&self) -> Option<String> {
        match self {
            Ticker::Symbol(s) => Some(s.as_str().to_string()),
            Ticker::NotApplicable => Some(NOT_APPLICABLE.to_string()),
            Ticker::Unknown => None,
        }
    }

    /// Inverse of [`Ticker::to_column`].
    pub fn from_column(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(Ticker::Unknown),
            Some(NOT_APPLICABLE) => Ok(Ticker::NotApplicable),
            Some(s) => Symbol::new(s).map(Ticker::Symbol),
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ticker::Symbol(s) => f.write_str(s.as_str()),
            Ticker::NotApplicable => f.write_str(NOT_APPLICABLE),
            Ticker::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl From<Ticker> for Option<String> {
    fn from(ticker: Ticker) -> Self {
        ticker.to_column()
    }
}

impl TryFrom<Option<String>> for Ticker {
    type Error = Error;

    fn try_from(value: Option<String>) -> Result<Self> {
        Ticker::from_column(value.as_deref())
    }
}

/// A date as reported on the filing, or the unknown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TradeDate {
    Known(NaiveDate),
    Unknown,
}

impl TradeDate {
    /// Parse `M/D/YYYY` or `MM/DD/YYYY`. Calendar-invalid dates are unknown.
    pub fn parse_mdy(text: &str) -> Self {
        let mut parts = text.trim().splitn(3, '/');
        let (Some(m), Some(d), Some(y)) = (parts.next(), parts.next(), parts.next()) else {
            return TradeDate::Unknown;
        };
        match (m.parse::<u32>(), d.parse::<u32>(), y.parse::<i32>()) {
            (Ok(m), Ok(d), Ok(y)) => NaiveDate::from_ymd_opt(y, m, d)
                .map(TradeDate::Known)
                .unwrap_or(TradeDate::Unknown),
            _ => TradeDate::Unknown,
        }
    }

    /// Was a date resolved?
    pub fn is_known(&self) -> bool {
        matches!(self, TradeDate::Known(_))
    }

    /// Calendar date, for ordering; `None` when unknown.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TradeDate::Known(d) => Some(*d),
            TradeDate::Unknown => None,
        }
    }
}

impl fmt::Display for TradeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDate::Known(d) => write!(f, "{:02}/{:02}/{:04}", d.month(), d.day(), d.year()),
            TradeDate::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl From<TradeDate> for String {
    fn from(date: TradeDate) -> Self {
        date.to_string()
    }
}

impl From<String> for TradeDate {
    fn from(text: String) -> Self {
        TradeDate::parse_mdy(&text)
    }
}

/// One reportable transaction recovered from a PTR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Issuer / security name, trimmed and non-empty.
    pub asset_name: String,
    /// Ticker symbol or sentinel.
    pub ticker: Ticker,
    /// Stock or option kind.
    pub kind: TradeKind,
    /// Buy or sell.
    pub action: TradeAction,
    /// Normalized amount range for display, or `Unknown`.
    pub amount_range_raw: String,
    /// Date the transaction happened.
    pub transaction_date: TradeDate,
    /// Date the filer was notified (or the filing date on heuristic rows).
    pub notification_date: TradeDate,
    /// Option details from the `D:` block; empty for stock trades.
    pub description: String,
    /// Originating line, kept for diagnostics.
    pub source_line: String,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.action, self.kind, self.asset_name)?;
        if let Some(symbol) = self.ticker.symbol() {
            write!(f, " ({symbol})")?;
        }
        write!(f, " - {} - {}", self.amount_range_raw, self.transaction_date)
    }
}
