//! Interfaces to the collaborators around the parser.
//!
//! The parser itself is a pure function over lines; fetching documents,
//! persisting results and delivering notifications happen behind these
//! traits.

use crate::error::Result;
use crate::types::{TradeDate, TradeRecord};
use serde::{Deserialize, Serialize};

/// Identity of one filed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// Stable identifier of the filing (e.g. the document id from its URL).
    pub filing_id: String,
    /// Registry name of the filer who submitted the report.
    pub filer: String,
    /// Filing date, when known.
    pub filing_date: TradeDate,
    /// Where the document was fetched from.
    pub source_url: Option<String>,
}

/// Supplies the text lines of one document.
pub trait DocumentSource {
    /// Document text split into lines, in reading order.
    fn lines(&self) -> Result<Vec<String>>;
}

/// Receives the records extracted from one filing.
pub trait FilingSink {
    /// Has this filing been stored before?
    fn is_processed(&self, filing_id: &str) -> Result<bool>;

    /// Store a filing and its records.
    fn store_filing(&mut self, filing: &Filing, trades: &[TradeRecord]) -> Result<()>;
}

/// Receives individual records for delivery.
pub trait TradeNotifier {
    /// Deliver one record of a stored filing.
    fn notify(&self, filing: &Filing, trade: &TradeRecord) -> Result<()>;
}

/// Document text already held in memory.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DocumentSource for TextDocument {
    fn lines(&self) -> Result<Vec<String>> {
        Ok(self
            .text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect())
    }
}
