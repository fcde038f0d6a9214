//! Configuration structures for the PTR extraction system.
//!
//! The defaults reproduce the House PTR layout; a JSON file may override any
//! section.

use crate::error::{Error, Result};
use crate::filer::Filer;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Main configuration for the extraction system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Candidate line detection.
    pub classifier: ClassifierConfig,
    /// Field extraction and normalization.
    pub extraction: ExtractionConfig,
    /// Trade kind and description context.
    pub context: ContextConfig,
    /// Storage writer.
    pub storage: StorageConfig,
    /// Filer registry, copied into the store by `filers sync` and when a
    /// filing is stored for one of them.
    pub filers: Vec<Filer>,
}

impl Config {
    /// Parse a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings the parser cannot work with.
    pub fn validate(&self) -> Result<()> {
        let non_empty = [
            ("classifier.action_keywords", self.classifier.action_keywords.is_empty()),
            ("classifier.asset_keywords", self.classifier.asset_keywords.is_empty()),
            ("extraction.buy_keywords", self.extraction.buy_keywords.is_empty()),
            ("extraction.sell_keywords", self.extraction.sell_keywords.is_empty()),
            ("extraction.lead_token", self.extraction.lead_token.trim().is_empty()),
            ("context.option_keywords", self.context.option_keywords.is_empty()),
            ("context.description_marker", self.context.description_marker.is_empty()),
            (
                "context.next_record_marker",
                self.context.next_record_marker.as_deref() == Some(""),
            ),
        ];
        if let Some((field, _)) = non_empty.iter().find(|(_, empty)| *empty) {
            return Err(Error::config(format!("{field} must not be empty")));
        }
        if self.context.kind_lookahead_lines == 0 {
            return Err(Error::config("context.kind_lookahead_lines must be at least 1"));
        }
        if self.extraction.min_asset_name_len == 0 {
            return Err(Error::config("extraction.min_asset_name_len must be at least 1"));
        }
        for (i, filer) in self.filers.iter().enumerate() {
            filer
                .validate()
                .map_err(|e| Error::config(format!("filers[{i}]: {e}")))?;
            if self.filers[..i].iter().any(|f| f.name == filer.name) {
                return Err(Error::config(format!("filers: duplicate name '{}'", filer.name)));
            }
        }
        Ok(())
    }

    /// Registry entry for a filer name.
    pub fn filer(&self, name: &str) -> Option<&Filer> {
        self.filers.iter().find(|f| f.name == name)
    }
}

/// Candidate line detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Words suggesting a transaction on keyword-only lines.
    pub action_keywords: Vec<String>,
    /// Words suggesting a security on keyword-only lines.
    pub asset_keywords: Vec<String>,
    /// Words marking table headers and footers.
    pub header_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            action_keywords: words(&["BUY", "SELL", "PURCHASE", "SALE", "ACQUIRED", "DISPOSED"]),
            asset_keywords: words(&["INC", "CORP", "LLC", "ETF", "STOCK", "SHARES"]),
            header_keywords: words(&["DATE", "ASSET", "ACTION", "AMOUNT", "---", "TOTAL", "SUMMARY"]),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Owner code opening multi-line rows (e.g. "SP" for spouse).
    pub lead_token: String,
    /// Marker allowed between the action code and the dates.
    pub partial_marker: String,
    /// Heuristic buy keywords, checked before sell keywords.
    pub buy_keywords: Vec<String>,
    /// Heuristic sell keywords.
    pub sell_keywords: Vec<String>,
    /// Minimum accepted asset name length.
    pub min_asset_name_len: usize,
    /// Lines before and after the current line searched for a date.
    pub date_window_lines: usize,
    /// Leading lines searched for the filing date.
    pub filing_header_lines: usize,
    /// Labels of the filing date line.
    pub filing_date_keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            lead_token: "SP".to_string(),
            partial_marker: "(partial)".to_string(),
            buy_keywords: words(&["BUY", "PURCHASE", "ACQUIRED", "ACQUISITION"]),
            sell_keywords: words(&["SELL", "SALE", "DISPOSED", "DISPOSAL"]),
            min_asset_name_len: 3,
            date_window_lines: 2,
            filing_header_lines: 10,
            filing_date_keywords: words(&["FILING DATE", "DATE FILED", "REPORT DATE"]),
        }
    }
}

/// Trade kind and description context configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Lines (current included) inspected for option keywords.
    pub kind_lookahead_lines: usize,
    /// Keywords that mark an option trade.
    pub option_keywords: Vec<String>,
    /// Lines after the trade line scanned for a description block.
    pub description_window_lines: usize,
    /// Prefix opening a description block.
    pub description_marker: String,
    /// Prefix of the next trade row. Derived from `extraction.lead_token`
    /// when unset.
    pub next_record_marker: Option<String>,
    /// Prefix closing the trade's detail section.
    pub section_end_marker: String,
}

impl ContextConfig {
    /// Prefix that opens the next trade row for the given lead token.
    pub fn record_marker(&self, lead_token: &str) -> String {
        match &self.next_record_marker {
            Some(marker) => marker.clone(),
            None => format!("{} ", lead_token.trim()),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            kind_lookahead_lines: 5,
            option_keywords: words(&["CALL", "PUT", "OPTION", "STRIKE", "EXPIRATION"]),
            description_window_lines: 9,
            description_marker: "D:".to_string(),
            next_record_marker: None,
            section_end_marker: "L:".to_string(),
        }
    }
}

/// Storage writer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "ptr_trades.db".to_string(),
        }
    }
}
