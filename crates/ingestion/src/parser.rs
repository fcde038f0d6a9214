//! Document-level parsing: classify every line, extract every candidate.

use crate::classifier::LineClassifier;
use crate::extractor::{FieldExtractor, Grammar};
use crate::normalizer::ValueNormalizer;
use crate::patterns::Patterns;
use ptr_core::{Config, DocumentSource, Error, RawLine, Result, TradeDate, TradeRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Counters for one parsed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Lines scanned.
    pub lines: usize,
    /// Lines accepted by the classifier.
    pub candidates: usize,
    /// Records from the one-line form.
    pub full_line: usize,
    /// Records whose ticker came from the following line.
    pub ticker_on_next_line: usize,
    /// Records for instruments without a ticker.
    pub no_ticker: usize,
    /// Records from the keyword fallback.
    pub heuristic: usize,
    /// Candidates that produced no record.
    pub skipped: usize,
}

impl ParseStats {
    /// Total records emitted.
    pub fn records(&self) -> usize {
        self.full_line + self.ticker_on_next_line + self.no_ticker + self.heuristic
    }

    /// Records from fixed-shape grammars.
    pub fn structural(&self) -> usize {
        self.full_line + self.ticker_on_next_line + self.no_ticker
    }

    fn record(&mut self, grammar: Grammar) {
        match grammar {
            Grammar::FullLine => self.full_line += 1,
            Grammar::TickerOnNextLine => self.ticker_on_next_line += 1,
            Grammar::NoTicker => self.no_ticker += 1,
            Grammar::Heuristic => self.heuristic += 1,
        }
    }
}

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// Filing date from the document header.
    pub filing_date: TradeDate,
    /// Records in line order.
    pub trades: Vec<TradeRecord>,
    /// Line and grammar counters.
    pub stats: ParseStats,
}

/// PTR document parser.
///
/// Holds only immutable compiled state; one instance can parse any number
/// of documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct PtrParser {
    classifier: LineClassifier,
    extractor: FieldExtractor,
    normalizer: ValueNormalizer,
}

impl PtrParser {
    /// Compile a parser from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let patterns = Arc::new(Patterns::new(&config.extraction)?);
        Ok(Self {
            classifier: LineClassifier::new(Arc::clone(&patterns), &config.classifier),
            extractor: FieldExtractor::new(Arc::clone(&patterns), config),
            normalizer: ValueNormalizer::new(patterns, &config.extraction),
        })
    }

    /// Parser with the default House PTR layout.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&Config::default())
    }

    /// Candidate line classifier used by this parser.
    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Field extractor used by this parser.
    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    /// Records of a document, in line order.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<TradeRecord> {
        self.parse_document(lines).trades
    }

    /// Records, filing date and counters of a document.
    pub fn parse_document<S: AsRef<str>>(&self, lines: &[S]) -> ParsedDocument {
        let mut stats = ParseStats {
            lines: lines.len(),
            ..ParseStats::default()
        };
        let mut trades = Vec::new();

        for raw in RawLine::enumerate(lines) {
            if !self.classifier.is_candidate(raw.text) {
                continue;
            }
            stats.candidates += 1;

            match self.extractor.extract_traced(raw.text, lines, raw.index) {
                Some((record, grammar)) => {
                    debug!(
                        line = raw.index,
                        shape = %grammar,
                        asset = %record.asset_name,
                        ticker = %record.ticker,
                        "Extracted trade"
                    );
                    stats.record(grammar);
                    trades.push(record);
                }
                None => {
                    trace!(line = raw.index, text = raw.text, "Skipped candidate line");
                    stats.skipped += 1;
                }
            }
        }

        let filing_date = self.normalizer.filing_date(lines);
        info!(
            lines = stats.lines,
            candidates = stats.candidates,
            trades = trades.len(),
            skipped = stats.skipped,
            filing_date = %filing_date,
            "Parsed document"
        );

        ParsedDocument {
            filing_date,
            trades,
            stats,
        }
    }

    /// Parse document text; `\r\n` and `\n` both end a line.
    pub fn parse_text(&self, text: &str) -> ParsedDocument {
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        self.parse_document(&lines)
    }

    /// Parse raw document bytes, which must be UTF-8 text.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::invalid_input(format!("document is not UTF-8 text: {e}")))?;
        Ok(self.parse_text(text))
    }

    /// Parse whatever a document source supplies.
    pub fn parse_source(&self, source: &dyn DocumentSource) -> Result<ParsedDocument> {
        let lines = source.lines()?;
        Ok(self.parse_document(&lines))
    }
}
