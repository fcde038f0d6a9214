//! Field extraction from candidate trade lines.
//!
//! Each candidate is tried against a fixed cascade of grammars. The first
//! grammar that matches produces a [`Capture`]; the capture is then
//! validated and completed (trade kind, option description) into a
//! [`TradeRecord`]. A line that matches no grammar, or whose capture fails
//! validation, yields no record.

use crate::context::ContextResolver;
use crate::normalizer::ValueNormalizer;
use crate::patterns::Patterns;
use ptr_core::config::Config;
use ptr_core::{Ticker, TradeAction, TradeDate, TradeKind, TradeRecord};
use regex::Captures;
use std::fmt;
use std::sync::Arc;

/// Row grammars, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `<asset> (<TICKER>) <P|S> <date> <date> <$amount>` on one line.
    FullLine,
    /// Lead-token row whose `(TICKER)` sits on the next line.
    TickerOnNextLine,
    /// Lead-token row for an instrument without a ticker.
    NoTicker,
    /// Keyword driven fallback for prose-like rows.
    Heuristic,
}

impl Grammar {
    /// Grammars in the order they are tried.
    pub const CASCADE: [Grammar; 4] = [
        Grammar::FullLine,
        Grammar::TickerOnNextLine,
        Grammar::NoTicker,
        Grammar::Heuristic,
    ];

    /// Name used in logs and parse counters.
    pub fn as_str(self) -> &'static str {
        match self {
            Grammar::FullLine => "full_line",
            Grammar::TickerOnNextLine => "ticker_on_next_line",
            Grammar::NoTicker => "no_ticker",
            Grammar::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields recovered by one grammar, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    asset_name: String,
    ticker: Ticker,
    /// `None` when the kind comes from the surrounding lines.
    kind: Option<TradeKind>,
    action: Option<TradeAction>,
    amount_range_raw: String,
    transaction_date: TradeDate,
    notification_date: TradeDate,
}

/// Turns candidate lines into trade records.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    patterns: Arc<Patterns>,
    normalizer: ValueNormalizer,
    context: ContextResolver,
    lead_token: String,
    min_asset_name_len: usize,
}

impl FieldExtractor {
    /// Create a new field extractor over shared patterns.
    pub fn new(patterns: Arc<Patterns>, config: &Config) -> Self {
        Self {
            normalizer: ValueNormalizer::new(Arc::clone(&patterns), &config.extraction),
            context: ContextResolver::new(config),
            patterns,
            lead_token: config.extraction.lead_token.trim().to_string(),
            min_asset_name_len: config.extraction.min_asset_name_len,
        }
    }

    /// Extract the record encoded by `line`, found at `lines[index]`.
    pub fn extract<S: AsRef<str>>(
        &self,
        line: &str,
        lines: &[S],
        index: usize,
    ) -> Option<TradeRecord> {
        self.extract_traced(line, lines, index).map(|(record, _)| record)
    }

    /// Like [`FieldExtractor::extract`], also reporting the grammar that
    /// produced the record.
    pub fn extract_traced<S: AsRef<str>>(
        &self,
        line: &str,
        lines: &[S],
        index: usize,
    ) -> Option<(TradeRecord, Grammar)> {
        let next_line = index
            .checked_add(1)
            .and_then(|i| lines.get(i))
            .map(|l| l.as_ref());

        let (grammar, capture) = Grammar::CASCADE.iter().find_map(|&grammar| {
            self.attempt(grammar, line, next_line, lines, index)
                .map(|capture| (grammar, capture))
        })?;

        self.finish(capture, line, lines, index)
            .map(|record| (record, grammar))
    }

    fn attempt<S: AsRef<str>>(
        &self,
        grammar: Grammar,
        line: &str,
        next_line: Option<&str>,
        lines: &[S],
        index: usize,
    ) -> Option<Capture> {
        match grammar {
            Grammar::FullLine => {
                let caps = self.patterns.full_line.captures(line)?;
                let asset = self.strip_lead_token(caps["asset"].trim());
                Some(self.structural(&caps, asset, Ticker::from_match(&caps["ticker"]), next_line))
            }
            Grammar::TickerOnNextLine => {
                let caps = self.patterns.lead_line.captures(line)?;
                let ticker = self.patterns.ticker_group.captures(next_line?)?;
                Some(self.structural(&caps, &caps["asset"], Ticker::from_match(&ticker[1]), next_line))
            }
            Grammar::NoTicker => {
                let caps = self.patterns.lead_line.captures(line)?;
                Some(self.structural(&caps, &caps["asset"], Ticker::NotApplicable, next_line))
            }
            Grammar::Heuristic => Some(self.heuristic(line, lines, index)),
        }
    }

    fn structural(
        &self,
        caps: &Captures<'_>,
        asset: &str,
        ticker: Ticker,
        next_line: Option<&str>,
    ) -> Capture {
        Capture {
            asset_name: asset.trim().to_string(),
            ticker,
            kind: None,
            action: self.normalizer.action_from_code(&caps["action"]),
            amount_range_raw: self.normalizer.complete_amount(&caps["amount"], next_line),
            transaction_date: TradeDate::parse_mdy(&caps["tdate"]),
            notification_date: TradeDate::parse_mdy(&caps["ndate"]),
        }
    }

    fn heuristic<S: AsRef<str>>(&self, line: &str, lines: &[S], index: usize) -> Capture {
        let upper = line.to_uppercase();
        let is_call = upper.contains("CALL");
        let is_put = upper.contains("PUT");

        let option = (is_call || is_put)
            .then(|| self.patterns.ticker_group.captures(line))
            .flatten()
            .and_then(|caps| {
                let group = caps.get(0)?;
                let kind = if is_call {
                    TradeKind::OptionCall
                } else {
                    TradeKind::OptionPut
                };
                Some((
                    line[..group.start()].trim().to_string(),
                    Ticker::from_match(&caps[1]),
                    kind,
                ))
            });

        let (asset_name, ticker, kind) = option.unwrap_or_else(|| {
            // Longest run; ties go to the first.
            let mut asset = "";
            for run in self.patterns.upper_run.find_iter(line) {
                if run.as_str().len() > asset.len() {
                    asset = run.as_str();
                }
            }
            let ticker = self
                .patterns
                .ticker_group
                .captures(line)
                .map(|caps| Ticker::from_match(&caps[1]))
                .unwrap_or(Ticker::Unknown);
            (asset.to_string(), ticker, TradeKind::Stock)
        });

        Capture {
            asset_name,
            ticker,
            kind: Some(kind),
            action: self.normalizer.action_from_keywords(line),
            amount_range_raw: self.normalizer.amount_range(line),
            transaction_date: self.normalizer.transaction_date(line, lines, index),
            notification_date: self.normalizer.filing_date(lines),
        }
    }

    /// Validate a capture and resolve kind and description.
    fn finish<S: AsRef<str>>(
        &self,
        capture: Capture,
        line: &str,
        lines: &[S],
        index: usize,
    ) -> Option<TradeRecord> {
        let action = capture.action?;
        let asset_name = capture.asset_name.trim();
        if asset_name.chars().count() < self.min_asset_name_len {
            return None;
        }

        let kind = capture
            .kind
            .unwrap_or_else(|| self.context.classify_kind(lines, index));
        let description = if kind.is_option() {
            self.context.extract_description(lines, index)
        } else {
            String::new()
        };

        Some(TradeRecord {
            asset_name: asset_name.to_string(),
            ticker: capture.ticker,
            kind,
            action,
            amount_range_raw: capture.amount_range_raw,
            transaction_date: capture.transaction_date,
            notification_date: capture.notification_date,
            description,
            source_line: line.to_string(),
        })
    }

    /// Drop an owner code left at the front of a full-line asset name.
    fn strip_lead_token<'a>(&self, asset: &'a str) -> &'a str {
        match asset.strip_prefix(self.lead_token.as_str()) {
            Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
            _ => asset,
        }
    }
}
