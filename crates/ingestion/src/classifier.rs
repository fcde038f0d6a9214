//! Candidate trade line detection.
//!
//! A line is a candidate when it has the shape of a PTR table row, or when
//! it reads like a prose transaction (action word plus security word) and is
//! not a table header or footer. False positives are cheap: the extractor
//! validates every candidate before a record is emitted.

use crate::patterns::Patterns;
use ptr_core::config::ClassifierConfig;
use std::sync::Arc;

/// Decides which lines may start a transaction record.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    patterns: Arc<Patterns>,
    action_keywords: Vec<String>,
    asset_keywords: Vec<String>,
    header_keywords: Vec<String>,
}

fn upper_all(list: &[String]) -> Vec<String> {
    list.iter().map(|k| k.to_uppercase()).collect()
}

impl LineClassifier {
    /// Create a classifier over already compiled patterns.
    pub fn new(patterns: Arc<Patterns>, config: &ClassifierConfig) -> Self {
        Self {
            patterns,
            action_keywords: upper_all(&config.action_keywords),
            asset_keywords: upper_all(&config.asset_keywords),
            header_keywords: upper_all(&config.header_keywords),
        }
    }

    /// Is this line a candidate trade line?
    pub fn is_candidate(&self, line: &str) -> bool {
        self.matches_shape(line) || self.matches_keywords(line)
    }

    /// Structural row shapes (ticker on the line, or lead-token rows whose
    /// ticker may follow on the next line).
    pub fn matches_shape(&self, line: &str) -> bool {
        self.patterns.full_line.is_match(line) || self.patterns.lead_line.is_match(line)
    }

    /// Keyword fallback for prose-like rows.
    pub fn matches_keywords(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        let contains_any = |list: &[String]| list.iter().any(|k| upper.contains(k.as_str()));

        contains_any(&self.action_keywords)
            && contains_any(&self.asset_keywords)
            && !contains_any(&self.header_keywords)
    }
}
