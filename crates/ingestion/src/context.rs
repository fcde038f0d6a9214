//! Trade kind and option description from the lines around a trade row.

use ptr_core::config::Config;
use ptr_core::TradeKind;

/// Looks ahead of a trade line for option details.
#[derive(Debug, Clone)]
pub struct ContextResolver {
    lookahead: usize,
    option_keywords: Vec<String>,
    description_window: usize,
    description_marker: String,
    next_record_marker: String,
    section_end_marker: String,
}

impl ContextResolver {
    /// Build a resolver. The next-record marker follows the extraction lead
    /// token unless the context section overrides it.
    pub fn new(config: &Config) -> Self {
        let ctx = &config.context;
        Self {
            lookahead: ctx.kind_lookahead_lines,
            option_keywords: ctx.option_keywords.iter().map(|k| k.to_uppercase()).collect(),
            description_window: ctx.description_window_lines,
            description_marker: ctx.description_marker.clone(),
            next_record_marker: ctx.record_marker(&config.extraction.lead_token),
            section_end_marker: ctx.section_end_marker.clone(),
        }
    }

    /// Classify the trade at `index` from the current line and the lines
    /// that follow it. An option mention without CALL or PUT counts as a call.
    pub fn classify_kind<S: AsRef<str>>(&self, lines: &[S], index: usize) -> TradeKind {
        let end = lines.len().min(index.saturating_add(self.lookahead));
        let Some(window) = lines.get(index..end) else {
            return TradeKind::Stock;
        };
        let text = window
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        if !self.option_keywords.iter().any(|k| text.contains(k.as_str())) {
            TradeKind::Stock
        } else if text.contains("CALL") {
            TradeKind::OptionCall
        } else if text.contains("PUT") {
            TradeKind::OptionPut
        } else {
            TradeKind::OptionCall
        }
    }

    /// Collect the `D:` block following the trade at `index`.
    ///
    /// Once the marker is seen, every line is appended until the next record
    /// or the end of the section. Before it, only a next record stops the
    /// scan. Returns an empty string when no block is found.
    pub fn extract_description<S: AsRef<str>>(&self, lines: &[S], index: usize) -> String {
        let start = index.saturating_add(1);
        let end = lines.len().min(start.saturating_add(self.description_window));
        let Some(window) = lines.get(start..end) else {
            return String::new();
        };

        let mut fragments: Vec<String> = Vec::new();
        let mut found = false;
        for raw in window {
            let cleaned = raw.as_ref().replace('\0', "");
            let line = cleaned.trim();

            if let Some(rest) = line.strip_prefix(self.description_marker.as_str()) {
                found = true;
                push_fragment(&mut fragments, rest);
                continue;
            }
            if line.starts_with(self.next_record_marker.as_str())
                || (found && self.ends_section(line))
            {
                break;
            }
            if found {
                push_fragment(&mut fragments, line);
            }
        }

        fragments.join(" ")
    }

    fn ends_section(&self, line: &str) -> bool {
        !self.section_end_marker.is_empty() && line.starts_with(self.section_end_marker.as_str())
    }
}

fn push_fragment(fragments: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        fragments.push(fragment.to_string());
    }
}
