//! Value normalization: amounts, actions and dates.

use crate::patterns::Patterns;
use ptr_core::config::ExtractionConfig;
use ptr_core::{TradeAction, TradeDate, UNKNOWN};
use std::sync::Arc;

/// Amount grammars tried by the heuristic path, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountGrammar {
    /// `$n1-$n2`, `$n1-n2`.
    Range,
    /// A bare `$n1` with no qualifier and no second bound.
    Single,
    /// `Over $n`.
    Over,
    /// `Under $n`.
    Under,
    /// `$n1 to $n2`.
    To,
}

impl AmountGrammar {
    const CASCADE: [AmountGrammar; 5] = [
        AmountGrammar::Range,
        AmountGrammar::Single,
        AmountGrammar::Over,
        AmountGrammar::Under,
        AmountGrammar::To,
    ];
}

/// Canonicalizes the loose values found in PTR text.
#[derive(Debug, Clone)]
pub struct ValueNormalizer {
    patterns: Arc<Patterns>,
    buy_keywords: Vec<String>,
    sell_keywords: Vec<String>,
    date_window: usize,
    filing_header_lines: usize,
    filing_date_keywords: Vec<String>,
}

impl ValueNormalizer {
    /// Create a new normalizer over shared patterns.
    pub fn new(patterns: Arc<Patterns>, config: &ExtractionConfig) -> Self {
        let upper = |list: &[String]| -> Vec<String> {
            list.iter().map(|k| k.to_uppercase()).collect()
        };
        Self {
            patterns,
            buy_keywords: upper(&config.buy_keywords),
            sell_keywords: upper(&config.sell_keywords),
            date_window: config.date_window_lines,
            filing_header_lines: config.filing_header_lines,
            filing_date_keywords: upper(&config.filing_date_keywords),
        }
    }

    /// `P` → Buy, `S` → Sell.
    pub fn action_from_code(&self, code: &str) -> Option<TradeAction> {
        let mut chars = code.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => TradeAction::from_code(c),
            _ => None,
        }
    }

    /// Action from keywords; buy words are checked first.
    pub fn action_from_keywords(&self, line: &str) -> Option<TradeAction> {
        let upper = line.to_uppercase();
        let hit = |list: &[String]| list.iter().any(|k| upper.contains(k.as_str()));
        if hit(&self.buy_keywords) {
            Some(TradeAction::Buy)
        } else if hit(&self.sell_keywords) {
            Some(TradeAction::Sell)
        } else {
            None
        }
    }

    /// Complete a dangling amount (`$15,001 -`) from the first dollar token
    /// of the continuation line. Complete amounts are returned trimmed.
    pub fn complete_amount(&self, amount: &str, next_line: Option<&str>) -> String {
        let amount = amount.trim();
        if !amount.ends_with('-') {
            return amount.to_string();
        }
        match next_line.and_then(|line| self.patterns.dollar_token.find(line)) {
            Some(upper) => format!("{amount} {}", upper.as_str()),
            None => amount.to_string(),
        }
    }

    /// Amount cascade for lines no structural grammar matched.
    pub fn amount_range(&self, line: &str) -> String {
        AmountGrammar::CASCADE
            .iter()
            .find_map(|&grammar| self.try_amount(grammar, line))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn try_amount(&self, grammar: AmountGrammar, line: &str) -> Option<String> {
        let p = &self.patterns;
        match grammar {
            AmountGrammar::Range => p
                .amount_range
                .captures(line)
                .map(|c| format!("${}-${}", &c[1], &c[2])),
            AmountGrammar::Single => {
                let caps = p.amount_single.captures(line)?;
                if caps.name("qualifier").is_some() || caps.name("to").is_some() {
                    return None;
                }
                Some(format!("${}", &caps["n"]))
            }
            AmountGrammar::Over => p.amount_over.captures(line).map(|c| format!("Over ${}", &c[1])),
            AmountGrammar::Under => p
                .amount_under
                .captures(line)
                .map(|c| format!("Under ${}", &c[1])),
            AmountGrammar::To => p
                .amount_to
                .captures(line)
                .map(|c| format!("${}-${}", &c[1], &c[2])),
        }
    }

    /// First date token on a line.
    pub fn find_date(&self, line: &str) -> Option<TradeDate> {
        self.patterns
            .date_token
            .captures(line)
            .map(|c| TradeDate::parse_mdy(&c[1]))
    }

    /// Transaction date from the line itself, else from the surrounding
    /// window of lines.
    pub fn transaction_date<S: AsRef<str>>(&self, line: &str, lines: &[S], index: usize) -> TradeDate {
        if let Some(date) = self.find_date(line) {
            return date;
        }
        let start = index.saturating_sub(self.date_window);
        let end = lines
            .len()
            .min(index.saturating_add(self.date_window).saturating_add(1));
        lines
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .find_map(|l| self.find_date(l.as_ref()))
            .unwrap_or(TradeDate::Unknown)
    }

    /// Filing date from the document header.
    pub fn filing_date<S: AsRef<str>>(&self, lines: &[S]) -> TradeDate {
        lines
            .iter()
            .take(self.filing_header_lines)
            .map(|l| l.as_ref())
            .filter(|l| {
                let upper = l.to_uppercase();
                self.filing_date_keywords.iter().any(|k| upper.contains(k.as_str()))
            })
            .find_map(|l| self.find_date(l))
            .unwrap_or(TradeDate::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_normalizer() -> ValueNormalizer {
        let config = ExtractionConfig::default();
        let patterns = Arc::new(Patterns::new(&config).unwrap());
        ValueNormalizer::new(patterns, &config)
    }

    #[test]
    fn test_action_codes() {
        let n = make_normalizer();
        assert_eq!(n.action_from_code("P"), Some(TradeAction::Buy));
        assert_eq!(n.action_from_code("s"), Some(TradeAction::Sell));
        assert_eq!(n.action_from_code("PS"), None);
        assert_eq!(n.action_from_code(""), None);
    }

    #[test]
    fn test_action_keywords_buy_first() {
        let n = make_normalizer();
        assert_eq!(n.action_from_keywords("Purchase of Acme"), Some(TradeAction::Buy));
        assert_eq!(n.action_from_keywords("Disposal of Acme"), Some(TradeAction::Sell));
        assert_eq!(n.action_from_keywords("sale after buy"), Some(TradeAction::Buy));
        assert_eq!(n.action_from_keywords("held"), None);
    }

    #[test]
    fn test_complete_amount() {
        let n = make_normalizer();
        assert_eq!(n.complete_amount("$15,001 -", Some("[OT] $50,000")), "$15,001 - $50,000");
        assert_eq!(
            n.complete_amount("$1,001 -", Some("(WDG) $15,000 $99,999")),
            "$1,001 - $15,000"
        );
        assert_eq!(n.complete_amount("$15,001 -", Some("no amount")), "$15,001 -");
        assert_eq!(n.complete_amount("$15,001 -", None), "$15,001 -");
        assert_eq!(n.complete_amount("$1,001 - $15,000", Some("$50,000")), "$1,001 - $15,000");
    }

    #[test]
    fn test_amount_cascade() {
        let n = make_normalizer();
        assert_eq!(n.amount_range("bought $1,001-$15,000 of stock"), "$1,001-$15,000");
        assert_eq!(n.amount_range("bought $1,001 - 15,000"), "$1,001-$15,000");
        assert_eq!(n.amount_range("about $5,000 worth"), "$5,000");
        assert_eq!(n.amount_range("Over $50,000,000"), "Over $50,000,000");
        assert_eq!(n.amount_range("Under $1,001"), "Under $1,001");
        assert_eq!(n.amount_range("$1,001 to $15,000"), "$1,001-$15,000");
        assert_eq!(n.amount_range("no money here"), UNKNOWN);
    }

    #[test]
    fn test_transaction_date_window() {
        let n = make_normalizer();
        let lines = ["header", "01/15/2024", "x", "Bought ACME CORP", "y", "z"];
        assert_eq!(n.transaction_date(lines[3], &lines, 3).to_string(), "01/15/2024");
        assert_eq!(n.transaction_date("sold 2/3/2024", &lines, 3).to_string(), "02/03/2024");

        let far = ["01/15/2024", "a", "b", "Bought ACME CORP"];
        assert_eq!(n.transaction_date(far[3], &far, 3), TradeDate::Unknown);
    }

    #[test]
    fn test_transaction_date_unbounded_window() {
        let config = ExtractionConfig {
            date_window_lines: usize::MAX,
            ..ExtractionConfig::default()
        };
        let patterns = Arc::new(Patterns::new(&config).unwrap());
        let n = ValueNormalizer::new(patterns, &config);

        let lines = ["Purchase of ACME HOLDINGS shares"];
        assert_eq!(n.transaction_date(lines[0], &lines, 0), TradeDate::Unknown);
        let lines = ["01/15/2024", "Purchase of ACME HOLDINGS shares"];
        assert_eq!(n.transaction_date(lines[1], &lines, 1).to_string(), "01/15/2024");
    }

    #[test]
    fn test_filing_date() {
        let n = make_normalizer();
        let lines = ["Clerk of the House", "Filing Date: 03/04/2024", "SP ACME CORP"];
        assert_eq!(n.filing_date(&lines).to_string(), "03/04/2024");

        let mut late: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        late.push("Filing Date: 03/04/2024".to_string());
        assert_eq!(n.filing_date(&late), TradeDate::Unknown);
    }
}
