//! Compiled text patterns shared by the classifier and the extractor.

use ptr_core::config::ExtractionConfig;
use ptr_core::{Error, Result};
use regex::Regex;

/// A dollar number: digits with thousands separators, no trailing comma.
const NUM: &str = r"\d(?:[\d,]*\d)?";

/// `M/D/YYYY` or `MM/DD/YYYY`.
const DATE: &str = r"\d{1,2}/\d{1,2}/\d{4}";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::pattern(format!("{pattern}: {e}")))
}

/// All regular expressions used during extraction.
#[derive(Debug)]
pub struct Patterns {
    /// `<asset> (<TICKER>) <P|S> [(partial)] <date> <date> <$amount>`.
    pub full_line: Regex,
    /// `<lead> <asset> <P|S> [(partial)] <date> <date> <$amount>`.
    pub lead_line: Regex,
    /// Parenthesized ticker `(ABC)`.
    pub ticker_group: Regex,
    /// First `$<number>` token on a continuation line.
    pub dollar_token: Regex,
    /// Free-standing date token.
    pub date_token: Regex,
    /// Run of 2+-letter uppercase words.
    pub upper_run: Regex,
    /// `$n1-$n2` / `$n1 - n2`.
    pub amount_range: Regex,
    /// First dollar amount with its qualifier, if any.
    pub amount_single: Regex,
    /// `Over $n`.
    pub amount_over: Regex,
    /// `Under $n`.
    pub amount_under: Regex,
    /// `$n1 to $n2`.
    pub amount_to: Regex,
}

impl Patterns {
    /// Compile the patterns for the given lead token and partial marker.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let lead = regex::escape(config.lead_token.trim());
        let partial = regex::escape(config.partial_marker.trim());
        let amount = format!(r"\${NUM}(?:\s*-\s*\$?{NUM}|\s*-)?");
        let tail = format!(
            r"(?P<action>[PS])(?:\s+{partial})?\s+(?P<tdate>{DATE})\s+(?P<ndate>{DATE})\s+(?P<amount>{amount})"
        );

        Ok(Self {
            full_line: compile(&format!(
                r"(?P<asset>[A-Z].*?)\s*\((?P<ticker>[A-Z]{{1,5}})\)\s*{tail}"
            ))?,
            lead_line: compile(&format!(r"\b{lead}\s+(?P<asset>[A-Z].*?)\s+{tail}"))?,
            ticker_group: compile(r"\(([A-Z]{1,5})\)")?,
            dollar_token: compile(&format!(r"\${NUM}"))?,
            date_token: compile(&format!(r"\b({DATE})\b"))?,
            upper_run: compile(r"\b[A-Z]{2,}(?:\s+[A-Z]{2,})*\b")?,
            amount_range: compile(&format!(r"\$({NUM})\s*-\s*\$?({NUM})"))?,
            amount_single: compile(&format!(
                r"(?P<qualifier>\b(?:Over|Under)\s+)?\$(?P<n>{NUM})(?P<to>\s+to\s+\${NUM})?"
            ))?,
            amount_over: compile(&format!(r"Over\s+\$({NUM})"))?,
            amount_under: compile(&format!(r"Under\s+\$({NUM})"))?,
            amount_to: compile(&format!(r"\$({NUM})\s+to\s+\$({NUM})"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Patterns {
        Patterns::new(&ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_full_line_captures() {
        let p = patterns();
        let caps = p
            .full_line
            .captures("AMAZON.COM INC (AMZN) S 02/01/2024 02/03/2024 $50,001-$100,000")
            .unwrap();
        assert_eq!(&caps["asset"], "AMAZON.COM INC");
        assert_eq!(&caps["ticker"], "AMZN");
        assert_eq!(&caps["action"], "S");
        assert_eq!(&caps["amount"], "$50,001-$100,000");
    }

    #[test]
    fn test_lead_line_asset_may_contain_p() {
        let p = patterns();
        let caps = p
            .lead_line
            .captures("SP ACME CORP P 01/02/2024 01/10/2024 $15,001 -")
            .unwrap();
        assert_eq!(&caps["asset"], "ACME CORP");
        assert_eq!(&caps["action"], "P");
        assert_eq!(&caps["amount"], "$15,001 -");
    }

    #[test]
    fn test_lead_line_partial_marker() {
        let p = patterns();
        let caps = p
            .lead_line
            .captures("SP APPLE INC S (partial) 12/20/2024 12/20/2024 $5,000,001 -")
            .unwrap();
        assert_eq!(&caps["asset"], "APPLE INC");
        assert_eq!(&caps["action"], "S");
        assert_eq!(&caps["tdate"], "12/20/2024");
    }

    #[test]
    fn test_custom_lead_token_is_escaped() {
        let config = ExtractionConfig {
            lead_token: "J.T".to_string(),
            ..ExtractionConfig::default()
        };
        let p = Patterns::new(&config).unwrap();
        assert!(p.lead_line.is_match("J.T WIDGET CO P 03/01/2024 03/05/2024 $1,001 -"));
        assert!(!p.lead_line.is_match("JXT WIDGET CO P 03/01/2024 03/05/2024 $1,001 -"));
    }
}
