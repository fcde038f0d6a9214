//! Whole-document extraction over realistic PTR text.

use ptr_core::{Ticker, TradeAction, TradeDate, TradeKind};
use ptr_ingestion::{Grammar, PtrParser};

const HOUSE_PTR: &str = "\
Clerk of the House of Representatives
Filing ID #20024542
Filing Date: 01/23/2024
ID Owner Asset Transaction Type Date Notification Date Amount
SP AMAZON.COM INC (AMZN) S 02/01/2024 02/03/2024 $50,001-$100,000
F S: New
SP ACME CORP P 01/02/2024 01/10/2024 $15,001 -
[OT] $50,000
SP WIDGET CO P 03/01/2024 03/05/2024 $1,001 -
(WDG) $15,000
F S: New
SP NVIDIA CORPORATION P 12/20/2023 12/20/2023 $1,000,001 -
(NVDA) [OP] $5,000,000
F S: New
D: Purchased 50 call options with a strike price of $120 and an
expiration date of 12/19/2025.
SP GOVERNMENT MONEY FUND P 01/01/2024 01/02/2024 $1,001 -
[MF] $15,000
* For the complete list of asset type abbreviations, please visit
TOTAL SALE OF SHARES INC
";

fn parser() -> PtrParser {
    PtrParser::with_defaults().unwrap()
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn test_house_report() {
    let parser = parser();
    let doc = parser.parse_document(&lines(HOUSE_PTR));

    assert_eq!(doc.filing_date.to_string(), "01/23/2024");
    let assets: Vec<&str> = doc.trades.iter().map(|t| t.asset_name.as_str()).collect();
    assert_eq!(
        assets,
        vec![
            "AMAZON.COM INC",
            "ACME CORP",
            "WIDGET CO",
            "NVIDIA CORPORATION",
            "GOVERNMENT MONEY FUND",
        ]
    );

    let amazon = &doc.trades[0];
    assert_eq!(amazon.ticker.symbol(), Some("AMZN"));
    assert_eq!(amazon.action, TradeAction::Sell);
    assert_eq!(amazon.amount_range_raw, "$50,001-$100,000");

    let acme = &doc.trades[1];
    assert_eq!(acme.ticker, Ticker::NotApplicable);
    assert_eq!(acme.amount_range_raw, "$15,001 - $50,000");

    let widget = &doc.trades[2];
    assert_eq!(widget.ticker.symbol(), Some("WDG"));
    assert_eq!(widget.amount_range_raw, "$1,001 - $15,000");

    let nvidia = &doc.trades[3];
    assert_eq!(nvidia.ticker.symbol(), Some("NVDA"));
    assert_eq!(nvidia.kind, TradeKind::OptionCall);
    assert_eq!(nvidia.amount_range_raw, "$1,000,001 - $5,000,000");
    assert_eq!(
        nvidia.description,
        "Purchased 50 call options with a strike price of $120 and an expiration date of 12/19/2025."
    );

    let fund = &doc.trades[4];
    assert_eq!(fund.ticker, Ticker::NotApplicable);
    assert_eq!(fund.kind, TradeKind::Stock);
    assert_eq!(fund.description, "");
}

#[test]
fn test_output_preserves_line_order() {
    let parser = parser();
    let report = lines(HOUSE_PTR);
    let doc = parser.parse_document(&report);

    let positions: Vec<usize> = doc
        .trades
        .iter()
        .map(|t| report.iter().position(|l| *l == t.source_line).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_amount_completion() {
    let report = [
        "SP ACME CORP P 01/02/2024 01/10/2024 $15,001 -",
        "[OT] $50,000",
    ];
    let trades = parser().parse_lines(&report);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].amount_range_raw, "$15,001 - $50,000");
}

#[test]
fn test_ticker_on_next_line() {
    let report = ["SP WIDGET CO P 03/01/2024 03/05/2024 $1,001 -", "(WDG) $15,000"];
    let parser = parser();
    let (record, grammar) = parser
        .extractor()
        .extract_traced(report[0], &report, 0)
        .unwrap();

    assert_eq!(grammar, Grammar::TickerOnNextLine);
    assert_eq!(record.ticker.symbol(), Some("WDG"));
    assert_eq!(record.amount_range_raw, "$1,001 - $15,000");
}

#[test]
fn test_single_line_full_form() {
    let report = ["AMAZON.COM INC (AMZN) S 02/01/2024 02/03/2024 $50,001-$100,000"];
    let trades = parser().parse_lines(&report);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].asset_name, "AMAZON.COM INC");
    assert_eq!(trades[0].ticker.symbol(), Some("AMZN"));
    assert_eq!(trades[0].action, TradeAction::Sell);
    assert_eq!(trades[0].amount_range_raw, "$50,001-$100,000");
}

#[test]
fn test_option_call_with_description() {
    let report = [
        "SP ACME CORP P 01/02/2024 01/10/2024 $15,001 -",
        "[OP] $50,000",
        "D: Purchased 10 contracts, CALL strike $40",
        "expiring 06/21/2024",
        "SP WIDGET CO P 03/01/2024 03/05/2024 $1,001 -",
        "(WDG) $15,000",
    ];
    let trades = parser().parse_lines(&report);

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].kind, TradeKind::OptionCall);
    assert_eq!(
        trades[0].description,
        "Purchased 10 contracts, CALL strike $40 expiring 06/21/2024"
    );
}

#[test]
fn test_header_and_footer_lines_rejected() {
    let parser = parser();
    let classifier = parser.classifier();
    assert!(!classifier.is_candidate("TOTAL purchases of ACME CORP stock"));
    assert!(!classifier.is_candidate("ASSET sale: WIDGET INC shares"));

    let trades = parser.parse_lines(&["TOTAL SALE OF SHARES INC", "Asset: buy ACME CORP"]);
    assert!(trades.is_empty());
}

#[test]
fn test_no_ticker_instrument() {
    let report = ["SP GOVERNMENT MONEY FUND P 01/01/2024 01/02/2024 $1,001 -"];
    let trades = parser().parse_lines(&report);

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].ticker, Ticker::NotApplicable);
    assert_eq!(trades[0].ticker.to_string(), "N/A");
}

#[test]
fn test_heuristic_row_uses_filing_date() {
    let report = [
        "Report Date: 04/01/2024",
        "Spouse purchase of BERKSHIRE HATHAWAY shares for $15,001 - $50,000",
        "transaction 03/28/2024",
    ];
    let trades = parser().parse_lines(&report);

    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.asset_name, "BERKSHIRE HATHAWAY");
    assert_eq!(trade.action, TradeAction::Buy);
    assert_eq!(trade.ticker, Ticker::Unknown);
    assert_eq!(trade.amount_range_raw, "$15,001-$50,000");
    assert_eq!(trade.transaction_date.to_string(), "04/01/2024");
    assert_eq!(trade.notification_date, TradeDate::parse_mdy("04/01/2024"));
}

#[test]
fn test_empty_and_blank_documents() {
    let parser = parser();
    assert!(parser.parse_lines::<&str>(&[]).is_empty());
    assert!(parser.parse_lines(&["", "   ", "\0"]).is_empty());
    assert!(parser.parse_text("").trades.is_empty());
}

#[test]
fn test_parser_is_shareable_across_threads() {
    let parser = parser();
    let report = lines(HOUSE_PTR);
    let expected = parser.parse_lines(&report);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| parser.parse_lines(&report)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_custom_lead_token_keeps_descriptions_apart() {
    let config =
        ptr_core::Config::from_json_str(r#"{"extraction": {"lead_token": "JT"}}"#).unwrap();
    let parser = PtrParser::new(&config).unwrap();
    let trades = parser.parse_lines(&[
        "JT ACME CORP P 01/02/2024 01/10/2024 $15,001 -",
        "(ACM) [OP] $50,000",
        "D: 10 call options",
        "JT WIDGET CO P 03/01/2024 03/05/2024 $1,001 -",
        "(WDG) [OP] $15,000",
        "D: 5 put options",
    ]);

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].asset_name, "ACME CORP");
    assert_eq!(trades[0].kind, TradeKind::OptionCall);
    assert_eq!(trades[0].description, "10 call options");
    assert_eq!(trades[1].asset_name, "WIDGET CO");
    assert_eq!(trades[1].kind, TradeKind::OptionPut);
    assert_eq!(trades[1].description, "5 put options");
}

#[test]
fn test_huge_date_window_does_not_panic() {
    let mut config = ptr_core::Config::default();
    config.extraction.date_window_lines = usize::MAX;
    let parser = PtrParser::new(&config).unwrap();

    let trades = parser.parse_lines(&["Purchase of ACME HOLDINGS shares"]);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].action, TradeAction::Buy);
    assert_eq!(trades[0].transaction_date, TradeDate::Unknown);
}

#[test]
fn test_header_words_only_block_keyword_rows() {
    let parser = parser();
    let structural = "TOTAL ACME CORP (ACM) P 01/02/2024 01/10/2024 $1,001-$15,000";
    let keyword_only = "TOTAL PURCHASE OF ACME CORP SHARES";

    assert!(parser.classifier().is_candidate(structural));
    assert!(!parser.classifier().is_candidate(keyword_only));

    let trades = parser.parse_lines(&[structural, keyword_only]);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].asset_name, "TOTAL ACME CORP");
    assert_eq!(trades[0].ticker.symbol(), Some("ACM"));
}
