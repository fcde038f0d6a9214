//! Plain-text rendering of parse results and store listings.

use ptr_core::{compact_amount, Filer, TradeRecord};
use ptr_ingestion::ParsedDocument;
use ptr_store::{FilerStats, FilingRow, StoreStats, StoredTrade};
use std::fmt::Write;

/// One line per trade, followed by the option description when present.
pub fn trades_table(trades: &[TradeRecord], compact: bool) -> String {
    let mut out = String::new();
    for (i, trade) in trades.iter().enumerate() {
        let amount = if compact {
            compact_amount(&trade.amount_range_raw)
        } else {
            trade.amount_range_raw.clone()
        };
        let _ = writeln!(
            out,
            "{:>3}. {:<4} {:<11} {:<40} {:<6} {:<24} {}",
            i + 1,
            trade.action.as_str(),
            trade.kind.to_string(),
            trade.asset_name,
            trade.ticker.to_string(),
            amount,
            trade.transaction_date,
        );
        if !trade.description.is_empty() {
            let _ = writeln!(out, "     {}", trade.description);
        }
    }
    out
}

/// Table plus a one-line summary of the parse.
pub fn document_summary(doc: &ParsedDocument, compact: bool) -> String {
    let mut out = trades_table(&doc.trades, compact);
    let _ = writeln!(
        out,
        "{} trades from {} candidate lines ({} structural, {} heuristic, {} skipped); filing date {}",
        doc.trades.len(),
        doc.stats.candidates,
        doc.stats.structural(),
        doc.stats.heuristic,
        doc.stats.skipped,
        doc.filing_date,
    );
    out
}

/// A filer's trades, each prefixed by its filing.
pub fn filer_trades_table(trades: &[StoredTrade]) -> String {
    let mut out = String::new();
    for stored in trades {
        let trade = &stored.trade;
        let _ = writeln!(
            out,
            "{:<12} {:<16} {:<4} {:<11} {:<40} {:<6} {:<24} {}",
            stored.filer,
            stored.filing_id,
            trade.action.as_str(),
            trade.kind.to_string(),
            trade.asset_name,
            trade.ticker.to_string(),
            compact_amount(&trade.amount_range_raw),
            trade.transaction_date,
        );
    }
    out
}

pub fn filings_table(rows: &[FilingRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<16} {:<12} {:<10} {:>4} trades  {}  {}",
            row.filing_id,
            row.filer,
            row.filing_date.to_string(),
            row.trade_count,
            row.processed_at,
            row.source_url.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn stats_text(stats: &StoreStats) -> String {
    let mut out = format!(
        "filers: {} ({} active)\nfilings: {}\ntrades: {}\nfilings (7d): {}\n",
        stats.total_filers,
        stats.active_filers,
        stats.total_filings,
        stats.total_trades,
        stats.recent_filings_7d
    );
    for count in &stats.trades_by_filer {
        let _ = writeln!(out, "  {:<12} {:>6} trades", count.filer, count.trades);
    }
    out
}

pub fn filer_stats_text(stats: &FilerStats) -> String {
    format!(
        "filer: {}\nfilings: {}\ntrades: {}\nfilings (7d): {}\nlast stored: {}\n",
        stats.filer,
        stats.filings,
        stats.trades,
        stats.recent_filings_7d,
        stats.last_processed_at.as_deref().unwrap_or("-"),
    )
}

pub fn filers_table(filers: &[Filer]) -> String {
    let mut out = String::new();
    for filer in filers {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:<24} {:<6} {:<8} {}",
            filer.name,
            filer.full_name,
            filer.search_name,
            filer.chamber.as_str(),
            filer.status.as_str(),
            [filer.party.as_str(), filer.state.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    out
}

/// Registry entry followed by the filer's totals.
pub fn filer_text(filer: &Filer, stats: &FilerStats) -> String {
    let mut out = format!(
        "{} ({})\nsearch name: {}\nchamber: {}\nstatus: {}\n",
        filer.full_name, filer.name, filer.search_name, filer.chamber, filer.status
    );
    if !filer.party.is_empty() {
        let _ = writeln!(out, "party: {}", filer.party);
    }
    if !filer.state.is_empty() {
        let _ = writeln!(out, "state: {}", filer.state);
    }
    out.push_str(&filer_stats_text(stats));
    out
}
