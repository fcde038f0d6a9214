//! Notifier that reports new trades through the log.

use ptr_core::{compact_amount, Filing, Result, TradeNotifier, TradeRecord};
use tracing::info;

/// Emits one structured `info` event per trade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl TradeNotifier for LogNotifier {
    fn notify(&self, filing: &Filing, trade: &TradeRecord) -> Result<()> {
        info!(
            filing_id = %filing.filing_id,
            filer = %filing.filer,
            filing_date = %filing.filing_date,
            action = %trade.action,
            kind = %trade.kind,
            asset = %trade.asset_name,
            ticker = %trade.ticker,
            amount = %compact_amount(&trade.amount_range_raw),
            transaction_date = %trade.transaction_date,
            "New trade"
        );
        Ok(())
    }
}
