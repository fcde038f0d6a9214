//! SQLite schema for filers, processed filings and their trades.

/// Idempotent schema; applied every time a store is opened.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS filers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    full_name TEXT NOT NULL,
    search_name TEXT NOT NULL,
    party TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT '',
    chamber TEXT NOT NULL DEFAULT 'House',
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS filings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filing_id TEXT UNIQUE NOT NULL,
    filer TEXT NOT NULL,
    filing_date TEXT NOT NULL,
    source_url TEXT,
    processed_at TEXT NOT NULL,
    trade_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS trades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filing_id TEXT NOT NULL,
    filer TEXT NOT NULL,
    asset_name TEXT NOT NULL,
    ticker TEXT,
    trade_type TEXT NOT NULL,
    action TEXT NOT NULL,
    amount_range TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    notification_date TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    source_line TEXT NOT NULL DEFAULT '',
    extracted_at TEXT NOT NULL,
    FOREIGN KEY (filing_id) REFERENCES filings (filing_id)
);

CREATE INDEX IF NOT EXISTS idx_filings_filer ON filings (filer);
CREATE INDEX IF NOT EXISTS idx_trades_filer ON trades (filer);
CREATE INDEX IF NOT EXISTS idx_trades_filing_id ON trades (filing_id);
CREATE INDEX IF NOT EXISTS idx_trades_transaction_date ON trades (transaction_date);
CREATE INDEX IF NOT EXISTS idx_filings_filing_date ON filings (filing_date);
"#;
