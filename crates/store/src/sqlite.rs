//! SQLite-backed filing store.

use crate::schema::SCHEMA;
use chrono::{Duration, Utc};
use ptr_core::{
    validate_filer_name, Error, Filer, FilerStatus, Filing, FilingSink, Result, Ticker,
    TradeAction, TradeDate, TradeKind, TradeRecord,
};
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Timestamp layout compatible with SQLite's `datetime()`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const FILER_COLUMNS: &str = "name, full_name, search_name, party, state, chamber, status";

const TRADE_COLUMNS: &str = "filing_id, filer, asset_name, ticker, trade_type, action, \
     amount_range, transaction_date, notification_date, description, source_line";

trait SqlResultExt<T> {
    fn db(self) -> Result<T>;
}

impl<T> SqlResultExt<T> for rusqlite::Result<T> {
    fn db(self) -> Result<T> {
        self.map_err(|e| Error::database(e.to_string()))
    }
}

fn now() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

fn week_ago() -> String {
    (Utc::now() - Duration::days(7))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// A stored filing, as listed by [`SqliteStore::recent_filings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingRow {
    pub filing_id: String,
    pub filer: String,
    pub filing_date: TradeDate,
    pub source_url: Option<String>,
    /// UTC time the filing was stored.
    pub processed_at: String,
    pub trade_count: usize,
}

/// A stored trade with the filing and filer it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTrade {
    pub filing_id: String,
    pub filer: String,
    #[serde(flatten)]
    pub trade: TradeRecord,
}

/// Number of stored trades of one filer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilerCount {
    pub filer: String,
    pub trades: u64,
}

/// Store-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_filers: u64,
    pub active_filers: u64,
    pub total_filings: u64,
    pub total_trades: u64,
    /// Filings stored in the last seven days.
    pub recent_filings_7d: u64,
    /// Trade counts per filer, largest first.
    pub trades_by_filer: Vec<FilerCount>,
}

/// Counters of one filer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilerStats {
    pub filer: String,
    pub filings: u64,
    pub trades: u64,
    /// Filings stored in the last seven days.
    pub recent_filings_7d: u64,
    /// UTC time the filer's latest filing was stored.
    pub last_processed_at: Option<String>,
}

/// Filing store over a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).db()?;
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().db()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).db()?;
        Ok(Self { conn })
    }

    // ========================================================================
    // Filer registry
    // ========================================================================

    /// Register a filer, or update the one registered under the same name.
    pub fn upsert_filer(&self, filer: &Filer) -> Result<()> {
        filer.validate()?;
        self.conn
            .execute(
                "INSERT INTO filers (name, full_name, search_name, party, state, chamber, \
                 status, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
                 ON CONFLICT(name) DO UPDATE SET \
                     full_name = excluded.full_name, \
                     search_name = excluded.search_name, \
                     party = excluded.party, \
                     state = excluded.state, \
                     chamber = excluded.chamber, \
                     status = excluded.status, \
                     updated_at = excluded.updated_at",
                params![
                    filer.name,
                    filer.full_name,
                    filer.search_name,
                    filer.party,
                    filer.state,
                    filer.chamber.as_str(),
                    filer.status.as_str(),
                    now(),
                ],
            )
            .db()?;
        debug!(filer = %filer.name, status = %filer.status, "Registered filer");
        Ok(())
    }

    /// Registry entry of one filer.
    pub fn filer(&self, name: &str) -> Result<Option<Filer>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {FILER_COLUMNS} FROM filers WHERE name = ?1"),
                params![name],
                FilerRow::from_row,
            )
            .optional()
            .db()?;
        row.map(FilerRow::into_filer).transpose()
    }

    /// Registered filers by name, optionally only the active ones.
    pub fn list_filers(&self, active_only: bool) -> Result<Vec<Filer>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {FILER_COLUMNS} FROM filers \
                 WHERE ?1 = 0 OR status = 'active' ORDER BY name"
            ))
            .db()?;
        let rows = stmt.query_map(params![active_only], FilerRow::from_row).db()?;
        let filers = rows
            .map(|row| row.db().and_then(FilerRow::into_filer))
            .collect::<Result<Vec<_>>>()?;
        Ok(filers)
    }

    /// Change a filer's tracking status. Returns false for an unknown filer.
    pub fn set_filer_status(&self, name: &str, status: FilerStatus) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE filers SET status = ?2, updated_at = ?3 WHERE name = ?1",
                params![name, status.as_str(), now()],
            )
            .db()?;
        Ok(changed > 0)
    }

    /// Delete a filer with all of its filings and trades. Returns the number
    /// of filings removed.
    pub fn clear_filer(&mut self, name: &str) -> Result<usize> {
        let tx = self.conn.transaction().db()?;
        let trades = tx
            .execute("DELETE FROM trades WHERE filer = ?1", params![name])
            .db()?;
        let filings = tx
            .execute("DELETE FROM filings WHERE filer = ?1", params![name])
            .db()?;
        tx.execute("DELETE FROM filers WHERE name = ?1", params![name])
            .db()?;
        tx.commit().db()?;

        info!(filer = name, filings, trades, "Cleared filer");
        Ok(filings)
    }

    // ========================================================================
    // Filings and trades
    // ========================================================================

    /// Most recently stored filings, newest first, optionally of one filer.
    pub fn recent_filings(&self, filer: Option<&str>, limit: usize) -> Result<Vec<FilingRow>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT filing_id, filer, filing_date, source_url, processed_at, trade_count \
                 FROM filings WHERE ?1 IS NULL OR filer = ?1 \
                 ORDER BY processed_at DESC, id DESC LIMIT ?2",
            )
            .db()?;
        let rows = stmt
            .query_map(params![filer, limit], |row| {
                Ok(FilingRow {
                    filing_id: row.get(0)?,
                    filer: row.get(1)?,
                    filing_date: TradeDate::parse_mdy(&row.get::<_, String>(2)?),
                    source_url: row.get(3)?,
                    processed_at: row.get(4)?,
                    trade_count: row.get::<_, i64>(5)?.max(0) as usize,
                })
            })
            .db()?;
        let filings = rows.collect::<rusqlite::Result<Vec<_>>>().db()?;
        Ok(filings)
    }

    /// Trades of one filing, in the order they were extracted.
    pub fn trades_for_filing(&self, filing_id: &str) -> Result<Vec<TradeRecord>> {
        let trades = self.query_trades("filing_id = ?1", filing_id)?;
        Ok(trades.into_iter().map(|stored| stored.trade).collect())
    }

    /// A filer's trades, latest transaction first. Trades without a known
    /// transaction date come last; ties keep the most recently stored first.
    pub fn trades_for_filer(&self, filer: &str, limit: usize) -> Result<Vec<StoredTrade>> {
        let mut trades = self.query_trades("filer = ?1", filer)?;
        trades.reverse();
        trades.sort_by(|a, b| {
            b.trade
                .transaction_date
                .as_date()
                .cmp(&a.trade.transaction_date.as_date())
        });
        trades.truncate(limit);
        Ok(trades)
    }

    fn query_trades(&self, filter: &str, key: &str) -> Result<Vec<StoredTrade>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TRADE_COLUMNS} FROM trades WHERE {filter} ORDER BY id"
            ))
            .db()?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok(TradeRow {
                    filing_id: row.get(0)?,
                    filer: row.get(1)?,
                    asset_name: row.get(2)?,
                    ticker: row.get(3)?,
                    trade_type: row.get(4)?,
                    action: row.get(5)?,
                    amount_range: row.get(6)?,
                    transaction_date: row.get(7)?,
                    notification_date: row.get(8)?,
                    description: row.get(9)?,
                    source_line: row.get(10)?,
                })
            })
            .db()?;

        let trades = rows
            .map(|row| row.db().and_then(TradeRow::into_stored))
            .collect::<Result<Vec<_>>>()?;
        Ok(trades)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    fn count<P: Params>(&self, sql: &str, params: P) -> Result<u64> {
        let n: i64 = self.conn.query_row(sql, params, |row| row.get(0)).db()?;
        Ok(n.max(0) as u64)
    }

    /// Totals across the whole store.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT filer, COUNT(*) AS n FROM trades \
                 GROUP BY filer ORDER BY n DESC, filer",
            )
            .db()?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FilerCount {
                    filer: row.get(0)?,
                    trades: row.get::<_, i64>(1)?.max(0) as u64,
                })
            })
            .db()?;
        let trades_by_filer = rows.collect::<rusqlite::Result<Vec<_>>>().db()?;

        Ok(StoreStats {
            total_filers: self.count("SELECT COUNT(*) FROM filers", [])?,
            active_filers: self.count("SELECT COUNT(*) FROM filers WHERE status = 'active'", [])?,
            total_filings: self.count("SELECT COUNT(*) FROM filings", [])?,
            total_trades: self.count("SELECT COUNT(*) FROM trades", [])?,
            recent_filings_7d: self.count(
                "SELECT COUNT(*) FROM filings WHERE processed_at >= ?1",
                params![week_ago()],
            )?,
            trades_by_filer,
        })
    }

    /// Counters of one filer. An unknown filer has all counters at zero.
    pub fn filer_stats(&self, filer: &str) -> Result<FilerStats> {
        let last_processed_at: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(processed_at) FROM filings WHERE filer = ?1",
                params![filer],
                |row| row.get(0),
            )
            .db()?;

        Ok(FilerStats {
            filer: filer.to_string(),
            filings: self.count("SELECT COUNT(*) FROM filings WHERE filer = ?1", params![filer])?,
            trades: self.count("SELECT COUNT(*) FROM trades WHERE filer = ?1", params![filer])?,
            recent_filings_7d: self.count(
                "SELECT COUNT(*) FROM filings WHERE filer = ?1 AND processed_at >= ?2",
                params![filer, week_ago()],
            )?,
            last_processed_at,
        })
    }
}

impl FilingSink for SqliteStore {
    fn is_processed(&self, filing_id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM filings WHERE filing_id = ?1",
                params![filing_id],
                |_| Ok(()),
            )
            .optional()
            .db()?;
        Ok(found.is_some())
    }

    /// Store a filing and replace any trades previously stored for it.
    fn store_filing(&mut self, filing: &Filing, trades: &[TradeRecord]) -> Result<()> {
        validate_filer_name(&filing.filer)?;
        if !filing.filing_date.is_known() {
            warn!(filing_id = %filing.filing_id, "Storing filing without a filing date");
        }
        let now = now();
        let tx = self.conn.transaction().db()?;

        let registered = tx
            .query_row(
                "SELECT 1 FROM filers WHERE name = ?1",
                params![filing.filer],
                |_| Ok(()),
            )
            .optional()
            .db()?
            .is_some();
        if !registered {
            warn!(filer = %filing.filer, "Storing filing for an unregistered filer");
        }

        tx.execute(
            "INSERT INTO filings (filing_id, filer, filing_date, source_url, processed_at, \
             trade_count) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(filing_id) DO UPDATE SET \
                 filer = excluded.filer, \
                 filing_date = excluded.filing_date, \
                 source_url = excluded.source_url, \
                 processed_at = excluded.processed_at, \
                 trade_count = excluded.trade_count",
            params![
                filing.filing_id,
                filing.filer,
                filing.filing_date.to_string(),
                filing.source_url,
                now,
                trades.len() as i64,
            ],
        )
        .db()?;
        tx.execute(
            "DELETE FROM trades WHERE filing_id = ?1",
            params![filing.filing_id],
        )
        .db()?;

        {
            let mut insert = tx
                .prepare(&format!(
                    "INSERT INTO trades ({TRADE_COLUMNS}, extracted_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ))
                .db()?;
            for trade in trades {
                insert
                    .execute(params![
                        filing.filing_id,
                        filing.filer,
                        trade.asset_name,
                        trade.ticker.to_column(),
                        trade.kind.as_str(),
                        trade.action.as_str(),
                        trade.amount_range_raw,
                        trade.transaction_date.to_string(),
                        trade.notification_date.to_string(),
                        trade.description,
                        trade.source_line,
                        now,
                    ])
                    .db()?;
            }
        }

        tx.commit().db()?;
        debug!(
            filing_id = %filing.filing_id,
            filer = %filing.filer,
            trades = trades.len(),
            "Stored filing"
        );
        Ok(())
    }
}

/// Raw column values of one `filers` row.
struct FilerRow {
    name: String,
    full_name: String,
    search_name: String,
    party: String,
    state: String,
    chamber: String,
    status: String,
}

impl FilerRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            full_name: row.get(1)?,
            search_name: row.get(2)?,
            party: row.get(3)?,
            state: row.get(4)?,
            chamber: row.get(5)?,
            status: row.get(6)?,
        })
    }

    fn into_filer(self) -> Result<Filer> {
        Ok(Filer {
            chamber: self.chamber.parse()?,
            status: self.status.parse()?,
            name: self.name,
            full_name: self.full_name,
            search_name: self.search_name,
            party: self.party,
            state: self.state,
        })
    }
}

/// Raw column values of one `trades` row.
struct TradeRow {
    filing_id: String,
    filer: String,
    asset_name: String,
    ticker: Option<String>,
    trade_type: String,
    action: String,
    amount_range: String,
    transaction_date: String,
    notification_date: String,
    description: String,
    source_line: String,
}

impl TradeRow {
    fn into_stored(self) -> Result<StoredTrade> {
        let kind = TradeKind::from_name(&self.trade_type)
            .ok_or_else(|| Error::database(format!("unknown trade_type '{}'", self.trade_type)))?;
        let action = TradeAction::from_name(&self.action)
            .ok_or_else(|| Error::database(format!("unknown action '{}'", self.action)))?;

        Ok(StoredTrade {
            filing_id: self.filing_id,
            filer: self.filer,
            trade: TradeRecord {
                asset_name: self.asset_name,
                ticker: Ticker::from_column(self.ticker.as_deref())?,
                kind,
                action,
                amount_range_raw: self.amount_range,
                transaction_date: TradeDate::parse_mdy(&self.transaction_date),
                notification_date: TradeDate::parse_mdy(&self.notification_date),
                description: self.description,
                source_line: self.source_line,
            },
        })
    }
}
