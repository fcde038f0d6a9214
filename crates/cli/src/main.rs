//! ptr-extract: pull trades out of Periodic Transaction Report text.
//!
//! Commands:
//! - `parse` - extract trades from a text file, optionally storing them
//! - `filings` - list recently stored filings
//! - `trades` - show the stored trades of one filing or one filer
//! - `stats` - store or per-filer totals
//! - `filers` - manage the filer registry

mod notifier;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use notifier::LogNotifier;
use ptr_core::{Chamber, Config, Filer, FilerStatus, Filing, FilingSink, TradeNotifier};
use ptr_ingestion::{ParsedDocument, PtrParser};
use ptr_store::SqliteStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ptr-extract",
    about = "Extract trades from Periodic Transaction Report text"
)]
struct Cli {
    /// JSON configuration file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database. Overrides `storage.database_path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract trades from a text file (PDF text, pages concatenated).
    Parse {
        /// Input text file.
        input: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Render amount ranges as `$1M-$5M`.
        #[arg(long, default_value_t = false)]
        compact: bool,

        /// Store the trades under this filing id.
        #[arg(long, requires = "filer")]
        filing_id: Option<String>,

        /// Registry name of the filer the report belongs to.
        #[arg(long, requires = "filing_id")]
        filer: Option<String>,

        /// Source URL recorded with the filing.
        #[arg(long, requires = "filing_id")]
        source_url: Option<String>,

        /// Store even if the filing was already processed.
        #[arg(long, default_value_t = false, requires = "filing_id")]
        force: bool,
    },
    /// List recently stored filings.
    Filings {
        /// Only filings of this filer.
        #[arg(long)]
        filer: Option<String>,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Show the stored trades of one filing, or the latest of one filer.
    Trades {
        #[arg(required_unless_present = "filer")]
        filing_id: Option<String>,

        /// Latest trades of this filer instead of one filing.
        #[arg(long, conflicts_with = "filing_id")]
        filer: Option<String>,

        /// Maximum number of filer trades.
        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Store totals, or the totals of one filer.
    Stats {
        #[arg(long)]
        filer: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Manage the filer registry.
    Filers {
        #[command(subcommand)]
        action: FilerAction,
    },
}

#[derive(Subcommand)]
enum FilerAction {
    /// List registered filers.
    List {
        #[arg(long, default_value_t = false)]
        active_only: bool,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Register or update a filer.
    Add {
        /// Registry name (e.g. "pelosi").
        name: String,
        /// Full name (e.g. "Nancy Pelosi").
        full_name: String,
        /// Name as the disclosure search lists it (e.g. "Pelosi, Nancy").
        search_name: String,

        #[arg(long, default_value = "")]
        party: String,

        #[arg(long, default_value = "")]
        state: String,

        #[arg(long, default_value = "House")]
        chamber: Chamber,

        #[arg(long, default_value = "active")]
        status: FilerStatus,
    },
    /// Show one filer and its totals.
    Show { name: String },
    /// Change a filer's tracking status.
    SetStatus { name: String, status: FilerStatus },
    /// Delete a filer with all of its filings and trades.
    Remove { name: String },
    /// Register every filer from the configuration file.
    Sync,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path));

    match cli.command {
        Commands::Parse {
            input,
            format,
            compact,
            filing_id,
            filer,
            source_url,
            force,
        } => {
            let parser = PtrParser::new(&config).context("Failed to build parser")?;
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let doc = parser
                .parse_bytes(&bytes)
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
                Format::Table => print!("{}", output::document_summary(&doc, compact)),
            }

            if let (Some(filing_id), Some(filer)) = (filing_id, filer) {
                let filing = Filing {
                    filing_id,
                    filer,
                    filing_date: doc.filing_date,
                    source_url,
                };
                let mut store = open_store(&db_path)?;
                register_filer(&store, &config, &filing.filer)?;
                store_and_notify(&mut store, &LogNotifier, &filing, &doc, force)?;
            }
        }
        Commands::Filings {
            filer,
            limit,
            format,
        } => {
            let rows = open_store(&db_path)?.recent_filings(filer.as_deref(), limit)?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                Format::Table => print!("{}", output::filings_table(&rows)),
            }
        }
        Commands::Trades {
            filing_id,
            filer,
            limit,
            format,
        } => {
            let store = open_store(&db_path)?;
            match (filer, filing_id) {
                (Some(filer), _) => {
                    let trades = store.trades_for_filer(&filer, limit)?;
                    match format {
                        Format::Json => println!("{}", serde_json::to_string_pretty(&trades)?),
                        Format::Table => print!("{}", output::filer_trades_table(&trades)),
                    }
                }
                (None, Some(filing_id)) => {
                    let trades = store.trades_for_filing(&filing_id)?;
                    match format {
                        Format::Json => println!("{}", serde_json::to_string_pretty(&trades)?),
                        Format::Table => print!("{}", output::trades_table(&trades, false)),
                    }
                }
                (None, None) => anyhow::bail!("either a filing id or --filer is required"),
            }
        }
        Commands::Stats { filer, format } => {
            let store = open_store(&db_path)?;
            match filer {
                Some(filer) => {
                    let stats = store.filer_stats(&filer)?;
                    match format {
                        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                        Format::Table => print!("{}", output::filer_stats_text(&stats)),
                    }
                }
                None => {
                    let stats = store.stats()?;
                    match format {
                        Format::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                        Format::Table => print!("{}", output::stats_text(&stats)),
                    }
                }
            }
        }
        Commands::Filers { action } => {
            let mut store = open_store(&db_path)?;
            run_filer_action(&mut store, &config, action)?;
        }
    }

    Ok(())
}

fn run_filer_action(store: &mut SqliteStore, config: &Config, action: FilerAction) -> Result<()> {
    match action {
        FilerAction::List {
            active_only,
            format,
        } => {
            let filers = store.list_filers(active_only)?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&filers)?),
                Format::Table => print!("{}", output::filers_table(&filers)),
            }
        }
        FilerAction::Add {
            name,
            full_name,
            search_name,
            party,
            state,
            chamber,
            status,
        } => {
            let filer = Filer {
                name,
                full_name,
                search_name,
                party,
                state,
                chamber,
                status,
            };
            store.upsert_filer(&filer)?;
            println!("Registered {} ({})", filer.name, filer.full_name);
        }
        FilerAction::Show { name } => {
            let filer = store
                .filer(&name)?
                .with_context(|| format!("Filer '{name}' is not registered"))?;
            let stats = store.filer_stats(&name)?;
            print!("{}", output::filer_text(&filer, &stats));
        }
        FilerAction::SetStatus { name, status } => {
            if !store.set_filer_status(&name, status)? {
                anyhow::bail!("Filer '{name}' is not registered");
            }
            println!("{name}: {status}");
        }
        FilerAction::Remove { name } => {
            let filings = store.clear_filer(&name)?;
            println!("Removed {name} and {filings} filings");
        }
        FilerAction::Sync => {
            for filer in &config.filers {
                store.upsert_filer(filer)?;
            }
            println!("Registered {} filers", config.filers.len());
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn open_store(path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Copy a filer's configured registry entry into the store. Returns whether
/// the configuration knows the filer.
fn register_filer(store: &SqliteStore, config: &Config, name: &str) -> Result<bool> {
    match config.filer(name) {
        Some(filer) => {
            store.upsert_filer(filer)?;
            Ok(true)
        }
        None => {
            warn!(filer = name, "Filer is not in the configuration registry");
            Ok(false)
        }
    }
}

/// Store a parsed filing once, then hand every trade to the notifier.
/// Returns whether the filing was stored.
fn store_and_notify(
    sink: &mut dyn FilingSink,
    notifier: &dyn TradeNotifier,
    filing: &Filing,
    doc: &ParsedDocument,
    force: bool,
) -> Result<bool> {
    if !force && sink.is_processed(&filing.filing_id)? {
        info!(filing_id = %filing.filing_id, "Filing already processed, skipping");
        return Ok(false);
    }

    sink.store_filing(filing, &doc.trades)?;
    for trade in &doc.trades {
        notifier.notify(filing, trade)?;
    }
    info!(
        filing_id = %filing.filing_id,
        trades = doc.trades.len(),
        "Stored filing"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptr_core::{TradeDate, TradeRecord};
    use std::cell::RefCell;
    use std::io::Write;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: RefCell<Vec<String>>,
    }

    impl TradeNotifier for RecordingNotifier {
        fn notify(&self, _filing: &Filing, trade: &TradeRecord) -> ptr_core::Result<()> {
            self.seen.borrow_mut().push(trade.asset_name.clone());
            Ok(())
        }
    }

    fn make_doc() -> ParsedDocument {
        PtrParser::with_defaults().unwrap().parse_text(
            "Filing Date: 02/15/2024\n\
             SP ACME CORP P 01/02/2024 01/10/2024 $15,001 -\n\
             [OT] $50,000\n\
             SP WIDGET CO P 03/01/2024 03/05/2024 $1,001 -\n\
             (WDG) $15,000",
        )
    }

    #[test]
    fn test_store_and_notify_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::default();
        let doc = make_doc();
        let filing = Filing {
            filing_id: "20024542".to_string(),
            filer: "pelosi".to_string(),
            filing_date: doc.filing_date,
            source_url: None,
        };

        assert!(store_and_notify(&mut store, &notifier, &filing, &doc, false).unwrap());
        assert!(!store_and_notify(&mut store, &notifier, &filing, &doc, false).unwrap());
        assert_eq!(*notifier.seen.borrow(), vec!["ACME CORP", "WIDGET CO"]);

        assert!(store_and_notify(&mut store, &notifier, &filing, &doc, true).unwrap());
        assert_eq!(notifier.seen.borrow().len(), 4);
        assert_eq!(store.trades_for_filing("20024542").unwrap().len(), 2);
        assert_eq!(
            store.recent_filings(Some("pelosi"), 1).unwrap()[0].filing_date,
            TradeDate::parse_mdy("02/15/2024")
        );
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"extraction": {{"lead_token": "JT"}}}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.extraction.lead_token, "JT");
        assert_eq!(load_config(None).unwrap(), Config::default());
    }

    #[test]
    fn test_cli_parses_arguments() {
        let cli = Cli::try_parse_from([
            "ptr-extract",
            "-vv",
            "parse",
            "report.txt",
            "--format",
            "json",
            "--filing-id",
            "20024542",
            "--filer",
            "pelosi",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Parse {
                format,
                filing_id,
                filer,
                ..
            } => {
                assert_eq!(format, Format::Json);
                assert_eq!(filing_id.as_deref(), Some("20024542"));
                assert_eq!(filer.as_deref(), Some("pelosi"));
            }
            _ => panic!("expected parse command"),
        }

        assert!(Cli::try_parse_from(["ptr-extract", "parse", "x.txt", "--force"]).is_err());
        assert!(
            Cli::try_parse_from(["ptr-extract", "parse", "x.txt", "--filing-id", "1"]).is_err()
        );
    }

    #[test]
    fn test_cli_parses_filer_commands() {
        let cli = Cli::try_parse_from([
            "ptr-extract",
            "filers",
            "add",
            "tuberville",
            "Tommy Tuberville",
            "Tuberville, Tommy",
            "--chamber",
            "senate",
            "--status",
            "inactive",
        ])
        .unwrap();
        match cli.command {
            Commands::Filers {
                action:
                    FilerAction::Add {
                        name,
                        chamber,
                        status,
                        party,
                        ..
                    },
            } => {
                assert_eq!(name, "tuberville");
                assert_eq!(chamber, Chamber::Senate);
                assert_eq!(status, FilerStatus::Inactive);
                assert_eq!(party, "");
            }
            _ => panic!("expected filers add command"),
        }

        let cli = Cli::try_parse_from(["ptr-extract", "trades", "--filer", "pelosi"]).unwrap();
        match cli.command {
            Commands::Trades {
                filing_id,
                filer,
                limit,
                ..
            } => {
                assert_eq!(filing_id, None);
                assert_eq!(filer.as_deref(), Some("pelosi"));
                assert_eq!(limit, 50);
            }
            _ => panic!("expected trades command"),
        }

        assert!(Cli::try_parse_from(["ptr-extract", "trades"]).is_err());
        assert!(Cli::try_parse_from(["ptr-extract", "trades", "1", "--filer", "pelosi"]).is_err());
        assert!(Cli::try_parse_from(["ptr-extract", "filers", "set-status", "x", "retired"]).is_err());
    }

    fn make_config() -> Config {
        Config::from_json_str(
            r#"{"filers": [
                {"name": "pelosi", "full_name": "Nancy Pelosi", "search_name": "Pelosi, Nancy"},
                {"name": "khanna", "full_name": "Ro Khanna", "search_name": "Khanna, Ro",
                 "status": "inactive"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_register_filer_from_config() {
        let store = SqliteStore::open_in_memory().unwrap();
        let config = make_config();

        assert!(register_filer(&store, &config, "pelosi").unwrap());
        assert!(!register_filer(&store, &config, "nobody").unwrap());
        assert_eq!(
            store.filer("pelosi").unwrap().map(|f| f.full_name),
            Some("Nancy Pelosi".to_string())
        );
        assert_eq!(store.filer("nobody").unwrap(), None);
    }

    #[test]
    fn test_filer_actions() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let config = make_config();

        run_filer_action(&mut store, &config, FilerAction::Sync).unwrap();
        assert_eq!(store.list_filers(false).unwrap().len(), 2);
        assert_eq!(store.list_filers(true).unwrap().len(), 1);

        run_filer_action(
            &mut store,
            &config,
            FilerAction::SetStatus {
                name: "khanna".to_string(),
                status: FilerStatus::Active,
            },
        )
        .unwrap();
        assert_eq!(store.list_filers(true).unwrap().len(), 2);
        assert!(run_filer_action(
            &mut store,
            &config,
            FilerAction::SetStatus {
                name: "nobody".to_string(),
                status: FilerStatus::Active,
            },
        )
        .is_err());

        let doc = make_doc();
        let filing = Filing {
            filing_id: "20024542".to_string(),
            filer: "khanna".to_string(),
            filing_date: doc.filing_date,
            source_url: None,
        };
        store_and_notify(&mut store, &LogNotifier, &filing, &doc, false).unwrap();
        assert_eq!(store.trades_for_filer("khanna", 10).unwrap().len(), 2);

        run_filer_action(
            &mut store,
            &config,
            FilerAction::Remove {
                name: "khanna".to_string(),
            },
        )
        .unwrap();
        assert!(!store.is_processed("20024542").unwrap());
        assert_eq!(store.list_filers(false).unwrap().len(), 1);
        assert!(run_filer_action(
            &mut store,
            &config,
            FilerAction::Show {
                name: "khanna".to_string()
            }
        )
        .is_err());
    }
}
