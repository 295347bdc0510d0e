use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use adspend::export::{export_to_path, import_from_path, to_json};
use adspend::fmt::{breakdown_table, entries_table, money};
use adspend::{
    summarize, telemetry, AccessContext, Config, EntryForm, EntryService, ExportFormat,
    FilterSet, MediaType, SqliteStore, ALL,
};

/// Advertising spend tracker
#[derive(Parser)]
#[command(name = "adspend", version)]
struct Cli {
    /// Database path (defaults to ADSPEND_DB_PATH or ./adspend.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every entry
    List,
    /// Add a new entry
    Add {
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        month: String,
        #[arg(long, default_value = "2026")]
        year: String,
        #[arg(long, value_enum, default_value_t = MediaArg::Radio)]
        media_type: MediaArg,
        #[arg(long)]
        amount: String,
    },
    /// Change fields of an existing entry
    Edit {
        id: String,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_enum)]
        media_type: Option<MediaArg>,
        #[arg(long)]
        amount: Option<String>,
    },
    /// Delete an entry by id
    Delete { id: String },
    /// Total spending and monthly breakdown
    Summary {
        #[arg(long, default_value = ALL)]
        vendor: String,
        #[arg(long, default_value = ALL)]
        location: String,
        #[arg(long, default_value = ALL)]
        media_type: String,
        #[arg(long, default_value = ALL)]
        year: String,
        #[arg(long, default_value = ALL)]
        month: String,
    },
    /// Write the collection to a file (or stdout as JSON)
    Export {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Save every entry from a JSON or CSV export
    Import { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaArg {
    Radio,
    Digital,
}

impl From<MediaArg> for MediaType {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Radio => MediaType::Radio,
            MediaArg::Digital => MediaType::Digital,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    telemetry::init_tracing("warn", config.log_json);

    let db_path = cli.db.unwrap_or(config.db_path.clone());
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let service = EntryService::new(store);

    // Anyone who can open the database file can already rewrite it
    let admin = AccessContext::Admin;

    match cli.command {
        Command::List => {
            let entries = service.list()?;
            print!("{}", entries_table(&entries));
            println!("{} entries", entries.len());
        }
        Command::Add {
            vendor,
            location,
            month,
            year,
            media_type,
            amount,
        } => {
            let form = EntryForm {
                vendor,
                location,
                month,
                year,
                media_type: media_type.into(),
                amount,
            };
            let entry = form.into_entry(None)?;
            let id = entry.id.clone();
            service.save(&admin, entry)?;
            println!("✓ Added entry {}", id);
        }
        Command::Edit {
            id,
            vendor,
            location,
            month,
            year,
            media_type,
            amount,
        } => {
            let entries = service.list()?;
            let Some(existing) = entries.iter().find(|e| e.id == id) else {
                bail!("No entry with id {}", id);
            };

            let mut form = EntryForm::from(existing);
            if let Some(v) = vendor {
                form.vendor = v;
            }
            if let Some(v) = location {
                form.location = v;
            }
            if let Some(v) = month {
                form.month = v;
            }
            if let Some(v) = year {
                form.year = v;
            }
            if let Some(v) = media_type {
                form.media_type = v.into();
            }
            if let Some(v) = amount {
                form.amount = v;
            }

            let entry = form.into_entry(Some(id.clone()))?;
            service.save(&admin, entry)?;
            println!("✓ Updated entry {}", id);
        }
        Command::Delete { id } => {
            let before = service.list()?.len();
            let after = service.delete(&admin, &id)?.len();
            if before == after {
                println!("No entry with id {}", id);
            } else {
                println!("✓ Deleted entry {}", id);
            }
        }
        Command::Summary {
            vendor,
            location,
            media_type,
            year,
            month,
        } => {
            let filters = FilterSet {
                vendor,
                location,
                media_type,
                year,
                month,
            };
            let entries = service.list()?;
            let summary = summarize(&entries, &filters);

            println!("Total Spending: {}", money(summary.total));
            println!("Entries: {}\n", summary.entries.len());
            if summary.breakdown.columns.is_empty() {
                println!("No entries match the selected filters");
            } else {
                print!("{}", breakdown_table(&summary.breakdown));
            }
        }
        Command::Export { format, output } => {
            let entries = service.list()?;
            match output {
                Some(path) => {
                    let format = format
                        .map(ExportFormat::from)
                        .unwrap_or_else(|| ExportFormat::from_path(&path));
                    export_to_path(&path, format, &entries)?;
                    println!("✓ Exported {} entries to {}", entries.len(), path.display());
                }
                None => match format.map(ExportFormat::from) {
                    Some(ExportFormat::Csv) => {
                        adspend::export::write_csv(std::io::stdout().lock(), &entries)?
                    }
                    _ => println!("{}", to_json(&entries)?),
                },
            }
        }
        Command::Import { path } => {
            let entries = import_from_path(&path)?;
            let count = entries.len();
            for entry in entries {
                service.save(&admin, entry)?;
            }
            println!("✓ Imported {} entries from {}", count, path.display());
        }
    }

    Ok(())
}
