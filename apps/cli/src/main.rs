//! Ward console entry point
//!
//! Runs the interactive menu by default. One-shot subcommands print the ward
//! or re-encode its store without entering the menu.

mod config;
mod logging;
mod menu;
mod render;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use ward_ledger::{FileStore, RecordStore, StoreFormat, Ward};

use crate::config::AppConfig;
use crate::menu::Menu;

#[derive(Parser, Debug)]
#[clap(name = "ward", version)]
#[clap(about = "Admit, bill and discharge patients of a single ward")]
struct Cli {
    /// Configuration file (defaults to ./ward.toml when present)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Ward store file
    #[clap(long, global = true)]
    data_file: Option<PathBuf>,

    /// Number of beds in the ward
    #[clap(long, global = true)]
    capacity: Option<usize>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Print the active patients
    List,
    /// Print one active patient with the bill breakdown
    Show { id: u32 },
    /// Write the current store to another file, optionally in another format
    Export {
        /// Output encoding (legacy or json)
        #[clap(short, long, default_value = "json")]
        format: StoreFormat,

        #[clap(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.data_file {
            config.ward.data_file = path.clone();
        }
        if let Some(capacity) = self.capacity {
            config.ward.capacity = capacity;
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let _log_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_file = %config.ward.data_file.display(),
        capacity = config.ward.capacity,
        format = %config.ward.format,
        "Starting ward console"
    );

    let mut ward = Ward::open(&config.ward).with_context(|| {
        format!(
            "Failed to open ward store {}",
            config.ward.data_file.display()
        )
    })?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            Menu::new(&mut ward, stdin.lock(), io::stdout().lock())
                .run()
                .context("Console I/O failed")?;
        }
        Command::List => {
            let mut out = io::stdout().lock();
            render::patient_table(&mut out, ward.list_active())?;
            out.flush()?;
        }
        Command::Show { id } => {
            let patient = ward
                .find_active(id)
                .ok_or_else(|| anyhow!("Patient not found: {id}"))?;
            let mut out = io::stdout().lock();
            render::patient_details(&mut out, patient)?;
            out.flush()?;
        }
        Command::Export { format, output } => {
            let mut target = FileStore::new(&output, format, config.ward.load_mode);
            target
                .save(ward.ledger())
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!(
                "Exported {} records ({format}) to {}",
                ward.patients().len(),
                output.display()
            );
        }
    }

    Ok(())
}
