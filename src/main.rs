use clap::{Parser, Subcommand};
use colored::Colorize;
use cyclesort::cli::{self, Operation, Services};
use cyclesort::config::Settings;
use cyclesort::reporter::{ConsoleReporter, Reporter};
use cyclesort::CancelToken;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "cyclesort")]
#[command(about = "Organize camera files by capture date or by the cycle number in their names.")]
#[command(long_about = "Cyclesort - camera file organizer

COMMANDS:
  phone     - Move pictures and videos into date folders (23-07 July-12)
  roaming   - Rename pictures and videos in place (2024-07-21-09-55-43.jpg)
  fixed     - Move fixed-camera files into <prefix>/CY<n>/<cycle>/
  drift     - Read an input workbook, merge drift levels, move cycle files
  template  - Write a blank input workbook for the drift command

FILENAME GRAMMARS:
  fixed     Left_12619 _2025-11-03-09-54-23_Cy-0.50.jpg
  drift     <anything>2023-12-01-10-47-51_cy 4.5 (00375).jpg

EXAMPLES:
  cyclesort phone ~/DCIM --recursive --hours -2
  cyclesort fixed /data/rig --dry-run
  cyclesort template input.xlsx --folder /data/rig
  cyclesort drift input.xlsx

Settings may also come from a YAML file (--config or CYCLESORT_CONFIG):
  workers: 8
  hour_offset: 0
  dry_run: false
  log_filter: cyclesort=info")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Report what would be moved or renamed without touching any file
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Number of files handled at once
    #[arg(short = 'j', long, global = true, env = "CYCLESORT_WORKERS")]
    workers: Option<usize>,

    /// YAML settings file
    #[arg(short, long, global = true, env = "CYCLESORT_CONFIG")]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Move phone camera files into date folders under FOLDER
    Phone {
        /// Folder holding the files; date folders are created inside it
        folder: PathBuf,

        /// Include subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Hours added to every capture date (may be negative or fractional)
        #[arg(long, allow_negative_numbers = true)]
        hours: Option<f64>,
    },

    /// Rename roaming camera files in place to date-based names
    Roaming {
        /// Folder holding the files
        folder: PathBuf,

        /// Include subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Hours added to every capture date (may be negative or fractional)
        #[arg(long, allow_negative_numbers = true)]
        hours: Option<f64>,
    },

    /// Move fixed-camera files into the cycle layout under FOLDER
    Fixed {
        /// Folder holding the files
        folder: PathBuf,

        /// Include subfolders
        #[arg(short, long)]
        recursive: bool,
    },

    #[command(long_about = "Read the first worksheet of an input workbook:

  Inputs
  Folder Address | /data/rig
  Recursive      | TRUE

  Data
  Cycle | Drift Level | Cycle Type
  0.50  | 1.2         | Push
  4.50  | -0.3        | Pull

Files under Folder Address whose names carry a cycle number are moved into
<prefix>/CY<n>/<cycle>/ and renamed. When the Data table has a row for the
file's exact cycle number, its drift level and cycle type are added to the name.")]
    /// Merge drift levels from an input workbook and move cycle files
    Drift {
        /// Input workbook (.xlsx)
        workbook: PathBuf,
    },

    /// Write a blank input workbook for the drift command
    Template {
        /// Output workbook (.xlsx)
        output: PathBuf,

        /// Value written to Folder Address
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Value written to Recursive
        #[arg(short, long)]
        recursive: bool,
    },
}

impl Commands {
    fn hours(&self) -> Option<f64> {
        match self {
            Commands::Phone { hours, .. } | Commands::Roaming { hours, .. } => *hours,
            _ => None,
        }
    }

    fn into_operation(self, settings: &Settings) -> Operation {
        match self {
            Commands::Phone {
                folder, recursive, ..
            } => Operation::OrganizePhoneCamera {
                folder,
                recursive,
                hour_offset: settings.hour_offset,
            },
            Commands::Roaming {
                folder, recursive, ..
            } => Operation::RenameRoamingCamera {
                folder,
                recursive,
                hour_offset: settings.hour_offset,
            },
            Commands::Fixed { folder, recursive } => {
                Operation::MoveFixedCamera { folder, recursive }
            }
            Commands::Drift { workbook } => Operation::AddDriftLevel { workbook },
            Commands::Template {
                output,
                folder,
                recursive,
            } => Operation::WriteTemplate {
                output,
                folder: folder.unwrap_or_default(),
                recursive,
            },
        }
    }
}

fn init_tracing(settings: &Settings, verbose: bool) {
    let fallback = if verbose {
        "cyclesort=debug".to_string()
    } else {
        settings.log_filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.workers,
        cli.dry_run,
        cli.command.hours(),
    )?;
    init_tracing(&settings, cli.verbose);

    let reporter: Arc<dyn Reporter> = Arc::new(ConsoleReporter::new());
    let services = Services::new(&settings, reporter);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping before the next file");
                cancel.cancel();
            }
        });
    }

    if settings.dry_run {
        println!(
            "{}",
            "📋 DRY RUN MODE - No files will be moved or renamed\n".yellow()
        );
    }

    let operation = cli.command.into_operation(&settings);
    cli::run(operation, &services, &cancel).await?;

    Ok(())
}
