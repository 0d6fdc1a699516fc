use clap::{Parser, Subcommand};
use sizegate::command::CompressCommand;
use sizegate::config::{self, PipelineConfig};
use sizegate::output;
use std::path::{Path, PathBuf};

/// Shared flags for commands that run the pipeline.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Config file (default: sizegate.toml in the current directory, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the recursive leftover sweep after the main pass
    #[arg(long)]
    no_sweep: bool,
}

#[derive(Parser)]
#[command(name = "sizegate")]
#[command(about = "Keep every image in a folder under a byte ceiling")]
#[command(long_about = "\
Keep every image in a folder under a byte ceiling

Each image directly inside SOURCE is checked against the ceiling (5 MiB by
default) and ends in exactly one of two folders under TARGET:

  TARGET/
  ├── compressed_images/        # At or under the ceiling
  │   ├── photo.jpg             # Already small enough, moved unchanged
  │   ├── big.jpg               # Re-encoded at quality 85
  │   └── huge.jpg              # Also shrunk to fit 1920x1080
  └── incompatible_originals/   # Originals that could not be reduced
      └── unshrinkable.jpg

Accepted extensions: png, jpg, jpeg, bmp, tiff (any case). Subfolders of
SOURCE are not entered; afterwards a sweep moves any image anywhere under
TARGET that is still over the ceiling into incompatible_originals.

Facetune exports lose their date: Facetune_01-02-2023-10-11-12.jpg becomes
Facetune_10-11-12.jpg. Existing files are never overwritten; clashing names
get a -1, -2, ... suffix.

Run 'sizegate gen-config' to generate a documented sizegate.toml.")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route the images in SOURCE into folders under TARGET
    Run {
        /// Directory holding the images
        source: PathBuf,
        /// Directory the destination folders are created in (default: SOURCE)
        target: Option<PathBuf>,
        #[command(flatten)]
        args: RunArgs,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pick the folders with native dialogs, then run
    #[cfg(feature = "dialogs")]
    Pick(RunArgs),
    /// Print a stock sizegate.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Run {
            source,
            target,
            args,
            json,
        } => {
            let config = resolve_config(&args)?;
            let max_bytes = config.max_bytes;
            let target = target.unwrap_or_else(|| source.clone());
            let report = CompressCommand::new(Some(source), Some(target), config)?.execute()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_report(&report, max_bytes);
            }
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        #[cfg(feature = "dialogs")]
        Command::Pick(args) => {
            let config = resolve_config(&args)?;
            dialogs::pick_and_run(config);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config named on the command line, or `sizegate.toml` from the
/// current directory, then apply flag overrides.
fn resolve_config(args: &RunArgs) -> Result<PipelineConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    if args.no_sweep {
        config.sweep = false;
    }
    Ok(config)
}

#[cfg(feature = "dialogs")]
mod dialogs {
    use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
    use sizegate::command::{CommandError, CompressCommand};
    use sizegate::config::PipelineConfig;
    use sizegate::output::format_summary;
    use sizegate::pipeline::RunReport;

    /// Two folder pickers, one run, one result dialog.
    pub fn pick_and_run(config: PipelineConfig) {
        let source = FileDialog::new()
            .set_title("Select Folder with Images")
            .pick_folder();
        let target = source.as_ref().and_then(|_| {
            FileDialog::new()
                .set_title("Select Destination Folder")
                .pick_folder()
        });

        let result = CompressCommand::new(source, target, config).and_then(|cmd| cmd.execute());
        show_result(&result);
    }

    fn show_result(result: &Result<RunReport, CommandError>) {
        let (level, title, text) = match result {
            Ok(report) if report.is_success() => (
                MessageLevel::Info,
                "Done",
                format_summary(&report.summary),
            ),
            Ok(report) => (
                MessageLevel::Warning,
                "Finished with failures",
                format!(
                    "{} file(s) could not be moved.\n{}",
                    report.failures(),
                    format_summary(&report.summary)
                ),
            ),
            Err(e) => (MessageLevel::Error, "Error", e.to_string()),
        };
        MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(text)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
