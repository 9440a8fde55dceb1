use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use zwogen::batch::{self, BatchConfig};
use zwogen::config::{validate_ftp, AppConfig};
use zwogen::export::{self, text::format_clock, ExportFormat};
use zwogen::logging::{init_logging, LogFormat};
use zwogen::presets;
use zwogen::{GeneratorSettings, LocalStore, WorkoutDocument, WorkoutGenerator, ZwoError};

/// zwogen - Workout notation to Zwift workout compiler
///
/// Turns informal coach notation ("6x5' / 3' recovery ...") and named presets
/// into structured `.zwo` workout files.
#[derive(Parser)]
#[command(name = "zwogen")]
#[command(version = "0.1.0")]
#[command(about = "Compile workout notation into Zwift .zwo files", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a free-text workout description
    Generate {
        /// Workout name
        #[arg(short, long)]
        name: String,

        /// Workout notation (empty uses a canned template)
        #[arg(short, long, conflicts_with = "file")]
        description: Option<String>,

        /// Read the notation from a file, `-` for stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a named preset workout
    Preset {
        /// Preset key, see `zwogen presets`
        key: String,

        /// Number of repeats (preset default if omitted)
        #[arg(short, long)]
        repeats: Option<u32>,

        /// Workout name (preset title if omitted)
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List available presets
    Presets,

    /// Generate every workout in a JSON batch file
    Batch {
        /// JSON array of {"workout_name", "description"} objects
        #[arg(short, long)]
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// FTP baseline in watts
        #[arg(long)]
        ftp: Option<u16>,

        /// Worker threads (default: one per CPU)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Manage configuration
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// FTP baseline in watts
    #[arg(long)]
    ftp: Option<u16>,

    /// Print instead of saving
    #[arg(long)]
    dry_run: bool,

    /// Dry-run format (zwo, json, text)
    #[arg(long, default_value = "zwo")]
    format: String,
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "Repeats")]
    repeats: u32,
    #[tabled(rename = "Summary")]
    summary: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref());
    config.logging.level = config.logging.level.raised_by(cli.verbose);
    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    }
    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Generate {
            name,
            description,
            file,
            output,
        } => {
            let notation = match (description, file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_notation(&path)?,
                (None, None) => String::new(),
            };
            let generator = build_generator(&config, &output.output_dir, output.ftp)?;
            let document = generator.build_document(&name, &notation).map_err(friendly)?;
            emit(&generator, document, &output)?;
        }

        Commands::Preset {
            key,
            repeats,
            name,
            output,
        } => {
            let generator = build_generator(&config, &output.output_dir, output.ftp)?;
            let document = generator
                .build_preset(&key, repeats, name.as_deref())
                .map_err(friendly)?;
            emit(&generator, document, &output)?;
        }

        Commands::Presets => {
            let rows: Vec<PresetRow> = presets::all()
                .into_iter()
                .map(|preset| PresetRow {
                    key: preset.key,
                    title: preset.title,
                    repeats: preset.default_repeats,
                    summary: preset.summary,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Batch {
            file,
            output_dir,
            ftp,
            threads,
            no_progress,
        } => {
            let entries = batch::load_entries(&file)
                .with_context(|| format!("Failed to load batch file: {}", file.display()))?;
            let generator = build_generator(&config, &output_dir, ftp)?;
            let batch_config = BatchConfig {
                num_threads: threads,
                show_progress: !no_progress,
            };

            println!("{}", format!("Generating {} workouts...", entries.len()).green().bold());
            let summary = batch::run_batch(&generator, &entries, &batch_config).map_err(friendly)?;

            for result in &summary.results {
                match (&result.path, &result.error) {
                    (Some(path), _) => println!("  {} {}", "✓".green(), path.display()),
                    (None, Some(error)) => {
                        println!("  {} {}: {}", "✗".red(), result.workout_name, error)
                    }
                    (None, None) => {}
                }
            }
            println!("{}", summary.to_string_pretty());

            if !summary.is_fully_successful() {
                anyhow::bail!("{} of {} workouts failed", summary.failed, summary.total);
            }
        }

        Commands::Config { init, show, path } => {
            let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

            if init {
                if config_path.exists() {
                    anyhow::bail!("Config file already exists: {}", config_path.display());
                }
                let mut fresh = AppConfig::default();
                fresh.save_to_file(&config_path)?;
                println!("{} {}", "✓ Wrote".green(), config_path.display());
            }
            if path {
                println!("{}", config_path.display());
            }
            if show || !(init || path) {
                println!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
            }
        }
    }

    Ok(())
}

fn build_generator(
    config: &AppConfig,
    output_dir: &Option<PathBuf>,
    ftp: Option<u16>,
) -> Result<WorkoutGenerator<LocalStore>> {
    let mut settings = GeneratorSettings::from_config(config);
    if let Some(ftp) = ftp {
        settings.ftp = validate_ftp(ftp)?;
    }

    let directory = output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    Ok(WorkoutGenerator::new(LocalStore::new(directory), settings))
}

fn emit(generator: &WorkoutGenerator<LocalStore>, document: WorkoutDocument, output: &OutputArgs) -> Result<()> {
    if output.dry_run {
        let format = ExportFormat::from_str(&output.format).map_err(friendly)?;
        let rendered = export::render(&document, format, &generator.settings().author).map_err(friendly)?;
        println!("{}", rendered);
        return Ok(());
    }

    let generated = generator.save_document(document).map_err(friendly)?;
    println!("{} {}", "✓ Saved".green().bold(), generated.path.display());
    println!(
        "  {} segments, {} total",
        generated.document.segments.len(),
        format_clock(generated.document.total_duration())
    );
    Ok(())
}

fn read_notation(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read notation from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read notation file: {}", path.display()))
}

fn friendly(err: ZwoError) -> anyhow::Error {
    tracing::debug!(error = ?err, severity = ?err.severity(), "Command failed");
    anyhow::anyhow!(err.user_message())
}
