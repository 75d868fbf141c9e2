use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use cleaner::display::{show_presets_table, ConsoleReporter};
use cleaner::{find_targets, load_presets, process_targets, DeletionParams};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A tool for quickly cleaning files in the project directory",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available presets
    Presets {
        /// Path to config file [default: cleanerconfig.toml in root of your project]
        #[arg(long = "config", value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Folder names to delete
    #[arg(long, short, value_name = "NAME")]
    dirs: Vec<String>,

    /// File names to delete
    #[arg(long, short, value_name = "NAME")]
    files: Vec<String>,

    /// Patterns to delete, relative to the root
    #[arg(long, short, value_name = "PATTERN")]
    globs: Vec<String>,

    /// Folders to ignore
    #[arg(long = "ignore-dirs", short = 'I', value_name = "NAME")]
    ignored_dirs: Vec<String>,

    /// Files to ignore
    #[arg(long = "ignore-files", short = 'X', value_name = "NAME")]
    ignored_files: Vec<String>,

    /// Root dir where will be deletion [default: current working directory]
    #[arg(long, short, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Preset to use
    #[arg(long = "use", short = 'u', value_name = "PRESET")]
    preset: Option<String>,

    /// Path to config file where presets are [default: cleanerconfig.toml in root of your project]
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Actually delete files instead of dry run
    #[arg(long)]
    delete: bool,
}

impl RunArgs {
    fn overrides(&self) -> DeletionParams {
        DeletionParams {
            dirs: self.dirs.clone(),
            files: self.files.clone(),
            globs: self.globs.clone(),
            ignored_dirs: self.ignored_dirs.clone(),
            ignored_files: self.ignored_files.clone(),
            root: self.root.clone(),
            delete_mode: self.delete,
        }
    }
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Warn)
            .filter_module("cleaner", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
}

fn list_presets(config: Option<PathBuf>) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let presets = load_presets(&cwd, config.as_deref()).context("Failed to load presets")?;
    show_presets_table(&presets);
    Ok(())
}

fn scanning_spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress.set_message("Scanning for targets...");
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn run(args: RunArgs) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let presets = load_presets(&cwd, args.config.as_deref()).context("Failed to load presets")?;

    let base = match &args.preset {
        Some(name) => match presets.get(name) {
            Some(preset) => preset.clone(),
            None => Cli::command()
                .error(ErrorKind::InvalidValue, "There is no preset with such name")
                .exit(),
        },
        None => DeletionParams::default(),
    };

    let params = base.overridden_by(args.overrides());
    if !params.has_targets() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "You must provide at least one of --dirs, --files, or --globs",
            )
            .exit();
    }

    let criteria = params.to_criteria()?;
    let reporter_root = criteria.root().to_path_buf();
    let mut console = ConsoleReporter::new(params.delete_mode);
    console.show_header(&reporter_root);

    let progress = scanning_spinner();
    let targets = find_targets(&criteria);
    progress.finish_and_clear();
    let targets = targets.with_context(|| format!("Failed to scan {}", reporter_root.display()))?;

    process_targets(&mut console, &targets, params.delete_mode);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Presets { config }) => list_presets(config),
        None => run(cli.run),
    }
}
