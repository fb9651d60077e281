//! CLI entry point for `mailverdict`.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailverdict::batch::{self, AnalyzeOptions, BatchSummary, FileOutcome};
use mailverdict::config::{self, Config};
use mailverdict::export;
use mailverdict::model::report::FileReport;

#[derive(Parser)]
#[command(
    name = "mailverdict",
    version,
    about = "Inspect .eml and .msg headers and flag messages that look forged, exported or never sent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more .eml / .msg files
    Analyze {
        /// Files to analyze
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Write the JSON records to this file ("-" for stdout)
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
        /// Write the records as CSV to this file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Skip files larger than this many bytes
        #[arg(long, value_name = "BYTES")]
        max_size: Option<u64>,
        /// Rejoin folded lines in .msg transport headers
        #[arg(long)]
        unfold_msg_headers: bool,
        /// Never color the verdict
        #[arg(long)]
        no_color: bool,
        /// Do not print the per-file text report
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Analyze {
            files,
            json,
            csv,
            max_size,
            unfold_msg_headers,
            no_color,
            quiet,
        } => {
            let mut options = AnalyzeOptions::from_config(&config);
            if let Some(limit) = max_size {
                options.max_file_size = limit;
            }
            if unfold_msg_headers {
                options.parser.unfold_msg_headers = true;
            }
            let output = OutputOptions {
                json: json.as_deref(),
                csv: csv.as_deref(),
                colored: config.export.color && !no_color && std::io::stdout().is_terminal(),
                pretty: config.export.pretty_json,
                quiet,
            };
            cmd_analyze(&files, &options, &output)
        }
        Commands::Config { init } => cmd_config(&config, init),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailverdict.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

struct OutputOptions<'a> {
    json: Option<&'a Path>,
    csv: Option<&'a Path>,
    colored: bool,
    pretty: bool,
    quiet: bool,
}

/// Analyze files, print the report and write the requested exports.
fn cmd_analyze(
    files: &[PathBuf],
    options: &AnalyzeOptions,
    output: &OutputOptions<'_>,
) -> anyhow::Result<()> {
    let json_to_stdout = output.json.is_some_and(|p| p == Path::new("-"));

    let pb = if files.len() > 1 {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Analyzing [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let outcomes = batch::analyze_batch(
        files,
        options,
        Some(&|current, _total| {
            pb.set_position(current as u64);
        }),
    );
    pb.finish_and_clear();

    if !output.quiet && !json_to_stdout {
        for outcome in &outcomes {
            println!("{}", export::text::render_outcome(outcome, output.colored));
        }
    }

    let reports: Vec<&FileReport> = outcomes.iter().filter_map(FileOutcome::report).collect();

    if let Some(path) = output.json {
        if json_to_stdout {
            export::json::write_json(&reports, &mut std::io::stdout().lock(), output.pretty)?;
        } else {
            export::json::export_json(&reports, path, output.pretty)?;
            eprintln!("  Exported {} record(s) to {}", reports.len(), path.display());
        }
    }

    if let Some(path) = output.csv {
        export::csv::export_csv(&reports, path)?;
        eprintln!("  Exported CSV to {}", path.display());
    }

    let summary = BatchSummary::of(&outcomes);
    if summary.skipped > 0 {
        use humansize::{format_size, BINARY};
        eprintln!(
            "  Skipped {} file(s) larger than {}",
            summary.skipped,
            format_size(options.max_file_size, BINARY)
        );
    }
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} file(s) could not be analyzed",
            summary.failed,
            outcomes.len()
        );
    }

    Ok(())
}

/// Print the effective configuration, optionally writing the defaults first.
fn cmd_config(config: &Config, init: bool) -> anyhow::Result<()> {
    if init {
        let path = config::save_config(&Config::default())?;
        println!("  Wrote default configuration to {}", path.display());
        return Ok(());
    }

    match config::config_file_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no configuration directory)"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailverdict", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
