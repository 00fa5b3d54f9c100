// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result, Context};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use srtmerge::app_config::{Config, LogLevel};
use srtmerge::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge numbered subtitle files (default command)
    Merge(MergeArgs),

    /// Generate shell completions for srtmerge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Directory containing numbered subtitle/video files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Path of the merged subtitle file
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: PathBuf,

    #[command(flatten)]
    options: MergeOptions,
}

#[derive(Args, Debug, Clone)]
struct MergeOptions {
    /// Configuration file path
    #[arg(short, long = "config")]
    config_path: Option<PathBuf>,

    /// Subtitle file extension
    #[arg(long = "subtitle-ext")]
    subtitle_extension: Option<String>,

    /// Video file extension
    #[arg(long = "video-ext")]
    video_extension: Option<String>,

    /// ffprobe executable
    #[arg(long = "ffprobe", env = "SRTMERGE_FFPROBE")]
    ffprobe_path: Option<String>,

    /// Seconds to wait for each ffprobe call (0 = no limit)
    #[arg(long = "probe-timeout")]
    probe_timeout_secs: Option<u64>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the pairing order and exit without probing or writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// srtmerge - merge numbered subtitle chunks
///
/// Concatenates numbered SRT files into one track, shifting each file by the
/// total duration of the videos that precede it.
#[derive(Parser, Debug)]
#[command(name = "srtmerge")]
#[command(version)]
#[command(about = "Merge sequential SRT files with video duration compensation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "srtmerge pairs every numbered subtitle file with the video sharing its name,
orders the pairs numerically and writes one subtitle track whose timestamps
follow on from each preceding video.

EXAMPLES:
    srtmerge ./card ./merged.srt                 # Pair 001.srt with 001.mov, ...
    srtmerge --video-ext mp4 ./card merged.srt   # Chunks recorded as .mp4
    srtmerge -n ./card merged.srt                # Show the merge order only
    srtmerge completions bash > srtmerge.bash    # Generate bash completions

CONFIGURATION:
    Settings are read from srtmerge.json when present, or from the file given
    with --config. Command line flags override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing numbered subtitle/video files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Path of the merged subtitle file
    #[arg(value_name = "OUTPUT_FILE")]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    options: MergeOptions,
}

const DEFAULT_CONFIG_PATH: &str = "srtmerge.json";

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "srtmerge", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Merge(args)) => run_merge(args).await,
        None => {
            let (Some(input_dir), Some(output_file)) = (cli.input_dir, cli.output_file) else {
                CommandLineOptions::command()
                    .error(
                        clap::error::ErrorKind::MissingRequiredArgument,
                        "INPUT_DIR and OUTPUT_FILE are required when no subcommand is specified",
                    )
                    .exit();
            };

            run_merge(MergeArgs { input_dir, output_file, options: cli.options }).await
        }
    }
}

/// Build the effective configuration: file first, then command line overrides
fn resolve_config(options: &MergeOptions) -> Result<Config> {
    let mut config = match &options.config_path {
        Some(path) => Config::load(path, true)?,
        None => Config::load(DEFAULT_CONFIG_PATH, false)?,
    };

    if let Some(subtitle_extension) = &options.subtitle_extension {
        config.subtitle_extension = subtitle_extension.clone();
    }
    if let Some(video_extension) = &options.video_extension {
        config.video_extension = video_extension.clone();
    }
    if let Some(ffprobe_path) = &options.ffprobe_path {
        config.ffprobe_path = ffprobe_path.clone();
    }
    if let Some(timeout) = options.probe_timeout_secs {
        config.probe_timeout_secs = timeout;
    }
    if options.no_progress {
        config.show_progress = false;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_merge(args: MergeArgs) -> Result<()> {
    let config = resolve_config(&args.options).context("Failed to load configuration")?;
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config).map_err(|e| anyhow!("{}: {}", e.kind(), e))?;

    if args.options.dry_run {
        let pairs = controller.plan(&args.input_dir).map_err(|e| anyhow!("{}: {}", e.kind(), e))?;
        for pair in &pairs {
            println!("{}", pair);
        }
        info!("Dry run: {} pairs would be merged into {:?}", pairs.len(), args.output_file);
        return Ok(());
    }

    controller
        .run(&args.input_dir, &args.output_file)
        .await
        .map_err(|e| anyhow!("{}: {}", e.kind(), e))?;

    info!("Success: {:?}", args.output_file);

    Ok(())
}
