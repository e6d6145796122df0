use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use vde::{
    Fetchers, FfmpegTranscoder, PipelineRunner, RunDecision, RunObserver, RunOptions, Stage,
    StageEvent, TargetSet, load_manifest,
};

const CLI_AFTER_HELP: &str = "Examples:\n  \
    vde -l list.json -o data\n  \
    vde -t 0-4 --force\n  \
    vde --extract_only --save_video --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "vde",
    version,
    about = "Batch-download videos and extract frame sequences from time ranges",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// JSON manifest of videos to process.
    #[arg(short = 'l', long = "list", default_value = "list.json")]
    list: PathBuf,

    /// Root directory for per-item workspaces.
    #[arg(short = 'o', long = "output", default_value = "data")]
    output: PathBuf,

    /// Only download videos; skip the extract stage.
    #[arg(short = 'd', long = "download_only")]
    download_only: bool,

    /// Only extract frames from already-downloaded videos; skip the
    /// download stage.
    #[arg(short = 'e', long = "extract_only")]
    extract_only: bool,

    /// Redo work even when its artifacts already exist.
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Also keep a trimmed video copy of each extracted range.
    #[arg(short = 's', long = "save_video")]
    save_video: bool,

    /// Target items: "all", an id, a comma list, or a dash range
    /// (e.g. "0", "0,3", "0-2").
    #[arg(short = 't', long = "target", default_value = "all")]
    target: String,

    /// Pass through the underlying tools' output instead of
    /// suppressing it.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Prints one status line per stage decision, in the order things happen.
struct TerminalReporter;

impl RunObserver for TerminalReporter {
    fn on_item(&self, id: &str) {
        println!("{}", format!("[{id}]").bold());
    }

    fn on_stage(&self, _id: &str, stage: Stage, event: &StageEvent<'_>) {
        match event {
            StageEvent::Skipped(RunDecision::SkipNotTargeted) => {}
            StageEvent::Skipped(RunDecision::SkipAlreadyPresent) => match stage {
                Stage::Download => println!("pass already downloaded video"),
                Stage::Extract => println!("pass already extracted frames"),
            },
            StageEvent::Skipped(RunDecision::SkipMissingPrerequisite) => {
                println!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "no video to extract from, skipping".yellow()
                );
            }
            StageEvent::Skipped(RunDecision::Perform) => {}
            StageEvent::Performing { detail } => match stage {
                Stage::Download => println!("downloading from {detail}"),
                Stage::Extract => println!("extracting from {detail}"),
            },
            StageEvent::Completed { artifact } => {
                println!(
                    "{} {}",
                    "saved".green().bold(),
                    artifact.display().to_string().green()
                );
            }
            StageEvent::Failed(error) => {
                eprintln!("{} {}", "error:".red().bold(), error.to_string().red());
            }
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let targets = TargetSet::parse(&cli.target)?;
    let items = load_manifest(&cli.list)?;
    println!("loaded {} video(s) from {}", items.len(), cli.list.display());

    let options = RunOptions {
        download: !cli.extract_only,
        extract: !cli.download_only,
        force: cli.force,
        save_video: cli.save_video,
        verbose: cli.verbose,
    };

    let fetchers = Fetchers::default();
    let transcoder = FfmpegTranscoder::new();
    let reporter = TerminalReporter;
    let runner = PipelineRunner::new(&fetchers, &transcoder, options).with_observer(&reporter);

    let summary = runner.run(&items, &targets, &cli.output)?;

    let report = format!(
        "processed {} item(s): {} downloaded, {} extracted, {} skipped, {} failure(s)",
        summary.visited,
        summary.fetched,
        summary.extracted,
        summary.already_present,
        summary.failures,
    );
    if summary.failures == 0 {
        println!("{} {}", "success:".green().bold(), report.green());
    } else {
        // Per-item failures were already reported; the run itself still
        // completed, so the exit status stays 0.
        println!("{} {}", "done:".yellow().bold(), report.yellow());
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
