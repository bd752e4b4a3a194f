//! VidPulse - YouTube comment sentiment from the terminal
//!
//! A CLI that submits a video for comment collection, then loads the
//! video's details and the backend's sentiment analysis into an
//! interactive page.
//!
//! Exit codes:
//!   0 - Success (page failures are rendered, not fatal)
//!   1 - Runtime error (config, I/O) or a rejected submission

mod analysis;
mod cli;
mod config;
mod error;
mod fetch;
mod identifier;
mod models;
mod page;
mod report;
mod submission;

use anyhow::{Context, Result};
use cli::{Args, Commands, OutputFormat, ViewArgs};
use config::Config;
use fetch::{AnalysisFetcher, VideoMetadataFetcher};
use indicatif::{ProgressBar, ProgressStyle};
use page::{AnalysisPageController, PageEvent, PageRuntime};
use std::time::Duration;
use submission::{Navigation, SubmissionController};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const INTERACTIVE_HELP: &str = "Commands: r = get review, a = toggle aspects, o <id> = open video, q = quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("VidPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("VidPulse failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .vidpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .vidpulse.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .vidpulse.toml")?;

    println!("✅ Created .vidpulse.toml with default settings.");
    println!("   Set youtube.api_key (or YOUTUBE_API_KEY) before opening a video.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr so the
/// rendered page on stdout stays clean.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the selected command. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    let http_client = fetch::http_client(config.backend.timeout_seconds)?;

    match args.command.clone() {
        Some(Commands::Submit {
            url,
            max_results,
            no_follow,
            view,
        }) => {
            let controller =
                SubmissionController::new(http_client.clone(), config.submission_config(max_results));
            let Some(navigation) = run_submission(&controller, &url, args.quiet).await else {
                return Ok(1);
            };

            if no_follow {
                println!("{}", navigation.navigate_to);
                return Ok(0);
            }

            info!("Opening analysis for {}", navigation.navigate_to);
            let video_id = navigation.follow().await;
            open_analysis(Some(video_id), &view, &config, http_client).await
        }
        Some(Commands::Analyze { video, view }) => {
            open_analysis(video, &view, &config, http_client).await
        }
        None => Ok(0),
    }
}

/// Submit the collection job behind a spinner. Returns where to go next,
/// or `None` after printing why the submission failed.
async fn run_submission(
    controller: &SubmissionController,
    url: &str,
    quiet: bool,
) -> Option<Navigation> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = controller
        .submit(url, |status| spinner.set_message(status.to_string()))
        .await;

    match outcome {
        Ok(navigation) => {
            spinner.finish_with_message(format!("✅ {}", navigation.status));
            Some(navigation)
        }
        Err(e) => {
            let message = submission::failure_message(&e);
            spinner.finish_and_clear();
            eprintln!("❌ {}", message);
            None
        }
    }
}

/// Open the analysis page for `video` and drive it until done.
async fn open_analysis(
    video: Option<String>,
    view: &ViewArgs,
    config: &Config,
    http_client: reqwest::Client,
) -> Result<i32> {
    if config.youtube.api_key.is_empty() {
        warn!("No YouTube API key configured; video details will fail to load");
    }

    let metadata_fetcher = VideoMetadataFetcher::new(http_client.clone(), config.metadata_config());
    let analysis_fetcher = AnalysisFetcher::new(http_client, config.backend.base_url.clone());
    let mut runtime = PageRuntime::new(metadata_fetcher, analysis_fetcher);

    runtime.dispatch(PageEvent::Navigate(video));
    if view.review {
        runtime.dispatch(PageEvent::RequestReview);
    }
    if view.aspects {
        runtime.dispatch(PageEvent::ToggleAspects);
    }

    let format = config.general.format;
    if view.once {
        runtime.settle().await;
        print_view(runtime.controller(), format, false)?;
        return Ok(0);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    runtime
        .run(stdin, |page| print_view(page, format, true))
        .await?;

    Ok(0)
}

/// Print the current page in the configured format.
fn print_view(page: &AnalysisPageController, format: OutputFormat, interactive: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", report::generate_json_view(page)?),
        OutputFormat::Text => {
            if interactive {
                println!("{}", "─".repeat(60));
            }
            print!("{}", report::generate_text_view(page));
            if interactive {
                println!("{}", INTERACTIVE_HELP);
            }
        }
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Runs before logging is up, so problems go straight to stderr
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
