//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// VidPulse - YouTube comment sentiment from the terminal
///
/// Collect the top comments of a video, then explore the sentiment analysis
/// the backend computes for them.
///
/// Examples:
///   vidpulse submit https://youtu.be/qwAFL1597eM
///   vidpulse analyze qwAFL1597eM
///   vidpulse analyze qwAFL1597eM --review --once --format json
///   vidpulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .vidpulse.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the collection/analysis service
    #[arg(long, value_name = "URL", env = "VIDPULSE_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// YouTube Data API key
    #[arg(
        long,
        value_name = "KEY",
        env = "YOUTUBE_API_KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// YouTube Data API base URL
    #[arg(long, value_name = "URL", global = true)]
    pub youtube_api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .vidpulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Collect comments for a video, then open its analysis view
    Submit {
        /// YouTube link or video id
        #[arg(value_name = "URL_OR_ID")]
        url: String,

        /// Maximum number of comments to collect
        #[arg(long, value_name = "COUNT")]
        max_results: Option<u32>,

        /// Print the collected video id instead of opening the analysis view
        #[arg(long)]
        no_follow: bool,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Open the analysis view for a video
    Analyze {
        /// Video id or YouTube link (absent or "nothing" shows the empty page)
        #[arg(value_name = "VIDEO_ID_OR_URL")]
        video: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Options shared by everything that opens the analysis view.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewArgs {
    /// Request the review as soon as the page opens
    #[arg(long)]
    pub review: bool,

    /// Expand the aspect list
    #[arg(long)]
    pub aspects: bool,

    /// Exit once no request is outstanding instead of reading commands
    #[arg(long)]
    pub once: bool,
}

/// Output format for the page view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal card (default)
    #[default]
    Text,
    /// JSON snapshot
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("A command is required (submit, analyze) unless --init-config is used".to_string());
        }

        if let Some(ref url) = self.backend_url {
            if !is_http_url(url) {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref url) = self.youtube_api_url {
            if !is_http_url(url) {
                return Err("YouTube API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(Commands::Submit {
            max_results: Some(0),
            ..
        }) = self.command
        {
            return Err("Max results must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// The default stays at WARN so log lines do not interleave with the
    /// rendered page.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            command: Some(Commands::Analyze {
                video: Some("abc".to_string()),
                view: ViewArgs::default(),
            }),
            config: None,
            backend_url: None,
            api_key: None,
            youtube_api_url: None,
            timeout: None,
            format: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_analyze() {
        let args = Args::try_parse_from(["vidpulse", "analyze", "abc", "--review", "--once"]).unwrap();
        match args.command {
            Some(Commands::Analyze { video, view }) => {
                assert_eq!(video.as_deref(), Some("abc"));
                assert!(view.review);
                assert!(view.once);
                assert!(!view.aspects);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_without_segment() {
        let args = Args::try_parse_from(["vidpulse", "analyze"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Analyze { video: None, .. })
        ));
    }

    #[test]
    fn test_parse_submit_with_globals() {
        let args = Args::try_parse_from([
            "vidpulse",
            "submit",
            "https://youtu.be/abc",
            "--max-results",
            "20",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.format, Some(OutputFormat::Json));
        match args.command {
            Some(Commands::Submit {
                url, max_results, ..
            }) => {
                assert_eq!(url, "https://youtu.be/abc");
                assert_eq!(max_results, Some(20));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validation_requires_command() {
        let mut args = make_args();
        args.command = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_backend_url() {
        let mut args = make_args();
        args.backend_url = Some("localhost:5000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_results() {
        let mut args = make_args();
        args.command = Some(Commands::Submit {
            url: "abc".to_string(),
            max_results: Some(0),
            no_follow: false,
            view: ViewArgs::default(),
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
