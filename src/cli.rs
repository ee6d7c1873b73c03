// CLI module for argument parsing and configuration

use crate::catalog::MediaFilter;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Picsweep - a terminal media-triage tool
///
/// Swipe through your photo and video library one item at a time: keep
/// what you love, mark the rest, and batch-confirm the deletion.
#[derive(Parser, Debug, Clone)]
#[command(name = "picsweep")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the media library
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Show only this kind of media
    #[arg(short = 'f', long = "filter", value_enum, default_value = "all")]
    pub filter: FilterArg,

    /// Dry run mode - rehearse the session without deleting anything
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Skip the confirmation overlay before committing deletions
    #[arg(long = "skip-confirm", action = ArgAction::SetTrue)]
    pub skip_confirm: bool,

    /// Ignore any saved session and start fresh
    #[arg(long = "fresh", action = ArgAction::SetTrue)]
    pub fresh: bool,

    /// Override the session state file location
    #[arg(long = "state-file")]
    pub state_file: Option<PathBuf>,

    /// Show the welcome overlay even if it was dismissed before
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub show_welcome: bool,
}

/// Media filter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterArg {
    /// Photos and videos
    #[default]
    All,
    /// Photos only
    Images,
    /// Videos only
    Videos,
}

impl From<FilterArg> for MediaFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => MediaFilter::All,
            FilterArg::Images => MediaFilter::Images,
            FilterArg::Videos => MediaFilter::Videos,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        Ok(())
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: PathBuf,
    pub filter: MediaFilter,
    pub dry_run: bool,
    pub skip_confirm: bool,
    pub fresh: bool,
    pub state_file: Option<PathBuf>,
    pub show_welcome: bool,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig {
            directory: args.directory,
            filter: args.filter.into(),
            dry_run: args.dry_run,
            skip_confirm: args.skip_confirm,
            fresh: args.fresh,
            state_file: args.state_file,
            show_welcome: args.show_welcome,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            directory: PathBuf::from("."),
            filter: MediaFilter::All,
            dry_run: false,
            skip_confirm: false,
            fresh: false,
            state_file: None,
            show_welcome: false,
        }
    }
}
