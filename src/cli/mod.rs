pub mod commands;
pub mod output;

use crate::changeset::TopologyMode;
use crate::errors::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cs")]
#[command(about = "Split pending working-copy changes into named branches and commits")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split pending changes into one branch and commit per change-set
    Split {
        /// Manifest file (.json or .toml)
        manifest: PathBuf,

        /// Branch topology (defaults to split.default_mode)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Also write the run report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show which pending paths each change-set would take, without changing anything
    Plan {
        /// Manifest file (.json or .toml)
        manifest: PathBuf,

        /// Print the plan as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Check a manifest without looking at the repository
    Validate {
        /// Manifest file (.json or .toml)
        manifest: PathBuf,
    },

    /// Show current branch, pending changes and recent runs
    Status,

    /// Delete the branches a recorded run created
    Cleanup {
        /// Run report written by `cs split`
        report: PathBuf,

        /// Actually delete the branches (default is a dry run)
        #[arg(long)]
        execute: bool,

        /// Also delete branches with newer commits and the checked-out branch (after switching to the run's base ref)
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. split.default_mode
        key: String,
        value: String,
        /// Write the global file instead of the repository's
        #[arg(long)]
        global: bool,
    },

    /// Get a configuration value
    Get {
        key: String,
        #[arg(long)]
        global: bool,
    },

    /// List all configuration values
    List {
        #[arg(long)]
        global: bool,
    },

    /// Reset a configuration value to its default
    Unset {
        key: String,
        #[arg(long)]
        global: bool,
    },
}

/// Topology as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Sibling,
    Stacked,
}

impl From<ModeArg> for TopologyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sibling => TopologyMode::Sibling,
            ModeArg::Stacked => TopologyMode::Stacked,
        }
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        self.setup_logging();

        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        match self.command {
            Commands::Split {
                manifest,
                mode,
                report,
                json,
            } => commands::split::run(&manifest, mode.map(Into::into), report.as_deref(), json),
            Commands::Plan { manifest, json } => commands::plan::run(&manifest, json),
            Commands::Validate { manifest } => commands::validate::run(&manifest),
            Commands::Status => commands::status::run(),
            Commands::Cleanup {
                report,
                execute,
                force,
            } => commands::cleanup::run(&report, execute, force),
            Commands::Config { action } => commands::config::run(action),
            Commands::Completions { shell } => commands::completions::generate_completions(shell),
        }
    }

    /// Log to stderr so `--json` output on stdout stays machine-readable
    fn setup_logging(&self) {
        use tracing_subscriber::filter::Targets;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let filter = Targets::new()
            .with_target("changeset_cli", level)
            .with_default(tracing::Level::WARN);

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .with_ansi(!self.no_color);

        // a subscriber may already be installed when driven from tests
        let _ = tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter)
            .try_init();
    }
}
