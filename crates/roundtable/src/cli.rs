//! Clap derive structures for the `roundtable` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// roundtable -- CLI for the group-discussion assessment platform
#[derive(Debug, Parser)]
#[command(
    name = "roundtable",
    version,
    about = "Drive GD assessment sessions from the command line",
    long_about = "Client tooling for the group-discussion assessment platform.\n\n\
        Display and watch venue admission QR codes, run session phase timers\n\
        reconciled against the server, and inspect per-user survey ordering.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server root URL (overrides config)
    #[arg(long, short = 's', env = "GD_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token (overrides config)
    #[arg(long, env = "GD_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Acting user id (overrides config)
    #[arg(long, short = 'u', env = "GD_USER", global = true)]
    pub user: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "GD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Venue admission QR codes
    #[command(alias = "q")]
    Qr(QrArgs),

    /// Session phase timers and lobby
    #[command(alias = "sess")]
    Session(SessionArgs),

    /// Peer-evaluation survey tooling
    Survey(SurveyArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── QR commands ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QrArgs {
    #[command(subcommand)]
    pub command: QrCommand,
}

#[derive(Debug, Subcommand)]
pub enum QrCommand {
    /// Fetch (or mint) the venue's current admission QR
    Show {
        /// Venue id
        #[arg(long)]
        venue: String,

        /// Force the server to mint a new code
        #[arg(long)]
        force_new: bool,
    },

    /// Poll usage and auto-regenerate when the code fills up
    Watch {
        /// Venue id
        #[arg(long)]
        venue: String,
    },

    /// Browse the venue's QR history
    History {
        /// Venue id
        #[arg(long)]
        venue: String,
    },
}

// ── Session commands ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Run the phase countdown, reconciled against the server
    Run {
        /// Session id
        #[arg(long)]
        session: String,
    },

    /// One-shot read of the session's current phase
    Status {
        /// Session id
        #[arg(long)]
        session: String,
    },

    /// Watch the lobby; optionally mark yourself ready
    Lobby {
        /// Session id
        #[arg(long)]
        session: String,

        /// Publish your ready flag on entry
        #[arg(long)]
        ready: bool,
    },
}

// ── Survey commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SurveyArgs {
    #[command(subcommand)]
    pub command: SurveyCommand,
}

#[derive(Debug, Subcommand)]
pub enum SurveyCommand {
    /// Show this user's question order for a session
    Order {
        /// Session id
        #[arg(long)]
        session: String,

        /// Question level (defaults to 1)
        #[arg(long, default_value_t = 1)]
        level: u32,
    },
}

// ── Config commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,

    /// Write a starter config file
    Init {
        /// Server root URL to seed the file with
        #[arg(long)]
        server: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
