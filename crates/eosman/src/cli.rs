//! Clap derive structures for the `eosman` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// eosman -- run commands and push configuration to Arista EOS switches
#[derive(Debug, Parser)]
#[command(
    name = "eosman",
    version,
    about = "Run commands and push configuration to Arista EOS switches",
    long_about = "Run show commands and scripts against EOS switches over eAPI,\n\
        and compile declarative intents (interfaces, VLANs, VXLAN, ACLs,\n\
        routing, system) into EOS configuration.\n\n\
        Devices and connection profiles live in the config file; see\n\
        `eosman config init`.",
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
    /// Connection profile to use
    #[arg(long, short = 'p', env = "EOSMAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long = "config", env = "EOSMAN_CONFIG", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EOSMAN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "EOSMAN_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-command timeout in seconds (overrides profile)
    #[arg(long, env = "EOSMAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Write the session's command history as JSON to this file
    #[arg(long, env = "EOSMAN_HISTORY_OUT", global = true, value_name = "PATH")]
    pub history_out: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect switches in the inventory
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List the built-in quick commands
    #[command(alias = "quick")]
    Commands,

    /// Run a single command on a switch
    #[command(alias = "x")]
    Exec(ExecArgs),

    /// Run a multi-line script on a switch
    #[command(alias = "run")]
    Script(ScriptArgs),

    /// Compile an intent document into EOS configuration
    #[command(alias = "c")]
    Compile(CompileArgs),

    /// Compile an intent document and push it to a switch
    Apply(ApplyArgs),

    /// Manage configuration and profiles
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List inventory devices
    #[command(alias = "ls")]
    List {
        /// Only show devices whose name, address or model matches
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one device
    Get {
        /// Device id
        id: String,
    },
}

// ── Exec ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Device id
    pub device: String,

    /// Command text (words are joined with spaces)
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "quick",
        conflicts_with = "quick"
    )]
    pub command: Vec<String>,

    /// Run a quick command by name instead (see `eosman commands`)
    #[arg(long, short = 'Q')]
    pub quick: Option<String>,
}

// ── Script ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScriptArgs {
    /// Device id
    pub device: String,

    /// Read the script from a file instead of stdin
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Stop at the first failed command
    #[arg(long)]
    pub stop_on_error: bool,

    /// Minimum gap between command starts, e.g. "500ms" or "2s"
    #[arg(long, value_parser = parse_duration)]
    pub spacing: Option<Duration>,
}

// ── Compile / Apply ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Intent document (JSON or YAML; one intent or a list)
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Device id
    pub device: String,

    /// Intent document (JSON or YAML; one intent or a list)
    pub file: PathBuf,

    /// Stop at the first failed command
    #[arg(long)]
    pub stop_on_error: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the current configuration (secrets masked)
    Show,

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| e.to_string())
}
