//! Clap derive structures for the `alexa-plug` CLI.
//!
//! Kept free of crate-internal imports: `build.rs` includes this file
//! directly to render man pages.

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// alexa-plug -- list and switch Alexa smart plugs
#[derive(Debug, Parser)]
#[command(
    name = "alexa-plug",
    version,
    about = "Control Alexa smart plugs from the command line",
    long_about = "List the smart plugs on an Alexa account and read or switch their power state.\n\n\
        Authentication uses an existing alexa.amazon.* session cookie; this tool\n\
        does not log in for you.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "ALEXA_PLUG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Session cookie (overrides profile)
    #[arg(
        long,
        env = "ALEXA_SMARTPLUG_COOKIE",
        global = true,
        hide_env_values = true
    )]
    pub cookie: Option<String>,

    /// Amazon domain of the account, e.g. amazon.co.jp (overrides profile)
    #[arg(long, short = 'd', env = "ALEXA_SMARTPLUG_AMAZON_DOMAIN", global = true)]
    pub domain: Option<String>,

    /// Resolve the regional Alexa host to this IP instead of using DNS
    #[arg(long, env = "ALEXA_SMARTPLUG_ALEXA_IP", global = true)]
    pub alexa_ip: Option<IpAddr>,

    /// Base URL replacing https://alexa.{domain}
    #[arg(long, env = "ALEXA_PLUG_API_BASE", global = true, hide = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ALEXA_PLUG_OUTPUT",
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

    /// Request timeout in seconds (0 disables)
    #[arg(long, env = "ALEXA_PLUG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// List smart plugs and read or switch their state
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Switch a plug on and off against the live account and verify each step
    Selftest(SelftestArgs),

    /// Manage configuration profiles
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
    /// List smart plugs on the account
    #[command(alias = "ls")]
    List,

    /// Read a plug's power state
    Get {
        /// Entity id or display name
        device: String,

        /// Refresh the cached topology before resolving
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Switch a plug on or off
    Set {
        /// Entity id or display name
        device: String,

        /// Desired power state
        state: PowerState,

        /// Refresh the cached topology before resolving
        #[arg(long, short = 'f')]
        force: bool,

        /// Address the plug by its appliance id instead of its entity id
        #[arg(long)]
        by_appliance_id: bool,
    },

    /// Show the internal appliance id for a plug
    Resolve {
        /// Entity id or display name
        device: String,

        /// Refresh the cached topology before resolving
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

// ── Selftest ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SelftestArgs {
    /// Entity id or display name (defaults to the first plug)
    #[arg(long)]
    pub device: Option<String>,

    /// Seconds to wait between switching on and switching off
    #[arg(long, default_value = "5")]
    pub delay: u64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the current configuration (secrets masked)
    Show,

    /// Set the Amazon domain for the active profile
    SetDomain {
        /// e.g. amazon.com, amazon.co.jp
        domain: String,
    },

    /// Store the session cookie for the active profile
    SetCookie {
        /// Save to the config file instead of the system keyring
        #[arg(long)]
        plaintext: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
