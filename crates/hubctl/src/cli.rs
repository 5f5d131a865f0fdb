//! Clap derive structures for the `hubctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hubctl -- kubectl-style CLI for Meross LAN hub administration
#[derive(Debug, Parser)]
#[command(
    name = "hubctl",
    version,
    about = "Administer a local Meross hub from the command line",
    long_about = "A CLI for the local admin API of a Meross LAN hub.\n\n\
        Lists paired devices, sub-devices, and supervised broker services,\n\
        drives service lifecycle commands, and follows service logs.",
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
    /// Hub profile to use
    #[arg(long, short = 'p', env = "HUBCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Hub base URL (overrides profile)
    #[arg(long, short = 'H', env = "HUBCTL_HUB", global = true)]
    pub hub: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HUBCTL_OUTPUT",
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
    #[arg(long, short = 'k', env = "HUBCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HUBCTL_TIMEOUT", global = true)]
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
    /// Manage paired devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// View sub-devices paired through a hub device
    #[command(alias = "sub")]
    Subdevices(SubdevicesArgs),

    /// Manage supervised broker services
    #[command(alias = "svc", alias = "s")]
    Services(ServicesArgs),

    /// View and update the paired account
    Account(AccountArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List paired devices
    #[command(alias = "ls")]
    List,

    /// Get device details
    Show {
        /// Device UUID, MAC address, or name
        device: String,
    },

    /// Rename a device
    Rename {
        /// Device UUID, MAC address, or name
        device: String,

        /// New device name
        name: String,

        /// Apply the rename locally before the hub confirms it
        #[arg(long)]
        optimistic: bool,
    },

    /// Watch the device list, re-rendering on every change
    Watch {
        /// Poll at the fast interval while watching
        #[arg(long)]
        fast: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SUBDEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SubdevicesArgs {
    #[command(subcommand)]
    pub command: SubdevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubdevicesCommand {
    /// List sub-devices
    #[command(alias = "ls")]
    List,

    /// Watch the sub-device list, re-rendering on every change
    Watch {
        /// Poll at the fast interval while watching
        #[arg(long)]
        fast: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List supervised services
    #[command(alias = "ls")]
    List,

    /// Get service details
    Show {
        /// Service name (e.g., "MQTT Service")
        service: String,
    },

    /// Start a stopped service
    Start {
        /// Service name
        service: String,
    },

    /// Stop a running service
    Stop {
        /// Service name
        service: String,
    },

    /// Restart a service
    Restart {
        /// Service name
        service: String,
    },

    /// Show or follow a service's log
    Logs {
        /// Service name
        service: String,

        /// Keep following the log feed until interrupted
        #[arg(long, short = 'f')]
        follow: bool,

        /// Number of trailing lines to show initially
        #[arg(long, short = 'n', default_value = "50")]
        lines: usize,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Show the paired account
    Show,

    /// Replace the paired account credentials
    ///
    /// The hub restarts its broker services to apply the change.
    Set {
        /// Account email
        #[arg(long, required = true)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Enable the Meross cloud link
        #[arg(long, overrides_with = "no_meross_link")]
        meross_link: bool,

        /// Disable the Meross cloud link (default)
        #[arg(long, overrides_with = "meross_link")]
        no_meross_link: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (hub, insecure, ca_cert, timeout_secs,
        /// poll_interval_secs, fast_poll_interval_secs,
        /// log_poll_interval_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
