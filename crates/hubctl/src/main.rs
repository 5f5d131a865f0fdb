mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hubctl_core::{HubConfig, TlsVerification};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a hub connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hubctl", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to a hub
        cmd => {
            let hub_config = build_hub_config(&cli.global)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, hub_config, &cli.global).await
        }
    }
}

/// Build a `HubConfig` from the config file, profile, and CLI overrides.
fn build_hub_config(global: &cli::GlobalOpts) -> Result<HubConfig, CliError> {
    let cfg = hubctl_config::load_config_or_default();
    let profile_name = hubctl_config::active_profile_name(global.profile.as_deref(), &cfg);

    // Validate --hub up front so the error names the flag, not the profile
    let flag_url = match global.hub.as_deref() {
        Some(raw) => Some(raw.parse::<url::Url>().map_err(|_| CliError::Validation {
            field: "hub".into(),
            reason: format!("invalid URL: {raw}"),
        })?),
        None => None,
    };

    let mut config = if let Some(profile) = cfg.profiles.get(&profile_name) {
        hubctl_config::profile_to_hub_config(profile, &cfg.defaults)?
    } else if let Some(explicit) = global.profile.as_deref() {
        // An explicitly named profile that doesn't exist is always an
        // error, even when --hub could stand in.
        return Err(CliError::ProfileNotFound {
            name: explicit.to_owned(),
            available: available_profiles(&cfg),
        });
    } else if flag_url.is_some() {
        // No profile found -- build from the flag / env URL alone
        HubConfig {
            timeout: Duration::from_secs(cfg.defaults.timeout_secs),
            poll_interval_secs: cfg.defaults.poll_interval_secs,
            fast_poll_interval_secs: cfg.defaults.fast_poll_interval_secs,
            log_poll_interval_secs: cfg.defaults.log_poll_interval_secs,
            ..HubConfig::default()
        }
    } else {
        return Err(CliError::NoConfig {
            path: hubctl_config::config_path().display().to_string(),
        });
    };

    // CLI flags override whatever the profile said
    if let Some(url) = flag_url {
        config.url = url;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    Ok(config)
}

fn available_profiles(cfg: &hubctl_config::Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
