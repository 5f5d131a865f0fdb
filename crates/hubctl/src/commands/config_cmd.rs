//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::Input;

use hubctl_config::{Config, Defaults, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = hubctl_config::config_path();
            eprintln!("✨ hubctl — configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Hub URL
            let hub: String = Input::new()
                .with_prompt("Hub URL")
                .default("http://homeassistant.local:2002".into())
                .interact_text()
                .map_err(prompt_err)?;

            // Catch typos before they land in the file
            let _: url::Url = hub.parse().map_err(|_| CliError::Validation {
                field: "hub".into(),
                reason: format!("invalid URL: {hub}"),
            })?;

            // 3. Build and write the config
            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles: HashMap::from([(profile_name.clone(), Profile::new(hub))]),
            };
            hubctl_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: hubctl services list");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = hubctl_config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = hubctl_config::load_config_or_default();
            let profile_name =
                hubctl_config::active_profile_name(global.profile.as_deref(), &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));

            match key.as_str() {
                "hub" => profile.hub = value,
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "timeout_secs" | "timeout" => {
                    profile.timeout_secs = Some(parse_secs("timeout_secs", &value)?);
                }
                "poll_interval_secs" | "poll-interval" => {
                    profile.poll_interval_secs = Some(parse_secs("poll_interval_secs", &value)?);
                }
                "fast_poll_interval_secs" | "fast-poll-interval" => {
                    profile.fast_poll_interval_secs =
                        Some(parse_secs("fast_poll_interval_secs", &value)?);
                }
                "log_poll_interval_secs" | "log-poll-interval" => {
                    profile.log_poll_interval_secs =
                        Some(parse_secs("log_poll_interval_secs", &value)?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: hub, insecure, ca_cert, \
                             timeout_secs, poll_interval_secs, fast_poll_interval_secs, \
                             log_poll_interval_secs"
                        ),
                    });
                }
            }

            hubctl_config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = hubctl_config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: hubctl config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = hubctl_config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            hubctl_config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", hubctl_config::config_path().display());
            Ok(())
        }
    }
}
