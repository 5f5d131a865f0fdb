//! Account command handlers.

use hubctl_core::{Account, AccountUpdate, Hub, HubConfig};

use crate::cli::{AccountArgs, AccountCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(a: &Account) -> String {
    [
        format!("Email:       {}", a.email),
        format!(
            "User ID:     {}",
            a.user_id.map_or_else(|| "-".into(), |id| id.to_string())
        ),
        format!("MQTT key:    {}", a.mqtt_key.as_deref().unwrap_or("-")),
        format!(
            "Meross link: {}",
            a.meross_link
                .map_or_else(|| "-".into(), |on| on.to_string())
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

/// Account commands skip the snapshot machinery: no collection data is
/// needed, so a bare session without `connect` is enough.
pub async fn handle(
    config: HubConfig,
    args: AccountArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccountCommand::Show => {
            let hub = Hub::new(config)?;
            let account = hub.account().await?;
            let out =
                output::render_single(&global.output, &account, detail, |a| a.email.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountCommand::Set {
            email,
            password,
            meross_link,
            no_meross_link: _,
        } => {
            // Prompt rather than require the password on the command line
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Account password: ")?,
            };
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            if !util::confirm(
                "Updating the account restarts the hub's broker services. Continue?",
                global.yes,
            )? {
                return Ok(());
            }

            let update = AccountUpdate {
                email,
                password,
                enable_meross_link: meross_link,
            };

            let hub = Hub::new(config)?;
            let account = hub.set_account(&update).await?;
            if !global.quiet {
                eprintln!("✓ Account set to {}", account.email);
                eprintln!("  Broker services are restarting; give them a few seconds.");
            }
            Ok(())
        }
    }
}
