//! Subdevice command handlers.

use tabled::Tabled;

use hubctl_core::{Hub, HubConfig, Subdevice};

use crate::cli::{GlobalOpts, SubdevicesArgs, SubdevicesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SubdeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Hub")]
    hub: String,
}

impl From<&Subdevice> for SubdeviceRow {
    fn from(s: &Subdevice) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone().unwrap_or_default(),
            kind: s.kind.clone().unwrap_or_default(),
            vendor: s.vendor.clone().unwrap_or_default(),
            hub: s.hub_uuid.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: HubConfig,
    args: SubdevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SubdevicesCommand::List => {
            Hub::oneshot(config, |hub| async move {
                let snap = hub.subdevices().current();
                let out = output::render_list(
                    &global.output,
                    &snap,
                    |s| SubdeviceRow::from(s),
                    |s| s.id.clone(),
                );
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }

        SubdevicesCommand::Watch { fast } => {
            util::watch(
                config,
                fast,
                global.quiet,
                |hub| hub.subdevices(),
                |snap| {
                    output::render_list(&global.output, snap, |s| SubdeviceRow::from(s), |s| {
                        s.id.clone()
                    })
                },
            )
            .await
        }
    }
}
