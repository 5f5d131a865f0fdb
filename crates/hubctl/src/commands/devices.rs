//! Device command handlers.

use tabled::Tabled;

use hubctl_core::{ApplyPolicy, Device, Hub, HubConfig};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

fn device_row(d: &Device, color: bool) -> DeviceRow {
    DeviceRow {
        uuid: d.uuid.clone(),
        name: d.name.clone().unwrap_or_default(),
        dtype: d.device_type.clone().unwrap_or_default(),
        status: output::paint_online(d.online_status, color),
        ip: d.local_ip.map(|ip| ip.to_string()).unwrap_or_default(),
        mac: d.mac.clone(),
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("UUID:     {}", d.uuid),
        format!("Name:     {}", d.name.as_deref().unwrap_or("-")),
        format!("MAC:      {}", d.mac),
        format!("Type:     {}", d.device_type.as_deref().unwrap_or("-")),
        format!("Subtype:  {}", d.sub_type.as_deref().unwrap_or("-")),
        format!("Region:   {}", d.region.as_deref().unwrap_or("-")),
        format!("Status:   {}", d.online_status),
        format!(
            "IP:       {}",
            d.local_ip.map_or_else(|| "-".into(), |ip| ip.to_string())
        ),
        format!("Firmware: {}", d.firmware_version.as_deref().unwrap_or("-")),
        format!("Hardware: {}", d.hardware_version.as_deref().unwrap_or("-")),
    ];
    if d.channel_ids.len() > 1 {
        lines.push(format!("Channels: {}", d.channel_ids.len()));
    }
    if let Some(bound) = d.bind_time {
        lines.push(format!(
            "Paired:   {} ({})",
            bound.format("%Y-%m-%d %H:%M:%S"),
            util::relative_time(bound)
        ));
    }
    if let Some(seen) = d.last_seen {
        lines.push(format!("Seen:     {}", util::relative_time(seen)));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: HubConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List => {
            Hub::oneshot(config, |hub| async move {
                let snap = hub.devices().current();
                let out = output::render_list(
                    &global.output,
                    &snap,
                    |d| device_row(d, color),
                    |d| d.uuid.clone(),
                );
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }

        DevicesCommand::Show { device } => {
            Hub::oneshot(config, |hub| async move {
                let found = util::resolve_device(&hub, &device)?;
                let out =
                    output::render_single(&global.output, &found, detail, |d| d.uuid.clone());
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }

        DevicesCommand::Rename {
            device,
            name,
            optimistic,
        } => {
            Hub::oneshot(config, |hub| async move {
                let target = util::resolve_device(&hub, &device)?;
                let policy = if optimistic {
                    ApplyPolicy::Optimistic
                } else {
                    ApplyPolicy::Confirmed
                };
                let renamed = hub.rename_device(&target.uuid, &name, policy).await?;
                if !global.quiet {
                    eprintln!("Device {} renamed to '{name}'", renamed.uuid);
                }
                Ok(())
            })
            .await
        }

        DevicesCommand::Watch { fast } => {
            util::watch(
                config,
                fast,
                global.quiet,
                |hub| hub.devices(),
                |snap| {
                    output::render_list(
                        &global.output,
                        snap,
                        |d| device_row(d, color),
                        |d| d.uuid.clone(),
                    )
                },
            )
            .await
        }
    }
}
