//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};

use hubctl_core::{Device, Hub, HubConfig, PollStore, ServiceStatus};

use crate::error::CliError;

/// Resolve a device identifier (UUID, MAC, or name) via snapshot lookup.
pub fn resolve_device(hub: &Hub, identifier: &str) -> Result<Device, CliError> {
    let snap = hub.devices().current();
    for device in snap.iter() {
        if device.uuid == identifier
            || device.mac.eq_ignore_ascii_case(identifier)
            || device.display_name().eq_ignore_ascii_case(identifier)
        {
            return Ok(device.clone());
        }
    }
    Err(CliError::NotFound {
        resource_type: "device".into(),
        identifier: identifier.into(),
        list_command: "devices list".into(),
    })
}

/// Resolve a service by name via snapshot lookup.
pub fn find_service(hub: &Hub, name: &str) -> Result<ServiceStatus, CliError> {
    let snap = hub.services().current();
    snap.iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "service".into(),
            identifier: name.into(),
            list_command: "services list".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Drive a watch session: connect, re-render on every snapshot, stop on
/// Ctrl-C.
///
/// `store_of` picks which store to follow; `render` formats a snapshot.
/// Renders go to stdout, timestamps to stderr, so piped output stays
/// machine-readable.
pub async fn watch<T, S, R>(
    mut config: HubConfig,
    fast: bool,
    quiet: bool,
    store_of: S,
    render: R,
) -> Result<(), CliError>
where
    T: Clone + Send + Sync + 'static,
    S: Fn(&Hub) -> &PollStore<T>,
    R: Fn(&[T]) -> String,
{
    // A watch with polling disabled would never update
    if config.poll_interval_secs == 0 {
        config.poll_interval_secs = 10;
    }

    let hub = Hub::new(config)?;
    hub.connect().await?;

    let store = store_of(&hub);
    let _hold = fast.then(|| store.hold_fast_poll());
    let mut feed = store.subscribe();

    print_frame(&render(&feed.current()), quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = feed.changed() => {
                match next {
                    Some(snap) => print_frame(&render(&snap), quiet),
                    None => break,
                }
            }
        }
    }

    hub.shutdown().await;
    Ok(())
}

fn print_frame(rendered: &str, quiet: bool) {
    if !quiet {
        eprintln!("-- {} --", chrono::Local::now().format("%H:%M:%S"));
    }
    println!("{rendered}");
}

/// Format a timestamp as a relative duration ("2days 3h 12m ago").
pub fn relative_time(ts: DateTime<Utc>) -> String {
    let Ok(elapsed) = Utc::now().signed_duration_since(ts).to_std() else {
        return "in the future".into();
    };
    let secs = elapsed.as_secs();
    if secs < 60 {
        return "just now".into();
    }
    // Truncate to whole minutes so the output stays short
    let truncated = std::time::Duration::from_secs(secs - secs % 60);
    format!("{} ago", humantime::format_duration(truncated))
}
