//! Service command handlers.

use tabled::Tabled;

use hubctl_core::{Hub, HubConfig, PollError, PollErrorKind, ServiceCommand, ServiceStatus};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Exit")]
    exit: String,
}

fn service_row(s: &ServiceStatus, color: bool) -> ServiceRow {
    ServiceRow {
        name: s.name.clone(),
        state: output::paint_state(s.state, color),
        pid: s.pid.map_or_else(String::new, |p| p.to_string()),
        exit: s.exit_code.map_or_else(String::new, |c| c.to_string()),
    }
}

fn detail(s: &ServiceStatus) -> String {
    [
        format!("Name:        {}", s.name),
        format!("State:       {}", s.state),
        format!(
            "PID:         {}",
            s.pid.map_or_else(|| "-".into(), |p| p.to_string())
        ),
        format!(
            "Exit code:   {}",
            s.exit_code.map_or_else(|| "-".into(), |c| c.to_string())
        ),
        format!("Description: {}", s.description.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: HubConfig,
    args: ServicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServicesCommand::List => {
            let color = output::should_color(&global.color);
            Hub::oneshot(config, |hub| async move {
                let snap = hub.services().current();
                let out = output::render_list(
                    &global.output,
                    &snap,
                    |s| service_row(s, color),
                    |s| s.name.clone(),
                );
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }

        ServicesCommand::Show { service } => {
            Hub::oneshot(config, |hub| async move {
                let found = util::find_service(&hub, &service)?;
                let out =
                    output::render_single(&global.output, &found, detail, |s| s.name.clone());
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }

        ServicesCommand::Start { service } => {
            lifecycle(config, service, ServiceCommand::Start, global).await
        }
        ServicesCommand::Stop { service } => {
            lifecycle(config, service, ServiceCommand::Stop, global).await
        }
        ServicesCommand::Restart { service } => {
            lifecycle(config, service, ServiceCommand::Restart, global).await
        }

        ServicesCommand::Logs {
            service,
            follow,
            lines,
        } => logs(config, service, follow, lines, global).await,
    }
}

// ── Lifecycle ───────────────────────────────────────────────────────

/// Send a start/stop/restart to the supervisor and report its verdict.
async fn lifecycle(
    config: HubConfig,
    service: String,
    command: ServiceCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    Hub::oneshot(config, |hub| async move {
        let target = util::find_service(&hub, &service)?;
        let accepted = hub.execute_service_command(&target.name, command).await?;
        if accepted {
            if !global.quiet {
                eprintln!("Service '{}' {}", target.name, past_tense(command));
            }
            Ok(())
        } else {
            Err(CliError::ApiError {
                code: "refused".into(),
                message: format!("supervisor refused to {command} '{}'", target.name),
            })
        }
    })
    .await
}

fn past_tense(command: ServiceCommand) -> &'static str {
    match command {
        ServiceCommand::Start => "started",
        ServiceCommand::Stop => "stopped",
        ServiceCommand::Restart => "restarted",
    }
}

// ── Logs ────────────────────────────────────────────────────────────

/// Print a service log: one batch by default, a live feed with `--follow`.
async fn logs(
    mut config: HubConfig,
    service: String,
    follow: bool,
    lines: usize,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !follow {
        return Hub::oneshot(config, |hub| async move {
            let target = util::find_service(&hub, &service)?;
            let mut tail = hub.tail_log(&target.name);
            match tail.next().await {
                Some(Ok(batch)) => {
                    // Newest-first feed; print the trailing window oldest-first
                    for line in batch.iter().take(lines).rev() {
                        println!("{line}");
                    }
                    Ok(())
                }
                Some(Err(e)) => Err(tail_error(&target.name, &e)),
                None => Ok(()),
            }
        })
        .await;
    }

    // Follow mode drives the session by hand: the log feed needs its poll
    // task, but the collection stores only need their one eager fetch.
    if config.log_poll_interval_secs == 0 {
        config.log_poll_interval_secs = 10;
    }
    config.poll_interval_secs = 0;

    let hub = Hub::new(config)?;
    hub.refresh_all().await?;
    let target = util::find_service(&hub, &service)?;
    let mut tail = hub.tail_log(&target.name);

    let mut last_head: Option<String> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = tail.next() => {
                match next {
                    Some(Ok(batch)) => print_new_lines(&batch, lines, &mut last_head),
                    Some(Err(e)) => {
                        if !global.quiet {
                            eprintln!("log fetch failed ({e}); retrying");
                        }
                    }
                    None => break,
                }
            }
        }
    }

    hub.shutdown().await;
    Ok(())
}

/// Print the lines of `batch` not yet seen, oldest-first.
///
/// Batches arrive newest-first. The head line of the previous batch marks
/// where new content ends; on the first batch only the trailing `lines`
/// window is shown.
fn print_new_lines(batch: &[String], lines: usize, last_head: &mut Option<String>) {
    let new = match last_head.as_ref() {
        None => batch.iter().take(lines).collect::<Vec<_>>(),
        Some(head) => {
            let count = batch.iter().position(|l| l == head).unwrap_or(batch.len());
            batch.iter().take(count).collect()
        }
    };
    for line in new.iter().rev() {
        println!("{line}");
    }
    if let Some(head) = batch.first() {
        *last_head = Some(head.clone());
    }
}

fn tail_error(service: &str, e: &PollError) -> CliError {
    match e.kind {
        PollErrorKind::Http(404) => CliError::NotFound {
            resource_type: "service".into(),
            identifier: service.into(),
            list_command: "services list".into(),
        },
        _ => CliError::ApiError {
            code: "log_fetch".into(),
            message: e.to_string(),
        },
    }
}
