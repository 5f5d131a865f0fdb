// ── Hub session ──
//
// `Hub` owns the admin client, the polled stores, and the background
// tasks that keep them fresh. `connect()` performs the eager initial
// fetch and starts polling; `shutdown()` cancels and joins everything.
// Mutations go straight to the API and patch the affected store on
// success, so consumers see the change without waiting out a poll cycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hubctl_api::AdminClient;
use hubctl_api::models::{AccountUpdate, DevicePatch, ServiceCommand};
use hubctl_api::transport::{TlsMode, TransportConfig};

use crate::config::{HubConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Account, Device, ServiceStatus, Subdevice};
use crate::store::{LinesFuture, LogFetcher, LogStore, LogTail, PollStore, poll_task};

/// How a successful mutation lands in the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyPolicy {
    /// Patch the store only once the hub confirms the change.
    #[default]
    Confirmed,
    /// Patch immediately, roll back if the hub rejects the change.
    Optimistic,
}

struct HubInner {
    config: HubConfig,
    client: Arc<AdminClient>,
    devices: Arc<PollStore<Device>>,
    subdevices: Arc<PollStore<Subdevice>>,
    services: Arc<PollStore<ServiceStatus>>,
    logs: LogStore,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// Live session against one hub.
///
/// Cheap to clone; every clone shares the same stores and tasks.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    /// Build a hub session. No network traffic happens until
    /// [`connect`](Self::connect) or the first mutation.
    pub fn new(config: HubConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = Arc::new(AdminClient::new(config.url.clone(), &transport)?);
        let cancel = CancellationToken::new();

        let log_client = Arc::clone(&client);
        let fetch: LogFetcher = Arc::new(move |service: String| -> LinesFuture {
            let client = Arc::clone(&log_client);
            Box::pin(async move { client.service_log(&service).await })
        });
        let logs = LogStore::new(
            fetch,
            Duration::from_secs(config.log_poll_interval_secs),
            cancel.child_token(),
        );

        Ok(Self {
            inner: Arc::new(HubInner {
                client,
                devices: Arc::new(PollStore::new("devices")),
                subdevices: Arc::new(PollStore::new("subdevices")),
                services: Arc::new(PollStore::new("services")),
                logs,
                cancel,
                task_handles: Mutex::new(Vec::new()),
                config,
            }),
        })
    }

    /// One-shot session: connect with polling disabled, run `f`, shut down.
    ///
    /// Short-lived CLI commands use this; `watch`-style commands drive
    /// [`connect`](Self::connect)/[`shutdown`](Self::shutdown) themselves.
    /// The error type only needs a `From<CoreError>` impl, so callers can
    /// run closures returning their own error type.
    pub async fn oneshot<F, Fut, R, E>(mut config: HubConfig, f: F) -> Result<R, E>
    where
        F: FnOnce(Hub) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<CoreError>,
    {
        config.poll_interval_secs = 0;
        config.log_poll_interval_secs = 0;
        let hub = Hub::new(config)?;
        hub.connect().await?;
        let result = f(hub.clone()).await;
        hub.shutdown().await;
        result
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Fetch every collection once, then start periodic polling.
    ///
    /// The eager fetch means `current()` is populated before this
    /// returns. With `poll_interval_secs == 0` no tasks are started and
    /// the snapshots stay as fetched here.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.refresh_all().await?;

        if self.inner.config.poll_interval_secs > 0 {
            self.spawn_poll_tasks().await;
        }
        Ok(())
    }

    /// One full fetch of devices, subdevices, and services.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let client = &self.inner.client;
        let (devices, subdevices, services) = tokio::join!(
            client.list_devices(),
            client.list_subdevices(),
            client.list_services(),
        );

        self.inner
            .devices
            .apply(devices?.into_iter().map(Device::from).collect());
        self.inner
            .subdevices
            .apply(subdevices?.into_iter().map(Subdevice::from).collect());
        self.inner
            .services
            .apply(services?.into_iter().map(ServiceStatus::from).collect());

        debug!(
            devices = self.inner.devices.len(),
            subdevices = self.inner.subdevices.len(),
            services = self.inner.services.len(),
            "data refresh complete"
        );
        Ok(())
    }

    async fn spawn_poll_tasks(&self) {
        let inner = &self.inner;
        let base = Duration::from_secs(inner.config.poll_interval_secs);
        let fast = Duration::from_secs(inner.config.fast_poll_interval_secs.max(1));
        let mut handles = inner.task_handles.lock().await;

        let client = Arc::clone(&inner.client);
        handles.push(tokio::spawn(poll_task(
            Arc::clone(&inner.devices),
            move || {
                let client = Arc::clone(&client);
                async move {
                    client
                        .list_devices()
                        .await
                        .map(|records| records.into_iter().map(Device::from).collect::<Vec<_>>())
                }
            },
            base,
            fast,
            inner.cancel.child_token(),
        )));

        let client = Arc::clone(&inner.client);
        handles.push(tokio::spawn(poll_task(
            Arc::clone(&inner.subdevices),
            move || {
                let client = Arc::clone(&client);
                async move {
                    client
                        .list_subdevices()
                        .await
                        .map(|records| records.into_iter().map(Subdevice::from).collect::<Vec<_>>())
                }
            },
            base,
            fast,
            inner.cancel.child_token(),
        )));

        let client = Arc::clone(&inner.client);
        handles.push(tokio::spawn(poll_task(
            Arc::clone(&inner.services),
            move || {
                let client = Arc::clone(&client);
                async move {
                    client.list_services().await.map(|records| {
                        records
                            .into_iter()
                            .map(ServiceStatus::from)
                            .collect::<Vec<_>>()
                    })
                }
            },
            base,
            fast,
            inner.cancel.child_token(),
        )));

        info!(
            interval_secs = inner.config.poll_interval_secs,
            "periodic polling started"
        );
    }

    /// Stop polling tasks and log feeds. Idempotent.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        self.inner.logs.clear();
        debug!("hub shut down");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// Raw admin client, for callers needing an endpoint the stores do
    /// not cover.
    pub fn client(&self) -> &AdminClient {
        &self.inner.client
    }

    pub fn devices(&self) -> &PollStore<Device> {
        &self.inner.devices
    }

    pub fn subdevices(&self) -> &PollStore<Subdevice> {
        &self.inner.subdevices
    }

    pub fn services(&self) -> &PollStore<ServiceStatus> {
        &self.inner.services
    }

    pub fn logs(&self) -> &LogStore {
        &self.inner.logs
    }

    /// Tail a service's log feed (see [`LogStore::tail`]).
    pub fn tail_log(&self, service: &str) -> LogTail {
        self.inner.logs.tail(service)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Rename a device.
    ///
    /// `Confirmed` patches the device store from the hub's response;
    /// `Optimistic` patches first and rolls back if the hub rejects the
    /// rename. Either way only the renamed device changes; the rest of
    /// the snapshot is untouched.
    pub async fn rename_device(
        &self,
        uuid: &str,
        name: &str,
        policy: ApplyPolicy,
    ) -> Result<Device, CoreError> {
        let store = &self.inner.devices;
        let previous = store.current().iter().find(|d| d.uuid == uuid).cloned();

        if policy == ApplyPolicy::Optimistic {
            if let Some(device) = &previous {
                let mut patched = device.clone();
                patched.name = Some(name.to_owned());
                store.patch_where(|d| d.uuid == uuid, patched);
            }
        }

        match self
            .inner
            .client
            .update_device(uuid, &DevicePatch::rename(name))
            .await
        {
            Ok(record) => {
                let confirmed = Device::from(record);
                store.patch_where(|d| d.uuid == uuid, confirmed.clone());
                info!(uuid, name, "device renamed");
                Ok(confirmed)
            }
            Err(e) => {
                if policy == ApplyPolicy::Optimistic {
                    if let Some(device) = previous {
                        store.patch_where(|d| d.uuid == uuid, device);
                    }
                }
                Err(match e {
                    hubctl_api::Error::Status { status: 404, .. } => CoreError::DeviceNotFound {
                        identifier: uuid.to_owned(),
                    },
                    other => other.into(),
                })
            }
        }
    }

    /// Send a lifecycle command to a supervised service.
    ///
    /// Returns the supervisor's verdict: `true` means the command was
    /// accepted. On acceptance the service store refreshes right away so
    /// the state change shows up without waiting out the poll interval.
    pub async fn execute_service_command(
        &self,
        service: &str,
        command: ServiceCommand,
    ) -> Result<bool, CoreError> {
        let accepted = self
            .inner
            .client
            .execute_service_command(service, command)
            .await
            .map_err(|e| match e {
                hubctl_api::Error::Status { status: 404, .. } => CoreError::ServiceNotFound {
                    name: service.to_owned(),
                },
                other => other.into(),
            })?;
        if accepted {
            info!(service, command = %command, "service command accepted");
            self.inner.services.request_refresh();
        } else {
            debug!(service, command = %command, "service command refused");
        }
        Ok(accepted)
    }

    /// The account the hub is paired with.
    pub async fn account(&self) -> Result<Account, CoreError> {
        Ok(self.inner.client.account().await?.into())
    }

    /// Replace the paired account credentials.
    ///
    /// The backend restarts its agent and broker services afterwards, so
    /// the service store refreshes right away too.
    pub async fn set_account(&self, update: &AccountUpdate) -> Result<Account, CoreError> {
        let record = self.inner.client.set_account(update).await?;
        info!(email = %update.email, "account updated");
        self.inner.services.request_refresh();
        Ok(record.into())
    }
}

/// Map core TLS settings onto the transport layer's knobs.
fn build_transport(config: &HubConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}
