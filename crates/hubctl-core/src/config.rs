// ── Runtime connection configuration ──
//
// These types describe *how* to talk to a hub: base URL, TLS posture,
// and polling cadences. They never touch disk -- the CLI constructs a
// `HubConfig` from its own config layer and hands it in.

use std::time::Duration;

use url::Url;

/// TLS verification strategy.
///
/// The admin API is usually plain HTTP on the LAN; the TLS knobs exist
/// for hubs parked behind a reverse proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed proxies).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single hub.
///
/// Built by the CLI, passed to [`Hub`](crate::Hub) -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub base URL (e.g. `http://homeassistant.local:2002`).
    pub url: Url,
    /// TLS verification strategy (only relevant for `https` hubs).
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Base polling cadence for device/subdevice/service snapshots
    /// (seconds). 0 = fetch once at connect and never again.
    pub poll_interval_secs: u64,
    /// Polling cadence while at least one fast-poll hold is active (seconds).
    pub fast_poll_interval_secs: u64,
    /// Polling cadence for service log feeds (seconds). 0 = fetch once per tail.
    pub log_poll_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://homeassistant.local:2002"
                .parse()
                .expect("valid default URL"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll_interval_secs: 10,
            fast_poll_interval_secs: 2,
            log_poll_interval_secs: 10,
        }
    }
}
