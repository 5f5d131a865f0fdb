// ── Device domain types ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability of a device as reported by the broker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum OnlineStatus {
    #[default]
    Unknown,
    /// Paired but never seen by the broker.
    NotOnline,
    Online,
    Offline,
    Upgrading,
}

impl OnlineStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Map the broker's integer status code. Unrecognized codes (including
/// the explicit `-1`) become `Unknown`.
impl From<i64> for OnlineStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::NotOnline,
            1 => Self::Online,
            2 => Self::Offline,
            3 => Self::Upgrading,
            _ => Self::Unknown,
        }
    }
}

/// The canonical device type: a hardware unit paired to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub uuid: String,
    pub mac: String,
    /// User-assigned name. `None` for devices never named in the app.
    pub name: Option<String>,

    // Classification
    pub device_type: Option<String>,
    pub sub_type: Option<String>,
    pub region: Option<String>,

    // Firmware / hardware
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,

    // Connectivity
    pub online_status: OnlineStatus,
    pub local_ip: Option<IpAddr>,
    pub domain: Option<String>,
    pub reserved_domain: Option<String>,

    // Ownership
    pub user_id: Option<String>,
    pub user_email: Option<String>,

    // Channels (multi-outlet devices expose one entry per outlet)
    pub channel_ids: Vec<i64>,

    // Timestamps
    pub bind_time: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    /// Best available display name: the user-assigned name, else the
    /// hardware type, else the UUID.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.device_type.as_deref())
            .unwrap_or(&self.uuid)
    }
}
