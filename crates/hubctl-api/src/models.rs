// Admin API wire types
//
// Models for the hub admin API's plain JSON payloads. Fields use
// `#[serde(default)]` liberally because the backend is inconsistent about
// field presence across addon versions; anything unmodeled lands in the
// `extra` catch-all so newer backends never break deserialization.

use serde::{Deserialize, Serialize};

// ── Device ───────────────────────────────────────────────────────────

/// Full device record from `GET /_admin_/devices`.
///
/// `online_status` is a raw integer (-1 unknown, 0 not yet online,
/// 1 online, 2 offline, 3 upgrading); `bind_time` is epoch seconds and
/// `last_seen_time` an ISO-ish datetime string. `hubctl-core` converts
/// these to typed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub uuid: String,
    pub mac: String,
    #[serde(default)]
    pub dev_name: Option<String>,
    #[serde(default)]
    pub dev_icon_id: Option<String>,
    #[serde(default = "unknown_online_status")]
    pub online_status: i64,
    #[serde(default)]
    pub bind_time: Option<i64>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelRecord>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub fmware_version: Option<String>,
    #[serde(default)]
    pub hdware_version: Option<String>,
    #[serde(default)]
    pub user_dev_icon: Option<String>,
    #[serde(default)]
    pub icon_type: Option<String>,
    #[serde(default)]
    pub skill_number: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub reserved_domain: Option<String>,
    #[serde(default)]
    pub local_ip: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub last_seen_time: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn unknown_online_status() -> i64 {
    -1
}

/// Channel entry nested inside [`DeviceRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    #[serde(default)]
    pub device_channel_id: Option<i64>,
    #[serde(default)]
    pub device_uuid: Option<String>,
    #[serde(default)]
    pub channel_id: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Partial device patch for `PUT /_admin_/devices/{uuid}`.
///
/// The backend rejects patches touching anything but `dev_name` with
/// HTTP 400, so renaming is the only field modeled.
#[derive(Debug, Clone, Serialize)]
pub struct DevicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_name: Option<String>,
}

impl DevicePatch {
    /// A patch renaming the device.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            dev_name: Some(name.into()),
        }
    }
}

// ── Subdevice ────────────────────────────────────────────────────────

/// Sub-device record from `GET /_admin_/subdevices` (sensors and valves
/// paired to a hub device).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubdeviceRecord {
    pub sub_device_id: String,
    #[serde(default)]
    pub true_id: Option<String>,
    #[serde(default)]
    pub sub_device_type: Option<String>,
    #[serde(default)]
    pub sub_device_vendor: Option<String>,
    #[serde(default)]
    pub sub_device_name: Option<String>,
    #[serde(default)]
    pub sub_device_icon_id: Option<String>,
    #[serde(default)]
    pub hub_uuid: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Services ─────────────────────────────────────────────────────────

/// Supervised service record from `GET /_admin_/services`.
///
/// `status` is one of `RUNNING`, `STOPPED`, `DOWN`. `description` is
/// absent on older backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub pid: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Command verb for `POST /_admin_/services/{name}/execute/{command}`.
///
/// Serialized lowercase: the backend supervisor matches `restart`
/// case-sensitively, so anything else would be rejected as an invalid
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceCommand {
    Start,
    Stop,
    Restart,
}

// ── Account ──────────────────────────────────────────────────────────

/// Configured account from `GET`/`PUT /_admin_/configuration/account`.
///
/// The password is write-only; the backend never echoes it. Older
/// backends omit `enable_meross_link` from the response entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub email: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub mqtt_key: Option<String>,
    #[serde(default)]
    pub enable_meross_link: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request body for `PUT /_admin_/configuration/account`.
///
/// All three fields are mandatory, and the link flag is camelCase on the
/// wire for this one request (the backend reads `enableMerossLink`).
#[derive(Debug, Clone, Serialize)]
pub struct AccountUpdate {
    pub email: String,
    pub password: String,
    #[serde(rename = "enableMerossLink")]
    pub enable_meross_link: bool,
}
