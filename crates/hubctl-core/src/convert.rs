// ── API-to-domain type conversions ──
//
// Bridges raw `hubctl_api` wire records into canonical `hubctl_core::model`
// domain types. Each `From` impl parses stringly-typed fields into strong
// types and fills sensible defaults for missing optional data.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDateTime, Utc};

use hubctl_api::models::{AccountRecord, DeviceRecord, ServiceRecord, SubdeviceRecord};

use crate::model::{Account, Device, OnlineStatus, ServiceState, ServiceStatus, Subdevice};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an optional string to an `IpAddr`, silently dropping unparseable values.
fn parse_ip(raw: &Option<String>) -> Option<IpAddr> {
    raw.as_deref().and_then(|s| s.parse().ok())
}

/// Convert an optional epoch-seconds timestamp to `DateTime<Utc>`.
fn epoch_to_datetime(epoch: Option<i64>) -> Option<DateTime<Utc>> {
    epoch.and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Parse the broker's `last_seen_time` strings.
///
/// The backend emits Python's `str(datetime)` (`2024-03-01 18:22:05` with
/// an optional fraction); newer builds send RFC 3339. Anything else
/// becomes `None` rather than an error.
fn parse_datetime(raw: &Option<String>) -> Option<DateTime<Utc>> {
    let s = raw.as_deref()?.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Normalize an optional name: empty strings count as unnamed.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Device ─────────────────────────────────────────────────────────

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        Self {
            name: non_empty(r.dev_name),
            online_status: OnlineStatus::from(r.online_status),
            local_ip: parse_ip(&r.local_ip),
            bind_time: epoch_to_datetime(r.bind_time),
            last_seen: parse_datetime(&r.last_seen_time),
            channel_ids: r.channels.iter().filter_map(|c| c.channel_id).collect(),
            uuid: r.uuid,
            mac: r.mac,
            device_type: r.device_type,
            sub_type: r.sub_type,
            region: r.region,
            firmware_version: r.fmware_version,
            hardware_version: r.hdware_version,
            domain: r.domain,
            reserved_domain: r.reserved_domain,
            user_id: r.user_id,
            user_email: r.user_email,
        }
    }
}

// ── Subdevice ──────────────────────────────────────────────────────

impl From<SubdeviceRecord> for Subdevice {
    fn from(r: SubdeviceRecord) -> Self {
        Self {
            name: non_empty(r.sub_device_name),
            id: r.sub_device_id,
            true_id: r.true_id,
            kind: r.sub_device_type,
            vendor: r.sub_device_vendor,
            hub_uuid: r.hub_uuid,
        }
    }
}

// ── Service ────────────────────────────────────────────────────────

impl From<ServiceRecord> for ServiceStatus {
    fn from(r: ServiceRecord) -> Self {
        Self {
            state: r.status.parse().unwrap_or(ServiceState::Unknown),
            name: r.name,
            pid: r.pid,
            exit_code: r.exit_code,
            description: r.description,
        }
    }
}

// ── Account ────────────────────────────────────────────────────────

impl From<AccountRecord> for Account {
    fn from(r: AccountRecord) -> Self {
        Self {
            email: r.email,
            user_id: r.user_id,
            mqtt_key: r.mqtt_key,
            meross_link: r.enable_meross_link,
        }
    }
}
