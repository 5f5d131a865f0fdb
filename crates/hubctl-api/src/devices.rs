// Admin API device endpoints
//
// Device inventory lives in the hub's pairing database; the admin surface
// exposes listing plus a single-field rename patch.

use tracing::debug;

use crate::client::AdminClient;
use crate::error::Error;
use crate::models::{DevicePatch, DeviceRecord};

impl AdminClient {
    /// List all paired devices.
    ///
    /// `GET /_admin_/devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.admin_url("devices");
        debug!("listing devices");
        self.get(url).await
    }

    /// Apply a partial patch to a device, returning the updated record.
    ///
    /// `PUT /_admin_/devices/{uuid}`
    ///
    /// The backend only accepts `dev_name`; any other key earns an
    /// HTTP 400 with an "Unsupported patch arguments" message.
    pub async fn update_device(
        &self,
        uuid: &str,
        patch: &DevicePatch,
    ) -> Result<DeviceRecord, Error> {
        let url = self.admin_url(&format!("devices/{uuid}"));
        debug!(uuid, "patching device");
        self.put(url, patch).await
    }

    /// Rename a device, returning the server-confirmed record.
    pub async fn rename_device(&self, uuid: &str, name: &str) -> Result<DeviceRecord, Error> {
        self.update_device(uuid, &DevicePatch::rename(name)).await
    }
}
