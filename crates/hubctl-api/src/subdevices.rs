// Admin API subdevice endpoints

use tracing::debug;

use crate::client::AdminClient;
use crate::error::Error;
use crate::models::SubdeviceRecord;

impl AdminClient {
    /// List all sub-devices paired through hub devices.
    ///
    /// `GET /_admin_/subdevices`
    pub async fn list_subdevices(&self) -> Result<Vec<SubdeviceRecord>, Error> {
        let url = self.admin_url("subdevices");
        debug!("listing subdevices");
        self.get(url).await
    }
}
