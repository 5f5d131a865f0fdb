// Admin API account configuration endpoints
//
// The hub authenticates devices against one configured account; setting it
// re-provisions credentials, after which the backend restarts its broker
// services on its own.

use tracing::debug;

use crate::client::AdminClient;
use crate::error::Error;
use crate::models::{AccountRecord, AccountUpdate};

impl AdminClient {
    /// Fetch the currently configured account.
    ///
    /// `GET /_admin_/configuration/account`
    ///
    /// Responds 400 when no account has been configured yet.
    pub async fn account(&self) -> Result<AccountRecord, Error> {
        let url = self.admin_url("configuration/account");
        debug!("fetching account configuration");
        self.get(url).await
    }

    /// Configure the account, returning the stored record.
    ///
    /// `PUT /_admin_/configuration/account`
    pub async fn set_account(&self, update: &AccountUpdate) -> Result<AccountRecord, Error> {
        let url = self.admin_url("configuration/account");
        debug!(email = %update.email, "configuring account");
        self.put(url, update).await
    }
}
