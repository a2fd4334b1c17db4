use tracing::debug;

use crate::client::{AppIdSet, ClientError, SteamClient};

#[derive(Debug, Default)]
pub struct PresenceHeartbeat {
    declared: AppIdSet,
    announcements: u64,
}

impl PresenceHeartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `app_ids` as currently played, replacing the previous declaration.
    ///
    /// Sending the same set again is harmless. A failed call leaves the
    /// remembered declaration untouched and is returned as is, no retry.
    pub async fn announce<C: SteamClient + ?Sized>(
        &mut self,
        client: &mut C,
        app_ids: &AppIdSet,
    ) -> Result<(), ClientError> {
        debug!(apps = %app_ids, "Announcing presence");
        client.games_played(&app_ids.to_vec()).await?;
        self.declared = app_ids.clone();
        self.announcements += 1;
        Ok(())
    }

    /// Declare that nothing is being played.
    pub async fn revoke<C: SteamClient + ?Sized>(&mut self, client: &mut C) -> Result<(), ClientError> {
        self.announce(client, &AppIdSet::empty()).await
    }

    /// The last declaration the network accepted.
    pub fn declared(&self) -> &AppIdSet {
        &self.declared
    }

    pub fn announcements(&self) -> u64 {
        self.announcements
    }
}
