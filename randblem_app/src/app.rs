use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use randblem_bungie::{
    BungieConfig, DestinyClient, EmblemPoller, KeyringTokenStore, PollConfig, PollMetrics,
};
use randblem_store::JsonPreferenceStore;
use tokio::sync::watch;

use crate::{
    AppError, Credentials, RandomizerSnapshot, SnapshotEventSink,
    token_store::{
        KEYRING_ACCOUNT, KEYRING_SERVICE, PreferenceTokenStore, RefreshTokenStore, TokenBackend,
    },
};

#[derive(Clone)]
pub struct RandomizerApp {
    preferences: Arc<JsonPreferenceStore>,
    state: Arc<Mutex<RandomizerSnapshot>>,
    updates: watch::Sender<RandomizerSnapshot>,
}

impl RandomizerApp {
    /// Opens the preferences file at `path`, or at the platform default.
    pub fn open(path: Option<PathBuf>) -> Result<Self, AppError> {
        let path = match path {
            Some(path) => path,
            None => JsonPreferenceStore::default_path()?,
        };
        log::debug!("using preferences file {}", path.display());
        Ok(Self::from_preferences(JsonPreferenceStore::open(path)?))
    }

    pub fn from_preferences(preferences: JsonPreferenceStore) -> Self {
        let (updates, _) = watch::channel(RandomizerSnapshot::default());
        Self {
            preferences: Arc::new(preferences),
            state: Arc::new(Mutex::new(RandomizerSnapshot::default())),
            updates,
        }
    }

    pub fn preferences(&self) -> &JsonPreferenceStore {
        &self.preferences
    }

    pub fn credentials(&self) -> Result<Credentials, AppError> {
        Credentials::from_preferences(&self.preferences)
    }

    /// Validated connection settings; fails before any network traffic when
    /// a required credential is missing.
    pub fn bungie_config(&self) -> Result<BungieConfig, AppError> {
        let config = self.credentials()?.into_config();
        config.validate()?;
        Ok(config)
    }

    pub fn token_store(&self, backend: TokenBackend) -> RefreshTokenStore {
        match backend {
            TokenBackend::Preferences => RefreshTokenStore::Preferences(PreferenceTokenStore::new(
                Arc::clone(&self.preferences),
            )),
            TokenBackend::Keyring => RefreshTokenStore::Keyring(KeyringTokenStore::new(
                KEYRING_SERVICE,
                KEYRING_ACCOUNT,
            )),
        }
    }

    pub fn event_sink(&self) -> SnapshotEventSink {
        SnapshotEventSink {
            state: Arc::clone(&self.state),
            updates: self.updates.clone(),
        }
    }

    pub fn snapshot(&self) -> Result<RandomizerSnapshot, AppError> {
        Ok(self
            .state
            .lock()
            .map_err(|_| AppError::StatePoisoned)?
            .clone())
    }

    /// Receives a copy of the snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<RandomizerSnapshot> {
        self.updates.subscribe()
    }

    pub fn poller<C>(&self, client: C, config: PollConfig) -> EmblemPoller<C, SnapshotEventSink>
    where
        C: DestinyClient + Send,
    {
        EmblemPoller::new(client, self.event_sink(), config)
    }

    pub async fn run_until_shutdown<C>(
        &self,
        client: C,
        config: PollConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> PollMetrics
    where
        C: DestinyClient + Send,
    {
        let mut poller = self.poller(client, config);
        poller.run_until_shutdown(shutdown_rx).await;
        let metrics = poller.metrics();
        log::info!("emblem poller stopped after {} equips", metrics.equips);
        metrics
    }
}
