use std::sync::Arc;

use anyhow::Result;

use crate::api::HttpCommandPort;
use crate::config::FrontendConfig;
use crate::port::RemoteCommandPort;
use crate::settings::SettingsStore;
use crate::store::{FetchOutcome, FileStore, PersonStore, RecordStore};

/// The stores a UI works with, built once at start-up and dropped at
/// shutdown. All collection stores share one port.
pub struct AppStores {
    pub persons: PersonStore,
    pub files: FileStore,
    pub records: RecordStore,
    pub settings: SettingsStore,
}

/// Outcome of each listing issued by [`AppStores::preload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadOutcome {
    pub persons: FetchOutcome,
    pub files: FetchOutcome,
    pub records: FetchOutcome,
}

impl AppStores {
    pub fn new(port: Arc<dyn RemoteCommandPort>, settings: SettingsStore) -> Self {
        Self {
            persons: PersonStore::new(port.clone()),
            files: FileStore::new(port.clone()),
            records: RecordStore::new(port),
            settings,
        }
    }

    /// Stores talking HTTP to `config.api_url`.
    pub fn connect(config: &FrontendConfig) -> Result<Self> {
        let port = HttpCommandPort::new(config.api_url.clone())?;
        Ok(Self::new(
            Arc::new(port),
            SettingsStore::open(&config.settings_path),
        ))
    }

    /// Loads every collection concurrently.
    pub async fn preload(&self) -> PreloadOutcome {
        let (persons, files, records) = tokio::join!(
            self.persons.fetch_all(),
            self.files.fetch_all(),
            self.records.fetch_all()
        );
        PreloadOutcome {
            persons,
            files,
            records,
        }
    }
}
