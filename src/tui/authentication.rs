use std::io;
use std::sync::Arc;

use courtesy_cal::{
    storage::{cache::SqliteStore, config::Config},
    sync::{
        firestore::FirestoreStore,
        identity::{FirebaseAuthClient, Identity, IdentityClient, LocalIdentityProvider, SessionStorage, TokenSource},
        store::EventStore,
        sync_engine::StoreClient,
    },
};

const LOCAL_UID: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendKind {
    Hosted,
    Offline,
    /// Hosted backend without `api_key`/`project_id`; nothing can sign in.
    Unconfigured,
}

pub struct Backend {
    pub kind: BackendKind,
    pub identity: Arc<IdentityClient>,
    pub store: StoreClient,
}

/// Wires the identity client and event store selected by the config.
pub fn connect(config: &Config, force_offline: bool) -> Result<Backend, io::Error> {
    if force_offline || config.sync.offline_mode {
        let store = SqliteStore::open(&config.sync.offline_database)
            .map_err(|e| io::Error::other(e.to_string()))?;
        tracing::info!("Using offline store at {}", config.sync.offline_database.display());
        let identity = Arc::new(IdentityClient::new(Arc::new(LocalIdentityProvider::new(LOCAL_UID))));
        return Ok(assemble(BackendKind::Offline, identity, Arc::new(store)));
    }

    let kind = if config.backend.is_complete() {
        BackendKind::Hosted
    } else {
        tracing::warn!(
            "Backend is not configured; edit {} to sign in",
            Config::config_path().display()
        );
        BackendKind::Unconfigured
    };

    let identity = Arc::new(
        IdentityClient::new(Arc::new(FirebaseAuthClient::from_config(config)))
            .with_session_storage(SessionStorage::new(config.auth.session_cache.clone())),
    );
    let tokens: Arc<dyn TokenSource> = identity.clone();
    let store = FirestoreStore::from_config(config, tokens);

    Ok(assemble(kind, identity, Arc::new(store)))
}

fn assemble(kind: BackendKind, identity: Arc<IdentityClient>, store: Arc<dyn EventStore>) -> Backend {
    let store = StoreClient::new(store, identity.subscribe());
    Backend { kind, identity, store }
}

impl Backend {
    /// Establishes the session. The command-line token wins over the configured one.
    pub async fn sign_in(&self, config: &Config, token: Option<&str>) -> Option<Identity> {
        if self.kind == BackendKind::Unconfigured {
            return None;
        }
        let token = token.or(config.auth.bootstrap_token.as_deref());
        self.identity.establish_session(token).await
    }
}
