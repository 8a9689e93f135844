use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};

use crate::storage::config::Config;

const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com/v1";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read session file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse session: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Identity provider error: {0}")]
    ProviderError(String),
    #[error("No session established")]
    NoSession,
}

/// The signed-in user. Every stored record belongs to exactly one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub identity: Identity,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(uid: String, id_token: String, refresh_token: String, expires_in_seconds: i64) -> Self {
        Self {
            identity: Identity::new(uid),
            id_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }

    pub fn needs_refresh(&self) -> bool {
        let buffer = chrono::Duration::minutes(5);
        self.expires_at <= Utc::now() + buffer
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Session, AuthError>;

    async fn sign_in_anonymously(&self) -> Result<Session, AuthError>;

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
}

/// Supplies the bearer token the document store authenticates with.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn id_token(&self) -> Result<String, AuthError>;
}

pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save_session(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Session, AuthError> {
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(session)
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

pub struct FirebaseAuthClient {
    api_key: String,
    auth_base_url: String,
    token_base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    local_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    users: Option<Vec<LookupUser>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    user_id: Option<String>,
}

fn parse_expires_in(value: Option<&str>) -> i64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(3600)
}

impl FirebaseAuthClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            token_base_url: DEFAULT_TOKEN_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(config.backend.api_key.clone());
        if let Some(url) = &config.backend.auth_base_url {
            client.auth_base_url = url.clone();
        }
        if let Some(url) = &config.backend.token_base_url {
            client.token_base_url = url.clone();
        }
        client
    }

    pub fn with_base_urls(mut self, auth_base_url: String, token_base_url: String) -> Self {
        self.auth_base_url = auth_base_url;
        self.token_base_url = token_base_url;
        self
    }

    async fn post_accounts(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}/accounts:{}", self.auth_base_url, endpoint);
        let response = self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("accounts:{} response status: {}", endpoint, status);

        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::ProviderError(format!("Status {}: {}", status, error_text)));
        }

        Ok(response)
    }

    async fn lookup_uid(&self, id_token: &str) -> Result<String, AuthError> {
        let response = self
            .post_accounts("lookup", serde_json::json!({ "idToken": id_token }))
            .await?;
        let lookup: LookupResponse = response.json().await?;

        lookup.users
            .and_then(|users| users.into_iter().next())
            .map(|user| user.local_id)
            .ok_or_else(|| AuthError::ProviderError("Lookup returned no user".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<Session, AuthError> {
        tracing::info!("Signing in with bootstrap token");
        let response = self
            .post_accounts(
                "signInWithCustomToken",
                serde_json::json!({ "token": token, "returnSecureToken": true }),
            )
            .await?;
        let sign_in: SignInResponse = response.json().await?;

        let uid = match sign_in.local_id {
            Some(uid) => uid,
            None => self.lookup_uid(&sign_in.id_token).await?,
        };

        Ok(Session::new(
            uid,
            sign_in.id_token,
            sign_in.refresh_token,
            parse_expires_in(sign_in.expires_in.as_deref()),
        ))
    }

    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        tracing::info!("Signing in anonymously");
        let response = self
            .post_accounts("signUp", serde_json::json!({ "returnSecureToken": true }))
            .await?;
        let sign_in: SignInResponse = response.json().await?;

        let uid = sign_in.local_id
            .ok_or_else(|| AuthError::ProviderError("Anonymous sign-up returned no user id".to_string()))?;

        Ok(Session::new(
            uid,
            sign_in.id_token,
            sign_in.refresh_token,
            parse_expires_in(sign_in.expires_in.as_deref()),
        ))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let url = format!("{}/token", self.token_base_url);
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", session.refresh_token.as_str()),
        ];

        let response = self.client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AuthError::ProviderError(format!("Status {}: {}", status, error_text)));
        }

        let refreshed: RefreshResponse = response.json().await?;
        let uid = refreshed.user_id.unwrap_or_else(|| session.identity.uid.clone());

        Ok(Session::new(
            uid,
            refreshed.id_token,
            refreshed.refresh_token,
            parse_expires_in(refreshed.expires_in.as_deref()),
        ))
    }
}

/// Identity for the local offline store. Never touches the network.
pub struct LocalIdentityProvider {
    uid: String,
}

impl LocalIdentityProvider {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    fn session(&self) -> Session {
        Session::new(self.uid.clone(), String::new(), String::new(), 60 * 60 * 24 * 365)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_with_custom_token(&self, _token: &str) -> Result<Session, AuthError> {
        Ok(self.session())
    }

    async fn sign_in_anonymously(&self) -> Result<Session, AuthError> {
        Ok(self.session())
    }

    async fn refresh(&self, _session: &Session) -> Result<Session, AuthError> {
        Ok(self.session())
    }
}

/// Establishes the session and broadcasts the current identity.
///
/// Receivers from [`IdentityClient::subscribe`] see `None` until a session
/// exists and see every later change.
pub struct IdentityClient {
    provider: Arc<dyn IdentityProvider>,
    storage: Option<SessionStorage>,
    session: Mutex<Option<Session>>,
    sender: watch::Sender<Option<Identity>>,
}

impl IdentityClient {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            provider,
            storage: None,
            session: Mutex::new(None),
            sender,
        }
    }

    pub fn with_session_storage(mut self, storage: SessionStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    /// Signs in, preferring `bootstrap_token`, then a cached session, then an
    /// anonymous account. Failure is logged and leaves the identity empty.
    pub async fn establish_session(&self, bootstrap_token: Option<&str>) -> Option<Identity> {
        match self.sign_in(bootstrap_token).await {
            Ok(session) => {
                let identity = session.identity.clone();
                if let Some(storage) = &self.storage
                    && let Err(e) = storage.save_session(&session)
                {
                    tracing::warn!("Failed to cache session: {}", e);
                }
                *self.session.lock().await = Some(session);
                tracing::info!("Signed in as {}", identity.uid);
                self.sender.send_replace(Some(identity.clone()));
                Some(identity)
            }
            Err(e) => {
                tracing::error!("Auth error: {}", e);
                None
            }
        }
    }

    async fn sign_in(&self, bootstrap_token: Option<&str>) -> Result<Session, AuthError> {
        if let Some(token) = bootstrap_token.filter(|t| !t.is_empty()) {
            return self.provider.sign_in_with_custom_token(token).await;
        }

        if let Some(cached) = self.storage.as_ref().and_then(|s| s.load_session().ok()) {
            if !cached.needs_refresh() {
                return Ok(cached);
            }
            match self.provider.refresh(&cached).await {
                Ok(session) => return Ok(session),
                Err(e) => tracing::warn!("Cached session could not be refreshed: {}", e),
            }
        }

        self.provider.sign_in_anonymously().await
    }

    pub async fn sign_out(&self) {
        *self.session.lock().await = None;
        if let Some(storage) = &self.storage
            && let Err(e) = storage.clear()
        {
            tracing::warn!("Failed to clear cached session: {}", e);
        }
        self.sender.send_replace(None);
    }
}

#[async_trait]
impl TokenSource for IdentityClient {
    async fn id_token(&self) -> Result<String, AuthError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(AuthError::NoSession)?;

        if session.needs_refresh() {
            let refreshed = self.provider.refresh(session).await?;
            if let Some(storage) = &self.storage
                && let Err(e) = storage.save_session(&refreshed)
            {
                tracing::warn!("Failed to cache refreshed session: {}", e);
            }
            let token = refreshed.id_token.clone();
            *guard = Some(refreshed);
            return Ok(token);
        }

        Ok(session.id_token.clone())
    }
}
