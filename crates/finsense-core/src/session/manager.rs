//! Session manager: owns the authentication lifecycle.
//!
//! State machine `Unauthenticated -> Loading -> Authenticated`, with the
//! reverse edge taken on logout or on any authentication failure. The
//! manager is the single writer of session state; the view layer only reads
//! the projections exposed here.

use std::path::PathBuf;

use anyhow::Result;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::types::UserProfile;
use crate::session::store::SessionStore;

/// Outcome of the startup reconciliation.
#[derive(Debug)]
pub enum Startup {
    /// No stored token; nothing was fetched.
    SignedOut,
    /// Stored token validated against a freshly fetched profile.
    Resumed(UserProfile),
    /// Stored token rejected or unverifiable; session cleared.
    Expired(ApiError),
}

/// Owns `(token, profile, loading)` and the transitions between them.
pub struct SessionManager {
    store_path: PathBuf,
    token: Option<String>,
    user: Option<UserProfile>,
    loading: bool,
    in_flight: bool,
}

impl SessionManager {
    /// Creates a manager over the default session store.
    pub fn new() -> Self {
        Self::with_store_path(SessionStore::default_path())
    }

    /// Creates a manager over an explicit session store path.
    pub fn with_store_path(store_path: PathBuf) -> Self {
        Self {
            store_path,
            token: None,
            user: None,
            loading: false,
            in_flight: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Reconciles the stored token against a fresh profile fetch.
    ///
    /// No stored token resolves to `SignedOut` without any network call.
    /// A rejected or unverifiable token triggers the same cleanup as logout.
    pub async fn startup(&mut self, client: &ApiClient) -> Result<Startup> {
        self.begin_transition()?;
        let outcome = self.startup_inner(client).await;
        self.in_flight = false;
        outcome
    }

    async fn startup_inner(&mut self, client: &ApiClient) -> Result<Startup> {
        let store = SessionStore::load_at(&self.store_path)?;
        let Some(token) = store.token else {
            self.loading = false;
            return Ok(Startup::SignedOut);
        };

        self.token = Some(token);
        self.loading = true;

        match client.get_profile().await {
            Ok(profile) => {
                self.persist(Some(profile.clone()))?;
                self.user = Some(profile.clone());
                self.loading = false;
                Ok(Startup::Resumed(profile))
            }
            Err(err) => {
                tracing::debug!("startup profile fetch failed: {err}");
                self.clear_session()?;
                Ok(Startup::Expired(err))
            }
        }
    }

    /// Signs in. Not complete until the profile is known; a token whose
    /// profile cannot be fetched is discarded again.
    pub async fn login(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<UserProfile> {
        self.begin_transition()?;
        let outcome = self.login_inner(client, username, password).await;
        self.in_flight = false;
        outcome
    }

    async fn login_inner(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<UserProfile> {
        let grant = client.login(username, password).await?;
        self.token = Some(grant.access_token);
        self.persist(None)?;

        match client.get_profile().await {
            Ok(profile) => {
                self.persist(Some(profile.clone()))?;
                self.user = Some(profile.clone());
                Ok(profile)
            }
            Err(err) => {
                self.clear_session()?;
                Err(err.into())
            }
        }
    }

    /// Creates an account, then performs the full login transition.
    /// Never leaves the user registered-but-not-signed-in.
    pub async fn register(
        &mut self,
        client: &ApiClient,
        email: &str,
        username: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserProfile> {
        self.begin_transition()?;
        let outcome = async {
            client.register(email, username, full_name, password).await?;
            self.login_inner(client, username, password).await
        }
        .await;
        self.in_flight = false;
        outcome
    }

    /// Signs out. Idempotent; returns whether a token was stored.
    pub fn logout(&mut self) -> Result<bool> {
        self.token = None;
        self.user = None;
        self.loading = false;
        SessionStore::clear_at(&self.store_path)
    }

    /// Single cleanup shared by logout and every auth-failure path.
    fn clear_session(&mut self) -> Result<()> {
        self.logout()?;
        Ok(())
    }

    fn persist(&self, user: Option<UserProfile>) -> Result<()> {
        SessionStore {
            token: self.token.clone(),
            user,
        }
        .save_at(&self.store_path)
    }

    /// Single-slot in-flight guard: session transitions never race, a second
    /// one fails fast while the first is still running.
    fn begin_transition(&mut self) -> Result<()> {
        if self.in_flight {
            anyhow::bail!("another session operation is already in progress");
        }
        self.in_flight = true;
        Ok(())
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
