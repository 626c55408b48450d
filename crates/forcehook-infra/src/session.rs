//! In-memory session and pending-login stores.
//!
//! Sessions hold the platform access token obtained through the OAuth flow
//! and the environment it belongs to. Pending logins tie an OAuth `state`
//! nonce to the environment the browser asked for. Both live only as long
//! as the process and expire after a fixed lifetime; forcehook persists
//! nothing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use secrecy::SecretString;
use uuid::Uuid;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// How long a browser has to come back from the platform's login page.
pub const LOGIN_STATE_TTL: Duration = Duration::from_secs(10 * 60);

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// What a browser session knows about its platform connection.
#[derive(Debug)]
pub struct SessionData {
    pub access_token: SecretString,
    pub env: String,
    created_at: Instant,
}

impl SessionData {
    pub fn new(access_token: SecretString, env: impl Into<String>) -> Self {
        Self {
            access_token,
            env: env.into(),
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// DashMap-backed session table keyed by an opaque random id.
///
/// Expired sessions are dropped when read and swept on every `create`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Arc<SessionData>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Store a session and return its new id.
    pub fn create(&self, data: SessionData) -> String {
        let ttl = self.ttl;
        self.sessions.retain(|_, session| !session.is_expired(ttl));

        let id = new_id();
        self.sessions.insert(id.clone(), Arc::new(data));
        id
    }

    /// A live session. An expired one is removed and reported as absent.
    pub fn get(&self, id: &str) -> Option<Arc<SessionData>> {
        let session = self.sessions.get(id).map(|entry| Arc::clone(entry.value()))?;
        if session.is_expired(self.ttl) {
            let ttl = self.ttl;
            self.sessions.remove_if(id, |_, s| s.is_expired(ttl));
            tracing::debug!("session expired");
            return None;
        }
        Some(session)
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

struct PendingLogin {
    env: String,
    started_at: Instant,
}

/// OAuth `state` nonces issued by `/login` and not yet redeemed.
///
/// A nonce can be redeemed once, within [`LOGIN_STATE_TTL`].
#[derive(Clone)]
pub struct PendingLogins {
    pending: Arc<DashMap<String, PendingLogin>>,
    ttl: Duration,
}

impl Default for PendingLogins {
    fn default() -> Self {
        Self::with_ttl(LOGIN_STATE_TTL)
    }
}

impl PendingLogins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// A fresh unguessable nonce.
    pub fn new_nonce() -> String {
        new_id()
    }

    /// Record that a login for `env` was started with `nonce`.
    pub fn insert(&self, nonce: &str, env: &str) {
        let ttl = self.ttl;
        self.pending.retain(|_, login| login.started_at.elapsed() < ttl);
        self.pending.insert(
            nonce.to_string(),
            PendingLogin {
                env: env.to_string(),
                started_at: Instant::now(),
            },
        );
    }

    /// Redeem a nonce, returning its environment. Unknown, expired or
    /// already-redeemed nonces yield `None`.
    pub fn complete(&self, nonce: &str) -> Option<String> {
        let (_, login) = self.pending.remove(nonce)?;
        (login.started_at.elapsed() < self.ttl).then_some(login.env)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
