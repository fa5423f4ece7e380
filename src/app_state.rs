//! Implements a struct that holds the state of the web server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use time::Duration;

use crate::{Database, PasswordHash, auth::DEFAULT_SESSION_DURATION};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    ///
    /// A new key is generated every time the server starts, so sessions do
    /// not survive a restart.
    pub cookie_key: Key,

    /// How long a session stays valid after the last authenticated request.
    pub session_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// Where to open a connection to the database for each request.
    pub database: Database,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a freshly generated cookie key.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(database: Database, local_timezone: &str) -> Self {
        Self {
            cookie_key: Key::generate(),
            session_duration: DEFAULT_SESSION_DURATION,
            local_timezone: local_timezone.to_owned(),
            database,
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }

    /// Set how long sessions last between requests.
    pub fn with_session_duration(mut self, session_duration: Duration) -> Self {
        self.session_duration = session_duration;
        self
    }

    /// Set the bcrypt cost for new password hashes.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// The state needed by the pages that read or write a user's ledger.
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// The key for reading and clearing flash notices.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Where to open a connection to the database for each request.
    pub database: Database,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            database: state.database.clone(),
        }
    }
}

impl FromRef<LedgerState> for Key {
    fn from_ref(state: &LedgerState) -> Self {
        state.cookie_key.clone()
    }
}
