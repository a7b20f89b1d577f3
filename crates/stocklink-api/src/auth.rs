use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::storage::{KeyValueStore, keys};

/// Bearer credential issued by the backend at login.
///
/// Read fresh from durable storage on every request so a logout or a 401
/// elsewhere takes effect on the very next call.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token. Blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(raw)))
    }

    /// The persisted credential, if any.
    pub fn from_storage(store: &dyn KeyValueStore) -> Option<Self> {
        store.get(keys::TOKEN).and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), crate::storage::StorageError> {
        store.set(keys::TOKEN, self.expose())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

/// Drop the persisted credential and cached profile after the backend
/// refused them. Storage failures are logged, not raised: the caller is
/// already on an error path.
pub(crate) fn forget_rejected_credential(store: &dyn KeyValueStore) {
    for key in [keys::TOKEN, keys::USER] {
        if let Err(e) = store.remove(key) {
            warn!(key, error = %e, "failed to remove rejected credential");
        }
    }
}
