use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Environment variable naming the secrets root for the configurable loader.
pub const ROOT_ENV_VAR: &str = "SECRETS_ROOTPATH";

/// Errors produced while resolving secrets.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The variable that should name the secrets root is unset or empty.
    #[error("secrets root not configured: ${var} is unset or empty")]
    MissingRoot { var: String },
    /// Requested key has no backing entry and no default was given.
    #[error("secret not found for key: {key}")]
    NotFound { key: String },
    /// Any other read failure, passed through unclassified.
    #[error("failed to read secret {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Read-only contract for anything that can resolve a secret key to its value.
///
/// Implementors only provide [`SecretSource::lookup`]; the not-found policy
/// (fail or substitute a default) lives in the provided methods.
pub trait SecretSource: Send + Sync {
    /// Resolve a key. `Ok(None)` means the key does not exist.
    fn lookup(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Resolve a key, failing with [`SecretError::NotFound`] when it is absent.
    fn get(&self, key: &str) -> Result<String, SecretError> {
        self.lookup(key)?.ok_or_else(|| SecretError::NotFound {
            key: key.to_string(),
        })
    }

    /// Resolve a key, returning `default` when it is absent.
    fn get_or(&self, key: &str, default: &str) -> Result<String, SecretError> {
        Ok(self.lookup(key)?.unwrap_or_else(|| default.to_string()))
    }
}

/// In-memory source for tests and local smoke runs.
#[derive(Debug, Default, Clone)]
pub struct InMemorySecretSource {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a secret.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SecretError> {
        let key = key.into();
        let mut map = self.inner.lock().map_err(|err| SecretError::Io {
            key: key.clone(),
            source: io::Error::other(format!("lock poisoned: {err}")),
        })?;
        map.insert(key, value.into());
        Ok(())
    }
}

impl SecretSource for InMemorySecretSource {
    fn lookup(&self, key: &str) -> Result<Option<String>, SecretError> {
        let map = self.inner.lock().map_err(|err| SecretError::Io {
            key: key.to_string(),
            source: io::Error::other(format!("lock poisoned: {err}")),
        })?;
        Ok(map.get(key).cloned())
    }
}
