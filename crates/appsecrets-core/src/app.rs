use std::fmt;

use tracing::{debug, instrument};

use crate::source::{SecretError, SecretSource};

/// Key of the application signing key.
pub const SECRET_KEY: &str = "app-secrets/django-secret-key";
/// Key of the database user name.
pub const DATABASE_USERNAME: &str = "database-secrets/username";
/// Key of the database password.
pub const DATABASE_PASSWORD: &str = "database-secrets/password";

/// Every key [`AppSecrets::load`] requires, in load order.
pub const REQUIRED_KEYS: [&str; 3] = [SECRET_KEY, DATABASE_USERNAME, DATABASE_PASSWORD];

/// Secrets the hosting application needs before it can start.
///
/// Built once at startup and handed to whatever needs credentials. `Debug`
/// redacts every value.
#[derive(Clone, PartialEq, Eq)]
pub struct AppSecrets {
    pub secret_key: String,
    pub database_username: String,
    pub database_password: String,
}

impl AppSecrets {
    /// Eagerly resolve all required secrets. The first missing one fails the load.
    #[instrument(skip_all)]
    pub fn load<S: SecretSource>(source: &S) -> Result<Self, SecretError> {
        let secrets = Self {
            secret_key: source.get(SECRET_KEY)?,
            database_username: source.get(DATABASE_USERNAME)?,
            database_password: source.get(DATABASE_PASSWORD)?,
        };
        debug!(count = REQUIRED_KEYS.len(), "application secrets loaded");
        Ok(secrets)
    }
}

impl fmt::Debug for AppSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSecrets")
            .field("secret_key", &"<redacted>")
            .field("database_username", &"<redacted>")
            .field("database_password", &"<redacted>")
            .finish()
    }
}
