use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use appsecrets_core::source::{SecretError, SecretSource, ROOT_ENV_VAR};
use tracing::{debug, instrument};

/// Conventional mount point for Kubernetes Secret volumes.
pub const DEFAULT_MOUNT_PATH: &str = "/etc/secrets";

/// Reads secrets from files under a fixed root, one file per key.
///
/// The root is stored as given; nothing is checked until a secret is read.
/// Every read goes to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSecretLoader {
    root: PathBuf,
}

impl FileSecretLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loader rooted at [`DEFAULT_MOUNT_PATH`].
    pub fn mounted() -> Self {
        Self::new(DEFAULT_MOUNT_PATH)
    }

    /// Loader rooted at `$SECRETS_ROOTPATH`.
    pub fn from_env() -> Result<Self, SecretError> {
        Self::from_env_var(ROOT_ENV_VAR)
    }

    /// Loader rooted at the directory named by `var`. Unset or empty is an error.
    pub fn from_env_var(var: &str) -> Result<Self, SecretError> {
        match env::var_os(var) {
            Some(root) if !root.is_empty() => {
                debug!(var, "secrets root taken from environment");
                Ok(Self::new(root))
            }
            _ => Err(SecretError::MissingRoot {
                var: var.to_string(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a key resolves to. Leading separators are dropped so the key
    /// always lands under the root.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }

    /// Read a secret, failing with [`SecretError::NotFound`] if its file is missing.
    pub fn get_secret(&self, key: &str) -> Result<String, SecretError> {
        self.get(key)
    }

    /// Read a secret, returning `default` if its file is missing.
    pub fn get_secret_or(&self, key: &str, default: &str) -> Result<String, SecretError> {
        self.get_or(key, default)
    }
}

impl SecretSource for FileSecretLoader {
    #[instrument(skip_all, fields(key = %key))]
    fn lookup(&self, key: &str) -> Result<Option<String>, SecretError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => {
                debug!("secret resolved");
                Ok(Some(value))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "secret file missing");
                Ok(None)
            }
            Err(source) => Err(SecretError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_secret(root: &Path, key: &str, value: &str) {
        let path = root.join(key);
        fs::create_dir_all(path.parent().expect("key has a parent")).expect("create category");
        fs::write(path, value).expect("write secret");
    }

    #[test]
    fn returns_contents_without_trimming() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_secret(dir.path(), "app-secrets/django-secret-key", "  s3cr3t \n");
        let loader = FileSecretLoader::new(dir.path());

        let value = loader
            .get_secret("app-secrets/django-secret-key")
            .expect("secret should load");
        assert_eq!(value, "  s3cr3t \n");
    }

    #[test]
    fn missing_file_without_default_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = FileSecretLoader::new(dir.path());

        let err = loader
            .get_secret("database-secrets/username")
            .expect_err("should be missing");
        assert!(matches!(err, SecretError::NotFound { ref key } if key == "database-secrets/username"));
    }

    #[test]
    fn missing_file_with_default_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = FileSecretLoader::new(dir.path());

        let value = loader
            .get_secret_or("database-secrets/password", "changeme")
            .expect("default should apply");
        assert_eq!(value, "changeme");
    }

    #[test]
    fn default_is_ignored_when_file_exists() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_secret(dir.path(), "database-secrets/password", "postgrespwd");
        let loader = FileSecretLoader::new(dir.path());

        let value = loader
            .get_secret_or("database-secrets/password", "changeme")
            .expect("secret should load");
        assert_eq!(value, "postgrespwd");
    }

    #[test]
    fn directory_is_an_io_error_even_with_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("app-secrets")).expect("create category");
        let loader = FileSecretLoader::new(dir.path());

        let err = loader
            .get_secret_or("app-secrets", "fallback")
            .expect_err("directory is not a secret");
        assert!(matches!(err, SecretError::Io { .. }));
    }

    #[test]
    fn invalid_utf8_is_an_io_error_even_with_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("a")).expect("create category");
        fs::write(dir.path().join("a/b"), [0xff, 0xfe]).expect("write secret");
        let loader = FileSecretLoader::new(dir.path());

        let err = loader
            .get_secret_or("a/b", "d")
            .expect_err("non-UTF-8 contents are not a string");
        assert!(matches!(err, SecretError::Io { ref key, .. } if key == "a/b"));
    }

    #[test]
    fn absolute_key_stays_under_root() {
        let root = tempfile::tempdir().expect("tempdir");
        let outside = tempfile::tempdir().expect("tempdir");
        fs::write(outside.path().join("leak"), "outside").expect("write outside");
        let loader = FileSecretLoader::new(root.path());

        let key = format!("{}/leak", outside.path().display());
        assert!(loader.path_for(&key).starts_with(root.path()));
        assert_eq!(loader.lookup(&key).expect("lookup"), None);
    }

    #[test]
    fn mounted_loader_keeps_absolute_keys_inside_mount() {
        assert_eq!(
            FileSecretLoader::mounted().path_for("/database-secrets/username"),
            PathBuf::from("/etc/secrets/database-secrets/username")
        );
    }

    #[test]
    fn missing_root_directory_reads_as_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = FileSecretLoader::new(dir.path().join("does-not-exist"));

        assert_eq!(loader.lookup("secret-a/foo-key").expect("lookup"), None);
    }

    #[test]
    fn every_read_hits_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_secret(dir.path(), "secret-a/foo-key", "foo");
        let loader = FileSecretLoader::new(dir.path());
        assert_eq!(loader.get_secret("secret-a/foo-key").expect("first"), "foo");

        write_secret(dir.path(), "secret-a/foo-key", "rotated");
        assert_eq!(
            loader.get_secret("secret-a/foo-key").expect("second"),
            "rotated"
        );
    }

    #[test]
    fn mounted_loader_uses_fixed_prefix() {
        let loader = FileSecretLoader::mounted();
        assert_eq!(
            loader.path_for("database-secrets/username"),
            PathBuf::from("/etc/secrets/database-secrets/username")
        );
    }

    #[test]
    fn unset_env_var_is_missing_root() {
        let err = FileSecretLoader::from_env_var("APPSECRETS_TEST_ROOT_NEVER_SET")
            .expect_err("variable is unset");
        assert!(matches!(err, SecretError::MissingRoot { ref var } if var == "APPSECRETS_TEST_ROOT_NEVER_SET"));
    }

    #[test]
    fn empty_env_var_is_missing_root() {
        env::set_var("APPSECRETS_TEST_ROOT_EMPTY", "");
        let err = FileSecretLoader::from_env_var("APPSECRETS_TEST_ROOT_EMPTY")
            .expect_err("variable is empty");
        assert!(matches!(err, SecretError::MissingRoot { .. }));
    }

    #[test]
    fn from_env_reads_secrets_rootpath() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_secret(dir.path(), "secret-a/foo-key", "foo");
        env::set_var(ROOT_ENV_VAR, dir.path());

        let loader = FileSecretLoader::from_env().expect("SECRETS_ROOTPATH is set");
        assert_eq!(loader.root(), dir.path());
        assert_eq!(loader.get_secret("secret-a/foo-key").expect("secret"), "foo");
    }

    #[test]
    fn env_var_sets_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        env::set_var("APPSECRETS_TEST_ROOT_SET", dir.path());

        let loader = FileSecretLoader::from_env_var("APPSECRETS_TEST_ROOT_SET").expect("root set");
        assert_eq!(loader.root(), dir.path());
    }
}
