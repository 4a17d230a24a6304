use std::path::PathBuf;

use appsecrets_core::source::{SecretError, ROOT_ENV_VAR};
use appsecrets_fs::file_loader::FileSecretLoader;
use color_eyre::Result;
use tracing::debug;

use crate::{
    cli::Cli,
    config::{self, Config},
};

/// Build a loader from CLI flags, the environment and config, in that order.
/// The config file is only read when no flag names the root.
pub fn loader_from_cli(cli: &Cli) -> Result<FileSecretLoader> {
    if let Some(loader) = from_flags(cli.root.clone(), cli.mounted) {
        return Ok(loader);
    }
    let config = config::load()?;
    let var = root_env_var(&config);
    let env_root = std::env::var_os(var).map(PathBuf::from);
    Ok(resolve(None, false, env_root, var, &config)?)
}

fn from_flags(flag_root: Option<PathBuf>, mounted: bool) -> Option<FileSecretLoader> {
    if let Some(root) = flag_root {
        debug!(?root, "secrets root from --root");
        return Some(FileSecretLoader::new(root));
    }
    if mounted {
        debug!("secrets root from --mounted");
        return Some(FileSecretLoader::mounted());
    }
    None
}

fn root_env_var(config: &Config) -> &str {
    config.root_env.as_deref().unwrap_or(ROOT_ENV_VAR)
}

fn resolve(
    flag_root: Option<PathBuf>,
    mounted: bool,
    env_root: Option<PathBuf>,
    var: &str,
    config: &Config,
) -> Result<FileSecretLoader, SecretError> {
    if let Some(loader) = from_flags(flag_root, mounted) {
        return Ok(loader);
    }
    if let Some(root) = env_root.filter(|root| !root.as_os_str().is_empty()) {
        debug!(?root, var, "secrets root from environment");
        return Ok(FileSecretLoader::new(root));
    }
    if let Some(root) = &config.secrets_root {
        debug!(?root, "secrets root from config");
        return Ok(FileSecretLoader::new(root.clone()));
    }
    Err(SecretError::MissingRoot {
        var: var.to_string(),
    })
}
