mod cli;
mod config;
mod loader;

use std::io::{self, Write};

use appsecrets_core::{
    app::{AppSecrets, REQUIRED_KEYS},
    source::SecretSource,
};
use clap::Parser;
use color_eyre::Result;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::ConfigCommand;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    match &cli.command {
        cli::Command::Get { key, default } => {
            let loader = loader::loader_from_cli(&cli)?;
            let value = read_secret(&loader, key, default.as_deref())?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(value.as_bytes())?;
            stdout.flush()?;
        }
        cli::Command::Check { json } => {
            let loader = loader::loader_from_cli(&cli)?;
            run_check(&loader, *json)?
        }
        cli::Command::Version => print_version(),
        cli::Command::Config(ConfigCommand::Init) => init_config(&config::load()?)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters; logs go to stderr so stdout stays clean for values.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("appsecrets {}", env!("CARGO_PKG_VERSION"));
}

fn read_secret<S: SecretSource>(source: &S, key: &str, default: Option<&str>) -> Result<String> {
    let value = match default {
        Some(default) => source.get_or(key, default)?,
        None => source.get(key)?,
    };
    Ok(value)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct CheckReport {
    ok: bool,
    secrets: Vec<KeyStatus>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct KeyStatus {
    key: &'static str,
    present: bool,
}

/// Probe every required key without exposing values.
fn check_required<S: SecretSource>(source: &S) -> Result<CheckReport> {
    let mut secrets = Vec::with_capacity(REQUIRED_KEYS.len());
    for key in REQUIRED_KEYS {
        let present = source.lookup(key)?.is_some();
        secrets.push(KeyStatus { key, present });
    }
    let ok = secrets.iter().all(|status| status.present);
    Ok(CheckReport { ok, secrets })
}

fn run_check<S: SecretSource>(source: &S, json: bool) -> Result<()> {
    let report = check_required(source)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for status in &report.secrets {
            let mark = if status.present { "ok" } else { "missing" };
            println!("{}: {mark}", status.key);
        }
    }

    if !report.ok {
        color_eyre::eyre::bail!("required secrets are missing");
    }
    // Same path the application takes at startup.
    let secrets = AppSecrets::load(source)?;
    info!(?secrets, "required secrets loaded");
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
