//! Homeschool Hub preflight
//!
//! Runs the startup checks a deployment must pass before the web
//! application is allowed to serve traffic.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use bytes::Bytes;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hub_core::{AppContext, StartupError, StorageBackend, StorageKey, bootstrap};
use hub_shared::ConfigSource;

/// Validate configuration and media storage before startup.
#[derive(Debug, Parser)]
#[command(name = "hub-preflight", version, about)]
struct Args {
    /// Write, read back and delete a probe object in media storage.
    #[arg(long)]
    probe: bool,

    /// Directory holding `default.toml` and `<RUN_MODE>.toml`.
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hub=info".into()),
        )
        .with(args.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(StartupError::Config(violations)) = err.downcast_ref::<StartupError>() {
                for violation in violations.violations() {
                    error!(key = violation.key(), "{violation}");
                }
            }
            eprintln!("preflight failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let mut source = ConfigSource::from_env();
    if let Some(dir) = &args.config_dir {
        source = source.with_config_dir(dir);
    }
    info!(
        config_dir = %source.config_dir().display(),
        run_mode = source.run_mode(),
        "loading configuration"
    );

    let raw = source.load()?;
    let context = bootstrap(&raw)?;

    let config = context.config();
    println!("configuration ok");
    println!("  debug:          {}", config.debug());
    println!(
        "  allowed hosts:  {}",
        config.allowed_hosts().iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("  media storage:  {}", context.storage().provider_name());
    if let Some(remote) = config.remote_storage() {
        println!("  bucket:         {}", remote.bucket_name());
        println!("  endpoint:       {}", remote.endpoint_url());
    } else {
        println!("  media root:     {}", config.media_root().display());
    }

    if args.probe {
        probe(&context).await?;
        println!("storage probe ok");
    }

    Ok(())
}

/// Round-trips a small object through the configured backend.
async fn probe(context: &AppContext) -> anyhow::Result<()> {
    let storage = context.storage();
    let key = StorageKey::new(format!(".preflight/{}.txt", uuid::Uuid::new_v4()))?;
    let body = Bytes::from_static(b"hub-preflight");

    storage
        .put(&key, body.clone(), "text/plain")
        .await
        .with_context(|| format!("writing probe object '{key}'"))?;

    let fetched = storage
        .get(&key)
        .await
        .with_context(|| format!("reading probe object '{key}'"))?;

    let deleted = storage
        .delete(&key)
        .await
        .with_context(|| format!("deleting probe object '{key}'"));

    if fetched != body {
        bail!("probe object '{key}' came back with different content");
    }
    deleted?;

    info!(
        storage = storage.provider_name(),
        url = %storage.public_url(&key),
        "storage probe succeeded"
    );
    Ok(())
}
