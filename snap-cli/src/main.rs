//! SNAP merchant command line client.
//!
//! Fetches access tokens and generates QR-MPM codes for merchant profiles
//! stored in a local profile file.

mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::ConfigLoader;
use snap_sdk::timestamp::parse_utc_offset;
use std::path::PathBuf;
use std::time::Duration;
use time::UtcOffset;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// SNAP payment gateway client
#[derive(Parser, Debug)]
#[command(name = "snap-cli")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the profile file (JSON, or TOML when it ends in `.toml`)
    #[arg(short, long, env = "SNAP_CONFIG", default_value = "./snap-config.json")]
    config: PathBuf,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// UTC offset for signing timestamps (e.g. +07:00); detected when omitted
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured merchant profiles
    List,

    /// Add a merchant profile to the profile file
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        merchant_id: String,
        #[arg(long, env = "SNAP_SECRET_KEY")]
        secret_key: String,
        /// File containing the PEM-encoded RSA private key
        #[arg(long)]
        private_key_file: PathBuf,
        #[arg(long)]
        base_url: String,
    },

    /// Request an access token (B2B by default, B2B2C with a code or refresh token)
    Token {
        #[arg(short, long)]
        profile: String,
        #[arg(long, conflicts_with = "refresh_token")]
        auth_code: Option<String>,
        #[arg(long)]
        refresh_token: Option<String>,
    },

    /// Generate a QR-MPM code
    Qr {
        #[arg(short, long)]
        profile: String,
        #[arg(long)]
        reference_no: String,
        #[arg(long)]
        callback_url: String,
        /// Fixed amount in IDR; open amount when omitted
        #[arg(long)]
        amount: Option<rust_decimal::Decimal>,
        /// Reuse an existing access token instead of requesting a B2B token
        #[arg(long)]
        access_token: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    // The local offset can only be read soundly while the process is still
    // single-threaded, so resolve it before the runtime starts.
    let utc_offset = match args.utc_offset.as_deref() {
        Some(offset) => Some(
            parse_utc_offset(offset).with_context(|| format!("invalid UTC offset {offset:?}"))?,
        ),
        None => UtcOffset::current_local_offset()
            .inspect_err(|_| tracing::warn!("local UTC offset unavailable, signing in UTC"))
            .ok(),
    };

    let settings = commands::ClientSettings {
        timeout: Duration::from_secs(args.timeout_secs),
        utc_offset,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?
        .block_on(run(args, settings))
}

async fn run(args: Args, settings: commands::ClientSettings) -> anyhow::Result<()> {
    let loader = ConfigLoader::new(&args.config);

    let result = match args.command {
        Command::List => commands::list(&loader),
        Command::Add {
            id,
            name,
            merchant_id,
            secret_key,
            private_key_file,
            base_url,
        } => commands::add(
            &loader,
            commands::NewProfile {
                id,
                name,
                merchant_id,
                secret_key,
                private_key_file,
                base_url,
            },
        ),
        Command::Token {
            profile,
            auth_code,
            refresh_token,
        } => commands::token(&loader, &settings, &profile, auth_code, refresh_token).await,
        Command::Qr {
            profile,
            reference_no,
            callback_url,
            amount,
            access_token,
        } => {
            commands::qr(
                &loader,
                &settings,
                &profile,
                &reference_no,
                &callback_url,
                amount,
                access_token,
            )
            .await
        }
    };

    result.inspect_err(|e| tracing::error!("{e:#}"))
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
