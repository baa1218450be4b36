//! Subcommand implementations.
//!
//! Results go to stdout; diagnostics go through `tracing` to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use snap_sdk::client::{SnapApiClient, TokenGrant};
use snap_sdk::signature::RsaSigningKey;
use snap_sdk::timestamp::SystemTimeSource;
use time::UtcOffset;

use crate::config::ConfigLoader;
use crate::config::file::SnapProfile;

/// HTTP and clock settings shared by the network commands.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    /// Offset for signing timestamps; `None` lets the SDK detect it per
    /// call, which falls back to UTC inside the runtime.
    pub utc_offset: Option<UtcOffset>,
}

pub struct NewProfile {
    pub id: String,
    pub name: String,
    pub merchant_id: String,
    pub secret_key: String,
    pub private_key_file: PathBuf,
    pub base_url: String,
}

pub fn list(loader: &ConfigLoader) -> anyhow::Result<()> {
    let config = loader.load()?;
    if config.snap.is_empty() {
        println!("no profiles in {}", loader.path().display());
        return Ok(());
    }
    for profile in &config.snap {
        println!(
            "{}\t{}\t{}\t{}",
            profile.id, profile.name, profile.merchant_id, profile.base_url
        );
    }
    Ok(())
}

pub fn add(loader: &ConfigLoader, new: NewProfile) -> anyhow::Result<()> {
    let private_key = std::fs::read_to_string(&new.private_key_file).with_context(|| {
        format!(
            "failed to read private key {}",
            new.private_key_file.display()
        )
    })?;
    RsaSigningKey::from_pem(&private_key).context("private key cannot be used for signing")?;

    loader.add_profile(SnapProfile {
        id: new.id.clone(),
        name: new.name,
        merchant_id: new.merchant_id,
        secret_key: new.secret_key,
        private_key,
        base_url: new.base_url,
    })?;
    println!("added profile {}", new.id);
    Ok(())
}

pub async fn token(
    loader: &ConfigLoader,
    settings: &ClientSettings,
    profile: &str,
    auth_code: Option<String>,
    refresh_token: Option<String>,
) -> anyhow::Result<()> {
    let client = build_client(loader, settings, profile)?;
    let grant = match (auth_code, refresh_token) {
        (Some(code), _) => TokenGrant::AuthorizationCode(code),
        (None, Some(token)) => TokenGrant::RefreshToken(token),
        (None, None) => TokenGrant::ClientCredentials,
    };

    let token = client.get_access_token(grant).await?;
    println!("access_token: {}", token.access_token);
    println!("token_type:   {}", token.token_type);
    println!("expires_in:   {}", token.expires_in);
    if let Some(refresh_token) = &token.refresh_token {
        println!("refresh_token: {refresh_token}");
    }
    Ok(())
}

pub async fn qr(
    loader: &ConfigLoader,
    settings: &ClientSettings,
    profile: &str,
    reference_no: &str,
    callback_url: &str,
    amount: Option<Decimal>,
    access_token: Option<String>,
) -> anyhow::Result<()> {
    let client = build_client(loader, settings, profile)?;

    let access_token = match access_token {
        Some(token) => token,
        None => {
            tracing::info!("requesting B2B access token");
            client
                .get_access_token(TokenGrant::ClientCredentials)
                .await?
                .access_token
        }
    };

    let qr_content = client
        .generate_qr(&access_token, reference_no, callback_url, amount)
        .await?;
    println!("{qr_content}");
    Ok(())
}

fn build_client(
    loader: &ConfigLoader,
    settings: &ClientSettings,
    profile: &str,
) -> anyhow::Result<SnapApiClient> {
    let identity = loader.identity(profile)?;
    tracing::debug!(?identity, "using profile {profile}");

    let http = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .context("failed to build HTTP client")?;

    let time_source = match settings.utc_offset {
        Some(offset) => SystemTimeSource::with_offset(offset),
        None => SystemTimeSource::new(),
    };

    Ok(SnapApiClient::with_http_client(identity, http).with_time_source(Arc::new(time_source)))
}
