//! Composition root binding one merchant identity to the SNAP clients.

use std::sync::Arc;

use reqwest::Client;
use rust_decimal::Decimal;

use super::{ClientError, TokenClient, TransactionClient};
use crate::config::MerchantIdentity;
use crate::objects::token::AccessToken;
use crate::timestamp::TimeSource;

/// How to obtain an access token.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// B2B client-credentials grant.
    ClientCredentials,
    /// B2B2C: exchange an authorization code.
    AuthorizationCode(String),
    /// B2B2C: rotate a refresh token.
    RefreshToken(String),
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenGrant::ClientCredentials => write!(f, "ClientCredentials"),
            TokenGrant::AuthorizationCode(_) => write!(f, "AuthorizationCode(<redacted>)"),
            TokenGrant::RefreshToken(_) => write!(f, "RefreshToken(<redacted>)"),
        }
    }
}

/// SNAP API client for a single merchant.
///
/// Holds no session state: every [`get_access_token`](Self::get_access_token)
/// requests a new token and every [`generate_qr`](Self::generate_qr) is
/// signed at call time. Cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct SnapApiClient {
    identity: MerchantIdentity,
    tokens: TokenClient,
    transactions: TransactionClient,
}

impl SnapApiClient {
    pub fn new(identity: MerchantIdentity) -> Self {
        Self::with_http_client(identity, Client::new())
    }

    /// Create a client sharing one connection pool for all endpoints.
    pub fn with_http_client(identity: MerchantIdentity, http: Client) -> Self {
        Self {
            identity,
            tokens: TokenClient::new().with_http_client(http.clone()),
            transactions: TransactionClient::new().with_http_client(http),
        }
    }

    /// Replace the clock used for signing timestamps.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.tokens = self.tokens.with_time_source(Arc::clone(&time_source));
        self.transactions = self.transactions.with_time_source(time_source);
        self
    }

    pub fn identity(&self) -> &MerchantIdentity {
        &self.identity
    }

    /// Request an access token with the given grant.
    pub async fn get_access_token(&self, grant: TokenGrant) -> Result<AccessToken, ClientError> {
        match grant {
            TokenGrant::ClientCredentials => self.tokens.fetch_b2b_token(&self.identity).await,
            TokenGrant::AuthorizationCode(code) => {
                self.tokens
                    .fetch_b2b2c_token(&self.identity, &code, true)
                    .await
            }
            TokenGrant::RefreshToken(token) => {
                self.tokens
                    .fetch_b2b2c_token(&self.identity, &token, false)
                    .await
            }
        }
    }

    /// Generate a QR-MPM code and return its QR content string.
    pub async fn generate_qr(
        &self,
        access_token: &str,
        reference_no: &str,
        callback_url: &str,
        amount: Option<Decimal>,
    ) -> Result<String, ClientError> {
        let response = self
            .transactions
            .generate_qr(
                &self.identity,
                access_token,
                reference_no,
                callback_url,
                amount,
            )
            .await?;
        Ok(response.qr_content)
    }
}
