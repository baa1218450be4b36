//! HTTP clients for SNAP APIs.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the signing primitives and wire types do not pull in `reqwest`.

mod snap;
mod token;
mod transaction;

pub use snap::{SnapApiClient, TokenGrant};
pub use token::TokenClient;
pub use transaction::TransactionClient;

use std::collections::BTreeMap;

use reqwest::{Client, Method, StatusCode};

use crate::config::MerchantIdentity;
use crate::objects::ApiError;
use crate::signature::SignatureError;

/// Client-credentials (B2B) access-token endpoint.
pub const ACCESS_TOKEN_B2B_PATH: &str = "/openapi/v1.0/access-token/b2b";

/// Authorization-code / refresh-token (B2B2C) access-token endpoint.
pub const ACCESS_TOKEN_B2B2C_PATH: &str = "/openapi/v1.0/access-token/b2b2c";

/// QR-MPM generation endpoint.
pub const QR_MPM_GENERATE_PATH: &str = "/openapi/v1.0/qr/qr-mpm-generate";

/// Channel id sent on QR-MPM requests.
pub const CHANNEL_QRIS: &str = "QRIS";

/// The remote call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AccessTokenB2b,
    AccessTokenB2b2c,
    QrMpmGenerate,
}

impl Operation {
    /// Whether the failure is an authentication (token) failure rather than
    /// a transactional one.
    pub fn is_auth(&self) -> bool {
        matches!(self, Operation::AccessTokenB2b | Operation::AccessTokenB2b2c)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::AccessTokenB2b => write!(f, "failed to get access token B2B"),
            Operation::AccessTokenB2b2c => write!(f, "failed to get access token B2B2C"),
            Operation::QrMpmGenerate => write!(f, "failed to generate QR MPM"),
        }
    }
}

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout, …).
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("{operation}: {error}")]
    Api {
        operation: Operation,
        status: StatusCode,
        error: ApiError,
    },

    /// Key material could not be used for signing.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// A 2xx response body did not match the expected schema, or the
    /// request body could not be serialized.
    #[error("json error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Api,
    Signature,
    Parse,
    Configuration,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Api { .. } => ErrorKind::Api,
            ClientError::Signature(_) => ErrorKind::Signature,
            ClientError::Parse(_) => ErrorKind::Parse,
            ClientError::Url(_) => ErrorKind::Configuration,
        }
    }

    /// The gateway error body, for [`ClientError::Api`].
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A fully signed request, ready to send.
///
/// `body` is the exact text that was hashed and signed; it must be sent
/// unchanged.
#[derive(Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub path: &'static str,
    pub headers: BTreeMap<&'static str, String>,
    pub body: String,
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Header values include bearer tokens and signatures.
        f.debug_struct(stringify!(SignedRequest))
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    async fn send(
        self,
        http: &Client,
        identity: &MerchantIdentity,
    ) -> Result<reqwest::Response, ClientError> {
        let url = identity.endpoint(self.path)?;

        let mut request = http
            .request(self.method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in self.headers {
            request = request.header(name, value);
        }

        Ok(request.body(self.body).send().await?)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    operation: Operation,
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.bytes().await.unwrap_or_default();
        let error = ApiError::from_body(&body);
        tracing::warn!(
            ?operation,
            %status,
            response_code = %error.response_code,
            response_message = %error.response_message,
            "gateway returned an error"
        );
        return Err(ClientError::Api {
            operation,
            status,
            error,
        });
    }
    tracing::debug!(?operation, %status, "gateway response received");
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Parse)
}
