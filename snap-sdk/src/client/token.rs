//! Access-token client.
//!
//! Both grant flows sign `"{merchant_id}|{timestamp}"` with the merchant's
//! RSA private key and send it alongside the merchant id and timestamp.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Client, Method};

use super::{
    ACCESS_TOKEN_B2B_PATH, ACCESS_TOKEN_B2B2C_PATH, ClientError, Operation, SignedRequest,
    parse_response,
};
use crate::config::MerchantIdentity;
use crate::objects::token::{AccessToken, AccessTokenRequest};
use crate::signature::{CLIENT_KEY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER, sign_asymmetric};
use crate::timestamp::{SystemTimeSource, TimeSource};

/// Typed HTTP client for the access-token endpoints.
///
/// Every call requests a fresh token; caching is up to the caller.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: Client,
    time_source: Arc<dyn TimeSource>,
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            time_source: Arc::new(SystemTimeSource::new()),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Replace the clock used for `X-TIMESTAMP`.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// `POST /openapi/v1.0/access-token/b2b`: client-credentials grant.
    #[tracing::instrument(skip_all, err, name = "SNAP:AccessTokenB2B", fields(merchant_id = %identity.merchant_id))]
    pub async fn fetch_b2b_token(
        &self,
        identity: &MerchantIdentity,
    ) -> Result<AccessToken, ClientError> {
        let request = self.sign(
            identity,
            ACCESS_TOKEN_B2B_PATH,
            &AccessTokenRequest::client_credentials(),
        )?;
        let resp = request.send(&self.http, identity).await?;
        parse_response(Operation::AccessTokenB2b, resp).await
    }

    /// `POST /openapi/v1.0/access-token/b2b2c`: exchange an authorization
    /// code (`is_auth_code`) or rotate a refresh token.
    ///
    /// The returned token carries the new refresh token; the caller must
    /// keep it for the next exchange.
    #[tracing::instrument(skip_all, err, name = "SNAP:AccessTokenB2B2C", fields(merchant_id = %identity.merchant_id, is_auth_code = is_auth_code))]
    pub async fn fetch_b2b2c_token(
        &self,
        identity: &MerchantIdentity,
        auth_check_data: &str,
        is_auth_code: bool,
    ) -> Result<AccessToken, ClientError> {
        let request = self.sign(
            identity,
            ACCESS_TOKEN_B2B2C_PATH,
            &AccessTokenRequest::b2b2c(auth_check_data, is_auth_code),
        )?;
        let resp = request.send(&self.http, identity).await?;
        parse_response(Operation::AccessTokenB2b2c, resp).await
    }

    /// Build the signed request for an access-token endpoint without
    /// sending it.
    pub fn sign(
        &self,
        identity: &MerchantIdentity,
        path: &'static str,
        body: &AccessTokenRequest,
    ) -> Result<SignedRequest, ClientError> {
        let timestamp = self.time_source.now().to_string();
        let signature = sign_asymmetric(
            &identity.merchant_id,
            &timestamp,
            &identity.private_key_pem,
        )?;

        let mut headers = BTreeMap::new();
        headers.insert(CLIENT_KEY_HEADER, identity.merchant_id.clone());
        headers.insert(TIMESTAMP_HEADER, timestamp);
        headers.insert(SIGNATURE_HEADER, signature);

        Ok(SignedRequest {
            method: Method::POST,
            path,
            headers,
            body: serde_json::to_string(body)?,
        })
    }
}
