//! Access-token request and response types.

use serde::{Deserialize, Deserializer, Serialize};

/// OAuth-style grant type sent in `grantType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    /// B2B flow.
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    /// B2B2C flow, first exchange of an authorization code.
    #[serde(rename = "AUTHORIZATION_CODE")]
    AuthorizationCode,
    /// B2B2C flow, rotation of a refresh token.
    #[serde(rename = "REFRESH_TOKEN")]
    RefreshToken,
}

/// Body of both access-token endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRequest {
    pub grant_type: GrantType,
    pub additional_info: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AccessTokenRequest {
    /// `{"grantType":"client_credentials","additionalInfo":{}}`
    pub fn client_credentials() -> Self {
        Self {
            grant_type: GrantType::ClientCredentials,
            additional_info: serde_json::Map::new(),
            auth_code: None,
            refresh_token: None,
        }
    }

    /// B2B2C body: an authorization code when `is_auth_code`, otherwise a
    /// refresh token.
    pub fn b2b2c(auth_check_data: impl Into<String>, is_auth_code: bool) -> Self {
        let data = auth_check_data.into();
        if is_auth_code {
            Self {
                grant_type: GrantType::AuthorizationCode,
                additional_info: serde_json::Map::new(),
                auth_code: Some(data),
                refresh_token: None,
            }
        } else {
            Self {
                grant_type: GrantType::RefreshToken,
                additional_info: serde_json::Map::new(),
                auth_code: None,
                refresh_token: Some(data),
            }
        }
    }
}

/// Successful access-token response.
///
/// The B2B endpoint omits `refreshToken`; the B2B2C endpoint returns a
/// rotated one that the caller must keep for the next exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds. Some gateways send it as a string.
    #[serde(default, deserialize_with = "number_or_string")]
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
