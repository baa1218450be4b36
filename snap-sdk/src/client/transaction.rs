//! Transaction client (QR-MPM generation).
//!
//! Requests are authenticated with a bearer token plus an HMAC-SHA512
//! signature over
//! `"POST:{path}:{access_token}:{sha256(body)}:{timestamp}"`.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Client, Method};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    CHANNEL_QRIS, ClientError, Operation, QR_MPM_GENERATE_PATH, SignedRequest, parse_response,
};
use crate::config::MerchantIdentity;
use crate::objects::qr::{QrMpmGenerateRequest, QrMpmGenerateResponse};
use crate::payload::CanonicalPayload;
use crate::signature::{
    CHANNEL_ID_HEADER, EXTERNAL_ID_HEADER, PARTNER_ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
    sign_symmetric, symmetric_string_to_sign,
};
use crate::timestamp::{SystemTimeSource, TimeSource};

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Typed HTTP client for symmetric-signed transactional endpoints.
///
/// Each call mints a fresh `X-EXTERNAL-ID`, so calls are not idempotent.
#[derive(Debug, Clone)]
pub struct TransactionClient {
    http: Client,
    time_source: Arc<dyn TimeSource>,
}

impl Default for TransactionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            time_source: Arc::new(SystemTimeSource::new()),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Replace the clock used for `X-TIMESTAMP` and `validityPeriod`.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// `POST /openapi/v1.0/qr/qr-mpm-generate`: generate a QR-MPM code.
    ///
    /// A positive `amount` produces a fixed-amount IDR code valid for two
    /// days; otherwise the code is open-amount.
    #[tracing::instrument(skip_all, err, name = "SNAP:QrMpmGenerate", fields(merchant_id = %identity.merchant_id, reference_no = %reference_no))]
    pub async fn generate_qr(
        &self,
        identity: &MerchantIdentity,
        access_token: &str,
        reference_no: &str,
        callback_url: &str,
        amount: Option<Decimal>,
    ) -> Result<QrMpmGenerateResponse, ClientError> {
        let request =
            self.sign_qr_request(identity, access_token, reference_no, callback_url, amount)?;
        if let Some(external_id) = request.header(EXTERNAL_ID_HEADER) {
            tracing::debug!(external_id, "submitting QR MPM request");
        }
        let resp = request.send(&self.http, identity).await?;
        parse_response(Operation::QrMpmGenerate, resp).await
    }

    /// Build the signed QR-MPM request without sending it.
    pub fn sign_qr_request(
        &self,
        identity: &MerchantIdentity,
        access_token: &str,
        reference_no: &str,
        callback_url: &str,
        amount: Option<Decimal>,
    ) -> Result<SignedRequest, ClientError> {
        let timestamp = self.time_source.now();
        let body = QrMpmGenerateRequest::new(reference_no, callback_url, amount, &timestamp);
        let timestamp = timestamp.to_string();

        let payload = CanonicalPayload::new(&body)?;
        let string_to_sign = symmetric_string_to_sign(
            Method::POST.as_str(),
            QR_MPM_GENERATE_PATH,
            access_token,
            &payload.hash,
            &timestamp,
        );
        let signature = sign_symmetric(&string_to_sign, &identity.secret_key);

        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION_HEADER, format!("Bearer {access_token}"));
        headers.insert(PARTNER_ID_HEADER, identity.merchant_id.clone());
        headers.insert(TIMESTAMP_HEADER, timestamp);
        headers.insert(SIGNATURE_HEADER, signature);
        headers.insert(EXTERNAL_ID_HEADER, Uuid::new_v4().to_string());
        headers.insert(CHANNEL_ID_HEADER, CHANNEL_QRIS.to_owned());

        Ok(SignedRequest {
            method: Method::POST,
            path: QR_MPM_GENERATE_PATH,
            headers,
            body: payload.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::verify_symmetric;
    use crate::timestamp::{FixedTimeSource, Timestamp};
    use url::Url;

    fn client() -> TransactionClient {
        let ts = Timestamp::parse("2024-06-01T08:30:00+07:00").unwrap();
        TransactionClient::new().with_time_source(Arc::new(FixedTimeSource(ts)))
    }

    fn identity() -> MerchantIdentity {
        MerchantIdentity::new(
            "M001",
            Url::parse("https://gateway.example").unwrap(),
            "",
            "hmac-secret",
        )
    }

    #[test]
    fn test_signed_qr_request_headers() {
        let request = client()
            .sign_qr_request(&identity(), "tok-1", "REF-1", "https://cb.example", None)
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, QR_MPM_GENERATE_PATH);
        assert_eq!(request.header(AUTHORIZATION_HEADER), Some("Bearer tok-1"));
        assert_eq!(request.header(PARTNER_ID_HEADER), Some("M001"));
        assert_eq!(request.header(TIMESTAMP_HEADER), Some("2024-06-01T08:30:00+07:00"));
        assert_eq!(request.header(CHANNEL_ID_HEADER), Some("QRIS"));
        assert!(Uuid::parse_str(request.header(EXTERNAL_ID_HEADER).unwrap()).is_ok());
    }

    #[test]
    fn test_signature_binds_body_and_token() {
        let request = client()
            .sign_qr_request(
                &identity(),
                "tok-1",
                "REF-1",
                "https://cb.example",
                Some(Decimal::from(15000)),
            )
            .unwrap();

        let string_to_sign = format!(
            "POST:/openapi/v1.0/qr/qr-mpm-generate:tok-1:{}:2024-06-01T08:30:00+07:00",
            crate::payload::hash(&request.body)
        );
        let signature = request.header(SIGNATURE_HEADER).unwrap();
        assert!(verify_symmetric(&string_to_sign, "hmac-secret", signature));
        assert!(!verify_symmetric(
            &string_to_sign.replace("tok-1", "tok-2"),
            "hmac-secret",
            signature
        ));
    }

    #[test]
    fn test_external_id_is_fresh_per_request() {
        let client = client();
        let first = client
            .sign_qr_request(&identity(), "tok", "REF", "cb", None)
            .unwrap();
        let second = client
            .sign_qr_request(&identity(), "tok", "REF", "cb", None)
            .unwrap();
        assert_eq!(first.body, second.body);
        assert_ne!(
            first.header(EXTERNAL_ID_HEADER),
            second.header(EXTERNAL_ID_HEADER)
        );
    }

    #[test]
    fn test_debug_hides_header_values() {
        let request = client()
            .sign_qr_request(&identity(), "secret-token", "REF", "cb", None)
            .unwrap();
        assert!(!format!("{request:?}").contains("secret-token"));
    }
}
