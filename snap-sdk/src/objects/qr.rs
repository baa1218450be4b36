//! QR-MPM (merchant presented mode) generation types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// Terminal id sent with every generation request.
pub const TERMINAL_ID: &str = "Info Terminal";

/// Label sent in `additionalInfo.additionalLabel`.
pub const ADDITIONAL_LABEL: &str = "Additional Label";

/// Currency of fixed-amount QR codes.
pub const CURRENCY_IDR: &str = "IDR";

/// `urlParam.type` of the payment notification callback.
pub const PAY_NOTIFY: &str = "PAY_NOTIFY";

/// Days a fixed-amount QR code stays valid.
pub const VALIDITY_DAYS: i64 = 2;

/// Body of `POST /openapi/v1.0/qr/qr-mpm-generate`.
///
/// Field order is part of the signature (see [`crate::payload`]). `amount`
/// and `validity_period` are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrMpmGenerateRequest {
    pub partner_reference_no: String,
    pub terminal_id: String,
    pub additional_info: QrMpmAdditionalInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<QrMpmAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrMpmAdditionalInfo {
    pub additional_label: String,
    pub request_qr_url: String,
    pub request_qr_image: String,
    pub url_param: Vec<QrMpmUrlParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrMpmUrlParam {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_deeplink: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrMpmAmount {
    pub currency: String,
    /// Decimal string with exactly two fraction digits.
    pub value: String,
}

impl QrMpmGenerateRequest {
    /// Build a generation request.
    ///
    /// A positive `amount` yields a fixed-amount IDR code valid for
    /// [`VALIDITY_DAYS`] after `timestamp`. `None`, zero or negative amounts
    /// yield an open-amount code without `amount` or `validityPeriod`.
    pub fn new(
        reference_no: impl Into<String>,
        callback_url: impl Into<String>,
        amount: Option<Decimal>,
        timestamp: &Timestamp,
    ) -> Self {
        let mut request = Self {
            partner_reference_no: reference_no.into(),
            terminal_id: TERMINAL_ID.to_owned(),
            additional_info: QrMpmAdditionalInfo {
                additional_label: ADDITIONAL_LABEL.to_owned(),
                request_qr_url: "N".to_owned(),
                request_qr_image: "N".to_owned(),
                url_param: vec![QrMpmUrlParam {
                    url: callback_url.into(),
                    kind: PAY_NOTIFY.to_owned(),
                    is_deeplink: "N".to_owned(),
                }],
            },
            amount: None,
            validity_period: None,
        };

        if let Some(amount) = amount.filter(|a| *a > Decimal::ZERO) {
            request.amount = Some(QrMpmAmount {
                currency: CURRENCY_IDR.to_owned(),
                value: format_amount(amount),
            });
            request.validity_period = Some(timestamp.plus_days(VALIDITY_DAYS).to_string());
        }

        request
    }
}

/// Render `amount` with exactly two fraction digits, rounding half away
/// from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    value.to_string()
}

/// Successful QR-MPM generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrMpmGenerateResponse {
    #[serde(default)]
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub partner_reference_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_no: Option<String>,
    pub qr_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ts() -> Timestamp {
        Timestamp::parse("2024-06-01T08:30:00+07:00").unwrap()
    }

    #[test]
    fn test_open_amount_omits_amount_and_validity() {
        let request = QrMpmGenerateRequest::new("REF-1", "https://cb.example/notify", None, &ts());
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"partnerReferenceNo":"REF-1","terminalId":"Info Terminal","#,
                r#""additionalInfo":{"additionalLabel":"Additional Label","requestQrUrl":"N","#,
                r#""requestQrImage":"N","urlParam":[{"url":"https://cb.example/notify","#,
                r#""type":"PAY_NOTIFY","isDeeplink":"N"}]}}"#
            )
        );
    }

    #[test]
    fn test_fixed_amount_sets_value_and_validity() {
        let request = QrMpmGenerateRequest::new(
            "REF-2",
            "https://cb.example/notify",
            Some(Decimal::from(15000)),
            &ts(),
        );
        let amount = request.amount.as_ref().unwrap();
        assert_eq!(amount.currency, "IDR");
        assert_eq!(amount.value, "15000.00");
        assert_eq!(
            request.validity_period.as_deref(),
            Some("2024-06-03T08:30:00+07:00")
        );

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.ends_with(
            r#""amount":{"currency":"IDR","value":"15000.00"},"validityPeriod":"2024-06-03T08:30:00+07:00"}"#
        ));
    }

    #[test]
    fn test_non_positive_amount_is_open_amount() {
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let request = QrMpmGenerateRequest::new("REF", "cb", Some(amount), &ts());
            assert!(request.amount.is_none());
            assert!(request.validity_period.is_none());
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from(15000)), "15000.00");
        assert_eq!(format_amount(Decimal::from_str("1.5").unwrap()), "1.50");
        assert_eq!(format_amount(Decimal::from_str("10.005").unwrap()), "10.01");
        assert_eq!(format_amount(Decimal::from_str("99.994").unwrap()), "99.99");
    }

    #[test]
    fn test_response_requires_qr_content() {
        let response: QrMpmGenerateResponse = serde_json::from_str(
            r#"{"responseCode":"2004700","responseMessage":"Successful","partnerReferenceNo":"REF-1","qrContent":"00020101021226"}"#,
        )
        .unwrap();
        assert_eq!(response.qr_content, "00020101021226");
        assert!(serde_json::from_str::<QrMpmGenerateResponse>(r#"{"responseCode":"2004700"}"#).is_err());
    }
}
