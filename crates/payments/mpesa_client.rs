use anyhow::Result;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Minimal Safaricom Daraja client built on reqwest.
pub struct MpesaClient {
    http: reqwest::Client,
    consumer_key: String,
    consumer_secret: String,
    shortcode: String,
    passkey: String,
    api_base: String,
    callback_url: String,
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage")]
    pub customer_message: Option<String>,
}

/// Asynchronous callback Daraja POSTs after the payer acts on the PIN
/// prompt. Field names follow the provider's wire format.
#[derive(Debug, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item")]
    pub item: Vec<CallbackMetadataItem>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<serde_json::Value>,
}

/// Acknowledgement returned to Daraja for every callback delivery.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: &'static str,
}

impl CallbackAck {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted",
        }
    }
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    fn metadata_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.callback_metadata
            .as_ref()?
            .item
            .iter()
            .find(|item| item.name == name)?
            .value
            .as_ref()
    }

    fn metadata_string(&self, name: &str) -> Option<String> {
        match self.metadata_value(name)? {
            serde_json::Value::String(value) => Some(value.clone()),
            serde_json::Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn receipt_number(&self) -> Option<String> {
        self.metadata_string("MpesaReceiptNumber")
    }

    pub fn phone_number(&self) -> Option<String> {
        self.metadata_string("PhoneNumber")
    }

    pub fn amount(&self) -> Option<f64> {
        self.metadata_value("Amount")?.as_f64()
    }

    /// Daraja delivers `TransactionDate` as a numeric `yyyymmddhhmmss`
    /// in East Africa Time.
    pub fn transaction_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.metadata_string("TransactionDate")?;
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S").ok()?;
        let eat = east_africa_offset();
        naive
            .and_local_timezone(eat)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn east_africa_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("UTC+3 is a valid fixed offset")
}

/// Compact EAT timestamp the gateway expects in the request password.
pub fn daraja_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&east_africa_offset())
        .format("%Y%m%d%H%M%S")
        .to_string()
}

/// Lipa na M-Pesa online password: base64(shortcode + passkey + timestamp).
pub fn lipa_na_mpesa_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}

impl MpesaClient {
    pub fn new(
        consumer_key: String,
        consumer_secret: String,
        shortcode: String,
        passkey: String,
        api_base: String,
        callback_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            consumer_key,
            consumer_secret,
            shortcode,
            passkey,
            api_base,
            callback_url,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "daraja api request failed"
        );

        anyhow::bail!("M-Pesa API request failed: {} (status {})", context, status);
    }

    /// OAuth client-credentials token fetch.
    /// https://developer.safaricom.co.ke/APIs/Authorization
    async fn fetch_access_token(&self) -> Result<String> {
        let resp = self
            .http
            .get(format!(
                "{}/oauth/v1/generate?grant_type=client_credentials",
                self.api_base.trim_end_matches('/')
            ))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "fetch access token").await?;

        let parsed: OAuthTokenResponse = resp.json().await?;
        Ok(parsed.access_token)
    }

    /// Submits an STK push. `phone_number` must already be in the
    /// `254[17]XXXXXXXX` form.
    /// https://developer.safaricom.co.ke/APIs/MpesaExpressSimulate
    pub async fn stk_push(
        &self,
        phone_number: &str,
        amount: i64,
        account_reference: &str,
        description: &str,
    ) -> Result<StkPushResponse> {
        let access_token = self.fetch_access_token().await?;

        let timestamp = daraja_timestamp(Utc::now());
        let password = lipa_na_mpesa_password(&self.shortcode, &self.passkey, &timestamp);

        let body = serde_json::json!({
            "BusinessShortCode": self.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": amount,
            "PartyA": phone_number,
            "PartyB": self.shortcode,
            "PhoneNumber": phone_number,
            "CallBackURL": self.callback_url,
            "AccountReference": account_reference,
            "TransactionDesc": description,
        });

        let resp = self
            .http
            .post(format!(
                "{}/mpesa/stkpush/v1/processrequest",
                self.api_base.trim_end_matches('/')
            ))
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "stk push").await?;

        let parsed: StkPushResponse = resp.json().await?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn password_is_base64_of_shortcode_passkey_timestamp() {
        let password = lipa_na_mpesa_password("174379", "passkey123", "20260101120000");
        let decoded = general_purpose::STANDARD.decode(password).unwrap();
        assert_eq!(decoded, b"174379passkey12320260101120000");
    }

    #[test]
    fn timestamp_is_compact_east_africa_time() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 9, 30, 0).unwrap();
        assert_eq!(daraja_timestamp(now), "20260101123000");
    }

    #[test]
    fn parses_successful_callback_metadata() {
        let payload = r#"{
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            { "Name": "Amount", "Value": 500.0 },
                            { "Name": "MpesaReceiptNumber", "Value": "ABC123" },
                            { "Name": "TransactionDate", "Value": 20260101123000 },
                            { "Name": "PhoneNumber", "Value": 254712345678 }
                        ]
                    }
                }
            }
        }"#;

        let envelope: StkCallbackEnvelope = serde_json::from_str(payload).unwrap();
        let callback = envelope.body.stk_callback;

        assert!(callback.is_success());
        assert_eq!(callback.checkout_request_id, "ws_CO_191220191020363925");
        assert_eq!(callback.receipt_number().as_deref(), Some("ABC123"));
        assert_eq!(callback.phone_number().as_deref(), Some("254712345678"));
        assert_eq!(callback.amount(), Some(500.0));

        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 9, 30, 0).unwrap();
        assert_eq!(callback.transaction_date(), Some(expected));
    }

    #[test]
    fn parses_failed_callback_without_metadata() {
        let payload = r#"{
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        }"#;

        let envelope: StkCallbackEnvelope = serde_json::from_str(payload).unwrap();
        let callback = envelope.body.stk_callback;

        assert!(!callback.is_success());
        assert_eq!(callback.receipt_number(), None);
        assert_eq!(callback.transaction_date(), None);
    }
}
