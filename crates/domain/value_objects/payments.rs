use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Daraja rejects STK push amounts outside this range.
pub const MIN_AMOUNT_KES: i64 = 1;
pub const MAX_AMOUNT_KES: i64 = 150_000;

#[derive(Debug, Clone, Deserialize)]
pub struct InitiateStkPushRequest {
    pub phone_number: String,
    pub amount: i64,
    pub account_reference: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct InitiateStkPushResponse {
    pub transaction_id: Uuid,
    pub customer_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentStatusDto {
    pub transaction_id: Uuid,
    pub status: PaymentStatus,
    pub mpesa_receipt_number: Option<String>,
    pub result_description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentWaitDto {
    #[serde(flatten)]
    pub status: PaymentStatusDto,
    pub timed_out: bool,
}

/// Poll cadence and deadline for the server-side status wait. One deadline
/// governs the whole wait; the latest row state is always re-read before a
/// timeout is reported.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub deadline: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(60),
            poll_interval: Duration::from_secs(3),
        }
    }
}

/// Row mutation applied by the Daraja callback, keyed by CheckoutRequestID.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCallbackUpdate {
    pub checkout_request_id: String,
    pub status: PaymentStatus,
    pub mpesa_receipt_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub result_description: Option<String>,
}
