use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    domain::{
        entities::payment_transactions::InsertPaymentTransactionEntity,
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::payment_statuses::PaymentStatus,
            payments::{
                InitiateStkPushRequest, InitiateStkPushResponse, MAX_AMOUNT_KES, MIN_AMOUNT_KES,
                PaymentCallbackUpdate, PaymentStatusDto, PaymentWaitDto, WaitOptions,
            },
            phone::normalize_kenyan_msisdn,
        },
    },
    payments::mpesa_client::{CallbackAck, MpesaClient, StkCallback, StkPushResponse},
};
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MpesaGateway: Send + Sync {
    async fn stk_push(
        &self,
        phone_number: &str,
        amount: i64,
        account_reference: &str,
        description: &str,
    ) -> AnyResult<StkPushResponse>;
}

#[async_trait]
impl MpesaGateway for MpesaClient {
    async fn stk_push(
        &self,
        phone_number: &str,
        amount: i64,
        account_reference: &str,
        description: &str,
    ) -> AnyResult<StkPushResponse> {
        self.stk_push(phone_number, amount, account_reference, description)
            .await
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid phone number: expected a Kenyan mobile number")]
    InvalidPhone,
    #[error("amount must be between {MIN_AMOUNT_KES} and {MAX_AMOUNT_KES} KES")]
    InvalidAmount,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::InvalidPhone | PaymentError::InvalidAmount => StatusCode::BAD_REQUEST,
            PaymentError::TransactionNotFound => StatusCode::NOT_FOUND,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

pub struct PaymentUseCase<P, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    payment_repository: Arc<P>,
    mpesa_gateway: Arc<G>,
}

impl<P, G> PaymentUseCase<P, G>
where
    P: PaymentRepository + Send + Sync + 'static,
    G: MpesaGateway + Send + Sync + 'static,
{
    pub fn new(payment_repository: Arc<P>, mpesa_gateway: Arc<G>) -> Self {
        Self {
            payment_repository,
            mpesa_gateway,
        }
    }

    /// Validates the request, submits the STK push and records a pending
    /// transaction keyed by the gateway's request identifiers. Validation
    /// failures never reach the gateway.
    pub async fn initiate_stk_push(
        &self,
        user_id: Uuid,
        request: InitiateStkPushRequest,
    ) -> UseCaseResult<InitiateStkPushResponse> {
        info!(%user_id, amount = request.amount, "payments: stk push requested");

        let phone_number = match normalize_kenyan_msisdn(&request.phone_number) {
            Some(normalized) => normalized,
            None => {
                let err = PaymentError::InvalidPhone;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "payments: rejected phone number"
                );
                return Err(err);
            }
        };

        if !(MIN_AMOUNT_KES..=MAX_AMOUNT_KES).contains(&request.amount) {
            let err = PaymentError::InvalidAmount;
            warn!(
                %user_id,
                amount = request.amount,
                status = err.status_code().as_u16(),
                "payments: rejected amount"
            );
            return Err(err);
        }

        let push_response = self
            .mpesa_gateway
            .stk_push(
                &phone_number,
                request.amount,
                &request.account_reference,
                &request.description,
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "payments: stk push failed at gateway"
                );
                PaymentError::Internal(err)
            })?;

        let transaction_id = self
            .payment_repository
            .insert_pending(InsertPaymentTransactionEntity {
                user_id,
                phone_number: phone_number.clone(),
                amount: request.amount as i32,
                account_reference: request.account_reference,
                description: request.description,
                merchant_request_id: push_response.merchant_request_id.clone(),
                checkout_request_id: push_response.checkout_request_id.clone(),
                status: PaymentStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    checkout_request_id = %push_response.checkout_request_id,
                    db_error = ?err,
                    "payments: failed to insert pending transaction"
                );
                PaymentError::Internal(err)
            })?;

        info!(
            %user_id,
            %transaction_id,
            checkout_request_id = %push_response.checkout_request_id,
            "payments: pending transaction recorded"
        );

        Ok(InitiateStkPushResponse {
            transaction_id,
            customer_message: push_response.customer_message,
        })
    }

    /// Applies the asynchronous gateway outcome to the matching row. Always
    /// returns the success acknowledgement: a failed internal update is
    /// logged rather than surfaced, so the provider does not retry-storm
    /// the webhook.
    pub async fn handle_callback(&self, callback: StkCallback) -> CallbackAck {
        let checkout_request_id = callback.checkout_request_id.clone();
        info!(
            %checkout_request_id,
            result_code = callback.result_code,
            "payments: gateway callback received"
        );

        let update = if callback.is_success() {
            PaymentCallbackUpdate {
                checkout_request_id: checkout_request_id.clone(),
                status: PaymentStatus::Completed,
                mpesa_receipt_number: callback.receipt_number(),
                transaction_date: callback.transaction_date(),
                result_description: Some(callback.result_desc.clone()),
            }
        } else {
            PaymentCallbackUpdate {
                checkout_request_id: checkout_request_id.clone(),
                status: PaymentStatus::Failed,
                mpesa_receipt_number: None,
                transaction_date: None,
                result_description: Some(callback.result_desc.clone()),
            }
        };

        let status = update.status;
        match self.payment_repository.apply_gateway_result(update).await {
            Ok(0) => {
                warn!(
                    %checkout_request_id,
                    "payments: callback matched no transaction row"
                );
            }
            Ok(_) => {
                info!(
                    %checkout_request_id,
                    status = %status,
                    "payments: transaction updated from callback"
                );
            }
            Err(err) => {
                error!(
                    %checkout_request_id,
                    db_error = ?err,
                    "payments: failed to apply callback update"
                );
            }
        }

        CallbackAck::accepted()
    }

    pub async fn get_status(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> UseCaseResult<PaymentStatusDto> {
        let transaction = self
            .payment_repository
            .find_by_id(transaction_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %transaction_id,
                    db_error = ?err,
                    "payments: failed to load transaction"
                );
                PaymentError::Internal(err)
            })?
            .filter(|transaction| transaction.user_id == user_id)
            .ok_or_else(|| {
                let err = PaymentError::TransactionNotFound;
                warn!(
                    %user_id,
                    %transaction_id,
                    status = err.status_code().as_u16(),
                    "payments: transaction missing or owned by another user"
                );
                err
            })?;

        Ok(PaymentStatusDto {
            transaction_id: transaction.id,
            status: PaymentStatus::from_str(&transaction.status)
                .unwrap_or(PaymentStatus::Pending),
            mpesa_receipt_number: transaction.mpesa_receipt_number,
            result_description: transaction.result_description,
            updated_at: transaction.updated_at,
        })
    }

    /// Deadline-bounded poll of the transaction row. The latest status is
    /// always re-read before the deadline verdict, so a transaction that
    /// completes late is reported as completed rather than flagged failed
    /// against stale state. On expiry the caller gets the true (pending)
    /// status plus a `timed_out` marker.
    pub async fn wait_for_status(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        options: WaitOptions,
    ) -> UseCaseResult<PaymentWaitDto> {
        let deadline = Instant::now() + options.deadline;

        loop {
            let status = self.get_status(user_id, transaction_id).await?;
            if status.status.is_terminal() {
                return Ok(PaymentWaitDto {
                    status,
                    timed_out: false,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                info!(
                    %user_id,
                    %transaction_id,
                    "payments: wait deadline reached with transaction still pending"
                );
                return Ok(PaymentWaitDto {
                    status,
                    timed_out: true,
                });
            }

            sleep((deadline - now).min(options.poll_interval)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::entities::payment_transactions::PaymentTransactionEntity;
    use crates::domain::repositories::payments::MockPaymentRepository;
    use crates::payments::mpesa_client::StkCallbackEnvelope;
    use mockall::predicate::eq;
    use std::time::Duration;

    fn push_response() -> StkPushResponse {
        serde_json::from_value(serde_json::json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": "ws_CO_191220191020363925",
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing"
        }))
        .unwrap()
    }

    fn sample_transaction(user_id: Uuid, status: PaymentStatus) -> PaymentTransactionEntity {
        let now = Utc::now();
        PaymentTransactionEntity {
            id: Uuid::new_v4(),
            user_id,
            phone_number: "254712345678".to_string(),
            amount: 500,
            account_reference: "SOMA-PLUS".to_string(),
            description: "Subscription".to_string(),
            merchant_request_id: "29115-34620561-1".to_string(),
            checkout_request_id: "ws_CO_191220191020363925".to_string(),
            status: status.to_string(),
            mpesa_receipt_number: None,
            transaction_date: None,
            result_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn initiate_request(phone_number: &str, amount: i64) -> InitiateStkPushRequest {
        InitiateStkPushRequest {
            phone_number: phone_number.to_string(),
            amount,
            account_reference: "SOMA-PLUS".to_string(),
            description: "Subscription".to_string(),
        }
    }

    fn success_callback() -> StkCallback {
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
        serde_json::from_str::<StkCallbackEnvelope>(payload)
            .unwrap()
            .body
            .stk_callback
    }

    #[tokio::test]
    async fn initiate_normalizes_phone_and_records_pending_row() {
        let user_id = Uuid::new_v4();
        let transaction_id = Uuid::new_v4();

        let mut gateway = MockMpesaGateway::new();
        gateway
            .expect_stk_push()
            .with(
                eq("254712345678"),
                eq(500i64),
                eq("SOMA-PLUS"),
                eq("Subscription"),
            )
            .times(1)
            .returning(|_, _, _, _| {
                let response = push_response();
                Ok(response)
            });

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_insert_pending()
            .withf(|entity| {
                entity.phone_number == "254712345678"
                    && entity.amount == 500
                    && entity.status == "pending"
                    && entity.checkout_request_id == "ws_CO_191220191020363925"
            })
            .times(1)
            .returning(move |_| Ok(transaction_id));

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let response = usecase
            .initiate_stk_push(user_id, initiate_request("0712345678", 500))
            .await
            .unwrap();

        assert_eq!(response.transaction_id, transaction_id);
    }

    #[tokio::test]
    async fn rejects_invalid_phone_before_contacting_gateway() {
        let mut gateway = MockMpesaGateway::new();
        gateway.expect_stk_push().never();

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_insert_pending().never();

        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
        let result = usecase
            .initiate_stk_push(Uuid::new_v4(), initiate_request("0812345678", 500))
            .await;

        assert!(matches!(result, Err(PaymentError::InvalidPhone)));
    }

    #[tokio::test]
    async fn rejects_out_of_range_amounts_before_contacting_gateway() {
        for amount in [0, 150_001] {
            let mut gateway = MockMpesaGateway::new();
            gateway.expect_stk_push().never();

            let mut payment_repo = MockPaymentRepository::new();
            payment_repo.expect_insert_pending().never();

            let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));
            let result = usecase
                .initiate_stk_push(Uuid::new_v4(), initiate_request("0712345678", amount))
                .await;

            assert!(matches!(result, Err(PaymentError::InvalidAmount)));
        }
    }

    #[tokio::test]
    async fn successful_callback_completes_transaction_with_receipt() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_apply_gateway_result()
            .withf(|update| {
                update.checkout_request_id == "ws_CO_191220191020363925"
                    && update.status == PaymentStatus::Completed
                    && update.mpesa_receipt_number.as_deref() == Some("ABC123")
            })
            .times(1)
            .returning(|_| Ok(1));

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let ack = usecase.handle_callback(success_callback()).await;
        assert_eq!(ack.result_code, 0);
    }

    #[tokio::test]
    async fn failed_callback_marks_transaction_failed() {
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
        let callback = serde_json::from_str::<StkCallbackEnvelope>(payload)
            .unwrap()
            .body
            .stk_callback;

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_apply_gateway_result()
            .withf(|update| {
                update.status == PaymentStatus::Failed
                    && update.mpesa_receipt_number.is_none()
                    && update.result_description.as_deref() == Some("Request cancelled by user")
            })
            .times(1)
            .returning(|_| Ok(1));

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let ack = usecase.handle_callback(callback).await;
        assert_eq!(ack.result_code, 0);
    }

    #[tokio::test]
    async fn callback_is_acknowledged_even_when_update_fails() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_apply_gateway_result()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("database unavailable")));

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let ack = usecase.handle_callback(success_callback()).await;
        assert_eq!(ack.result_code, 0);
    }

    #[tokio::test]
    async fn status_is_hidden_from_other_users() {
        let owner = Uuid::new_v4();
        let transaction = sample_transaction(owner, PaymentStatus::Pending);
        let transaction_id = transaction.id;

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_by_id()
            .with(eq(transaction_id))
            .returning(move |_| {
                let transaction = transaction.clone();
                Ok(Some(transaction))
            });

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let result = usecase.get_status(Uuid::new_v4(), transaction_id).await;
        assert!(matches!(result, Err(PaymentError::TransactionNotFound)));
    }

    #[tokio::test]
    async fn wait_reports_completion_observed_before_deadline() {
        let user_id = Uuid::new_v4();
        let pending = sample_transaction(user_id, PaymentStatus::Pending);
        let transaction_id = pending.id;
        let mut completed = pending.clone();
        completed.status = PaymentStatus::Completed.to_string();
        completed.mpesa_receipt_number = Some("ABC123".to_string());

        let mut sequence = mockall::Sequence::new();
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(move |_| {
                let pending = pending.clone();
                Ok(Some(pending))
            });
        payment_repo
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(move |_| {
                let completed = completed.clone();
                Ok(Some(completed))
            });

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let wait = usecase
            .wait_for_status(
                user_id,
                transaction_id,
                WaitOptions {
                    deadline: Duration::from_millis(500),
                    poll_interval: Duration::from_millis(5),
                },
            )
            .await
            .unwrap();

        assert!(!wait.timed_out);
        assert_eq!(wait.status.status, PaymentStatus::Completed);
        assert_eq!(wait.status.mpesa_receipt_number.as_deref(), Some("ABC123"));
    }

    #[tokio::test]
    async fn wait_timeout_reports_latest_pending_status_not_failure() {
        let user_id = Uuid::new_v4();
        let pending = sample_transaction(user_id, PaymentStatus::Pending);
        let transaction_id = pending.id;

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Ok(Some(pending))
        });

        let gateway = MockMpesaGateway::new();
        let usecase = PaymentUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let wait = usecase
            .wait_for_status(
                user_id,
                transaction_id,
                WaitOptions {
                    deadline: Duration::from_millis(30),
                    poll_interval: Duration::from_millis(10),
                },
            )
            .await
            .unwrap();

        assert!(wait.timed_out);
        assert_eq!(wait.status.status, PaymentStatus::Pending);
    }
}
