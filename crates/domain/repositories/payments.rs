use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::payment_transactions::{
    InsertPaymentTransactionEntity, PaymentTransactionEntity,
};
use crate::domain::value_objects::payments::PaymentCallbackUpdate;

#[mockall::automock]
#[async_trait]
pub trait PaymentRepository {
    async fn insert_pending(
        &self,
        insert_payment_transaction_entity: InsertPaymentTransactionEntity,
    ) -> Result<Uuid>;

    /// Applies the gateway callback outcome to the row matching its
    /// CheckoutRequestID. Returns the number of rows touched.
    async fn apply_gateway_result(&self, update: PaymentCallbackUpdate) -> Result<usize>;

    async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<PaymentTransactionEntity>>;
}
