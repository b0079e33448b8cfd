use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::payment_transactions},
};
use domain::{
    entities::payment_transactions::{InsertPaymentTransactionEntity, PaymentTransactionEntity},
    repositories::payments::PaymentRepository,
    value_objects::payments::PaymentCallbackUpdate,
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn insert_pending(
        &self,
        insert_payment_transaction_entity: InsertPaymentTransactionEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let transaction_id = insert_into(payment_transactions::table)
            .values(&insert_payment_transaction_entity)
            .returning(payment_transactions::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(transaction_id)
    }

    async fn apply_gateway_result(&self, callback_update: PaymentCallbackUpdate) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(payment_transactions::table)
            .filter(
                payment_transactions::checkout_request_id.eq(&callback_update.checkout_request_id),
            )
            .set((
                payment_transactions::status.eq(callback_update.status.to_string()),
                payment_transactions::mpesa_receipt_number
                    .eq(&callback_update.mpesa_receipt_number),
                payment_transactions::transaction_date.eq(callback_update.transaction_date),
                payment_transactions::result_description.eq(&callback_update.result_description),
                payment_transactions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<PaymentTransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let transaction = payment_transactions::table
            .find(transaction_id)
            .select(PaymentTransactionEntity::as_select())
            .first::<PaymentTransactionEntity>(&mut conn)
            .optional()?;

        Ok(transaction)
    }
}
