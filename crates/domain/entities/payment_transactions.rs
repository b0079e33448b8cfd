use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payment_transactions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_transactions)]
pub struct PaymentTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone_number: String,
    pub amount: i32,
    pub account_reference: String,
    pub description: String,
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub status: String,
    pub mpesa_receipt_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub result_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_transactions)]
pub struct InsertPaymentTransactionEntity {
    pub user_id: Uuid,
    pub phone_number: String,
    pub amount: i32,
    pub account_reference: String,
    pub description: String,
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub status: String,
}
