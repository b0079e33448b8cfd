use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::certificates;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = certificates)]
pub struct CertificateEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub verification_code: String,
    pub score: Option<i32>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub certificate_url: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = certificates)]
pub struct InsertCertificateEntity {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub verification_code: String,
    pub score: Option<i32>,
    pub issued_at: DateTime<Utc>,
}
