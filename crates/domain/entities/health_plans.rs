use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::health_plans;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = health_plans)]
pub struct HealthPlanEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub content: serde_json::Value,
    pub generated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = health_plans)]
pub struct InsertHealthPlanEntity {
    pub user_id: Uuid,
    pub plan_type: String,
    pub content: serde_json::Value,
    pub generated: bool,
}
