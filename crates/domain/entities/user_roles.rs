use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::user_roles;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = user_roles)]
pub struct UserRoleEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub granted_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_roles)]
pub struct InsertUserRoleEntity {
    pub user_id: Uuid,
    pub role: String,
    pub granted_by: Option<Uuid>,
    pub notes: Option<String>,
}
