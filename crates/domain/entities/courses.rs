use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::courses;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = courses)]
pub struct CourseEntity {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pass_score: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
