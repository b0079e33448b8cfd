use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::lessons;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = lessons)]
pub struct LessonEntity {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
