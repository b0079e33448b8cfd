use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{quiz_questions, quizzes};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = quizzes)]
pub struct QuizEntity {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub pass_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = quiz_questions)]
pub struct QuizQuestionEntity {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub question: String,
    pub options: serde_json::Value,
    pub correct_option: i32,
    pub position: i32,
}
