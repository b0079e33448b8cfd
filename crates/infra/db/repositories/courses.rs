use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{courses, lessons, quiz_questions, quizzes},
    },
};
use domain::{
    entities::{
        courses::CourseEntity,
        lessons::LessonEntity,
        quizzes::{QuizEntity, QuizQuestionEntity},
    },
    repositories::courses::CourseRepository,
};

pub struct CoursePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoursePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CourseRepository for CoursePostgres {
    async fn list_published(&self) -> Result<Vec<CourseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = courses::table
            .filter(courses::is_published.eq(true))
            .order(courses::created_at.desc())
            .select(CourseEntity::as_select())
            .load::<CourseEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_published_by_id(&self, course_id: Uuid) -> Result<Option<CourseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let course = courses::table
            .filter(courses::id.eq(course_id))
            .filter(courses::is_published.eq(true))
            .select(CourseEntity::as_select())
            .first::<CourseEntity>(&mut conn)
            .optional()?;

        Ok(course)
    }

    async fn lessons_for_course(&self, course_id: Uuid) -> Result<Vec<LessonEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = lessons::table
            .filter(lessons::course_id.eq(course_id))
            .order(lessons::position.asc())
            .select(LessonEntity::as_select())
            .load::<LessonEntity>(&mut conn)?;

        Ok(results)
    }

    async fn lesson_belongs_to_course(&self, lesson_id: Uuid, course_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = lessons::table
            .filter(lessons::id.eq(lesson_id))
            .filter(lessons::course_id.eq(course_id))
            .select(lessons::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(found.is_some())
    }

    async fn count_lessons(&self, course_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = lessons::table
            .filter(lessons::course_id.eq(course_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn find_quiz_by_lesson(&self, lesson_id: Uuid) -> Result<Option<QuizEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let quiz = quizzes::table
            .filter(quizzes::lesson_id.eq(lesson_id))
            .select(QuizEntity::as_select())
            .first::<QuizEntity>(&mut conn)
            .optional()?;

        Ok(quiz)
    }

    async fn questions_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = quiz_questions::table
            .filter(quiz_questions::quiz_id.eq(quiz_id))
            .order(quiz_questions::position.asc())
            .select(QuizQuestionEntity::as_select())
            .load::<QuizQuestionEntity>(&mut conn)?;

        Ok(results)
    }
}
