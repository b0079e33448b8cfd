use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, insert_into, prelude::*, update, upsert::excluded};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{enrollments, lesson_progress},
    },
};
use domain::{
    entities::enrollments::{
        EnrollmentEntity, InsertEnrollmentEntity, UpsertLessonProgressEntity,
    },
    repositories::enrollments::EnrollmentRepository,
};

pub struct EnrollmentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EnrollmentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentPostgres {
    async fn enroll(&self, insert_enrollment_entity: InsertEnrollmentEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let enrollment_id = insert_into(enrollments::table)
            .values(&insert_enrollment_entity)
            .returning(enrollments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(enrollment_id)
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let enrollment = enrollments::table
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_id.eq(course_id))
            .select(EnrollmentEntity::as_select())
            .first::<EnrollmentEntity>(&mut conn)
            .optional()?;

        Ok(enrollment)
    }

    async fn mark_enrollment_completed(&self, enrollment_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(enrollments::table)
            .filter(enrollments::id.eq(enrollment_id))
            .filter(enrollments::completed_at.is_null())
            .set(enrollments::completed_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn upsert_lesson_progress(
        &self,
        upsert_lesson_progress_entity: UpsertLessonProgressEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(lesson_progress::table)
            .values(&upsert_lesson_progress_entity)
            .on_conflict((lesson_progress::user_id, lesson_progress::lesson_id))
            .do_update()
            .set((
                lesson_progress::completed.eq(excluded(lesson_progress::completed)),
                lesson_progress::completed_at.eq(excluded(lesson_progress::completed_at)),
                lesson_progress::updated_at.eq(excluded(lesson_progress::updated_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn count_completed_lessons(&self, user_id: Uuid, course_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = lesson_progress::table
            .filter(lesson_progress::user_id.eq(user_id))
            .filter(lesson_progress::course_id.eq(course_id))
            .filter(lesson_progress::completed.eq(true))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }
}
