use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::enrollments::{
    EnrollmentEntity, InsertEnrollmentEntity, UpsertLessonProgressEntity,
};

#[mockall::automock]
#[async_trait]
pub trait EnrollmentRepository {
    async fn enroll(&self, insert_enrollment_entity: InsertEnrollmentEntity) -> Result<Uuid>;

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentEntity>>;

    async fn mark_enrollment_completed(&self, enrollment_id: Uuid) -> Result<()>;

    async fn upsert_lesson_progress(
        &self,
        upsert_lesson_progress_entity: UpsertLessonProgressEntity,
    ) -> Result<()>;

    async fn count_completed_lessons(&self, user_id: Uuid, course_id: Uuid) -> Result<i64>;
}
