use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{
    courses::CourseEntity,
    lessons::LessonEntity,
    quizzes::{QuizEntity, QuizQuestionEntity},
};

#[mockall::automock]
#[async_trait]
pub trait CourseRepository {
    async fn list_published(&self) -> Result<Vec<CourseEntity>>;

    async fn find_published_by_id(&self, course_id: Uuid) -> Result<Option<CourseEntity>>;

    async fn lessons_for_course(&self, course_id: Uuid) -> Result<Vec<LessonEntity>>;

    async fn lesson_belongs_to_course(&self, lesson_id: Uuid, course_id: Uuid) -> Result<bool>;

    async fn count_lessons(&self, course_id: Uuid) -> Result<i64>;

    async fn find_quiz_by_lesson(&self, lesson_id: Uuid) -> Result<Option<QuizEntity>>;

    async fn questions_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizQuestionEntity>>;
}
