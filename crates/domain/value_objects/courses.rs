use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    courses::CourseEntity,
    lessons::LessonEntity,
    quizzes::{QuizEntity, QuizQuestionEntity},
};

#[derive(Debug, Serialize)]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl From<CourseEntity> for CourseDto {
    fn from(value: CourseEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            category: value.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LessonDto {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
}

impl From<LessonEntity> for LessonDto {
    fn from(value: LessonEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            position: value.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDetailDto {
    #[serde(flatten)]
    pub course: CourseDto,
    pub lessons: Vec<LessonDto>,
}

#[derive(Debug, Serialize)]
pub struct EnrollResponse {
    pub enrollment_id: Uuid,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CourseProgressDto {
    pub completed_lessons: i64,
    pub total_lessons: i64,
    pub percent: u8,
}

impl CourseProgressDto {
    pub fn new(completed_lessons: i64, total_lessons: i64) -> Self {
        let percent = if total_lessons <= 0 {
            0
        } else {
            ((completed_lessons.clamp(0, total_lessons) * 100) / total_lessons) as u8
        };
        Self {
            completed_lessons,
            total_lessons,
            percent,
        }
    }
}

/// Quiz as served to learners: the correct option index never leaves the
/// server.
#[derive(Debug, Serialize)]
pub struct QuizDto {
    pub id: Uuid,
    pub title: String,
    pub pass_score: i32,
    pub questions: Vec<QuizQuestionDto>,
}

#[derive(Debug, Serialize)]
pub struct QuizQuestionDto {
    pub id: Uuid,
    pub question: String,
    pub options: serde_json::Value,
    pub position: i32,
}

impl QuizDto {
    pub fn from_entities(quiz: QuizEntity, questions: Vec<QuizQuestionEntity>) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            pass_score: quiz.pass_score,
            questions: questions
                .into_iter()
                .map(|question| QuizQuestionDto {
                    id: question.id,
                    question: question.question,
                    options: question.options,
                    position: question.position,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompleteCourseRequest {
    pub score: i32,
}

#[derive(Debug, Serialize)]
pub struct CompleteCourseResponse {
    pub certificate_id: Uuid,
    pub verification_code: String,
}
