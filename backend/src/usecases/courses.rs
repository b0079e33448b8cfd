use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    entities::{
        certificates::InsertCertificateEntity,
        enrollments::{InsertEnrollmentEntity, UpsertLessonProgressEntity},
    },
    repositories::{
        certificates::CertificateRepository, courses::CourseRepository,
        enrollments::EnrollmentRepository,
    },
    value_objects::courses::{
        CompleteCourseResponse, CourseDetailDto, CourseDto, CourseProgressDto, EnrollResponse,
        LessonDto, QuizDto,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::certificates::generate_verification_code;

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("course not found")]
    CourseNotFound,
    #[error("lesson not found in this course")]
    LessonNotFound,
    #[error("no quiz for this lesson")]
    QuizNotFound,
    #[error("already enrolled in this course")]
    AlreadyEnrolled,
    #[error("not enrolled in this course")]
    NotEnrolled,
    #[error("score {score} is below the pass mark of {pass_score}")]
    ScoreBelowPassMark { score: i32, pass_score: i32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CourseError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CourseError::CourseNotFound
            | CourseError::LessonNotFound
            | CourseError::QuizNotFound => StatusCode::NOT_FOUND,
            CourseError::AlreadyEnrolled => StatusCode::CONFLICT,
            CourseError::NotEnrolled => StatusCode::FORBIDDEN,
            CourseError::ScoreBelowPassMark { .. } => StatusCode::BAD_REQUEST,
            CourseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CourseError>;

pub struct CourseUseCase<C, E, Cert>
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    course_repository: Arc<C>,
    enrollment_repository: Arc<E>,
    certificate_repository: Arc<Cert>,
}

impl<C, E, Cert> CourseUseCase<C, E, Cert>
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    pub fn new(
        course_repository: Arc<C>,
        enrollment_repository: Arc<E>,
        certificate_repository: Arc<Cert>,
    ) -> Self {
        Self {
            course_repository,
            enrollment_repository,
            certificate_repository,
        }
    }

    pub async fn list_courses(&self) -> UseCaseResult<Vec<CourseDto>> {
        let courses = self
            .course_repository
            .list_published()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "courses: failed to list published courses");
                CourseError::Internal(err)
            })?;

        Ok(courses.into_iter().map(CourseDto::from).collect())
    }

    pub async fn course_detail(&self, course_id: Uuid) -> UseCaseResult<CourseDetailDto> {
        let course = self.require_course(course_id).await?;

        let lessons = self
            .course_repository
            .lessons_for_course(course_id)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "courses: failed to load lessons");
                CourseError::Internal(err)
            })?;

        Ok(CourseDetailDto {
            course: CourseDto::from(course),
            lessons: lessons.into_iter().map(LessonDto::from).collect(),
        })
    }

    pub async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> UseCaseResult<EnrollResponse> {
        self.require_course(course_id).await?;

        if self.find_enrollment(user_id, course_id).await?.is_some() {
            let err = CourseError::AlreadyEnrolled;
            warn!(
                %user_id,
                %course_id,
                status = err.status_code().as_u16(),
                "courses: duplicate enrollment attempt"
            );
            return Err(err);
        }

        let enrollment_id = self
            .enrollment_repository
            .enroll(InsertEnrollmentEntity {
                user_id,
                course_id,
                enrolled_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(%user_id, %course_id, db_error = ?err, "courses: failed to enroll");
                CourseError::Internal(err)
            })?;

        info!(%user_id, %course_id, %enrollment_id, "courses: enrolled");

        Ok(EnrollResponse { enrollment_id })
    }

    pub async fn complete_lesson(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> UseCaseResult<()> {
        self.require_enrollment(user_id, course_id).await?;

        let belongs = self
            .course_repository
            .lesson_belongs_to_course(lesson_id, course_id)
            .await
            .map_err(CourseError::Internal)?;
        if !belongs {
            let err = CourseError::LessonNotFound;
            warn!(
                %user_id,
                %course_id,
                %lesson_id,
                status = err.status_code().as_u16(),
                "courses: lesson does not belong to course"
            );
            return Err(err);
        }

        let now = Utc::now();
        self.enrollment_repository
            .upsert_lesson_progress(UpsertLessonProgressEntity {
                user_id,
                lesson_id,
                course_id,
                completed: true,
                completed_at: Some(now),
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %lesson_id,
                    db_error = ?err,
                    "courses: failed to record lesson progress"
                );
                CourseError::Internal(err)
            })?;

        Ok(())
    }

    /// Serves the lesson quiz to an enrolled learner, without the correct
    /// option indexes.
    pub async fn lesson_quiz(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> UseCaseResult<QuizDto> {
        self.require_enrollment(user_id, course_id).await?;

        let belongs = self
            .course_repository
            .lesson_belongs_to_course(lesson_id, course_id)
            .await
            .map_err(CourseError::Internal)?;
        if !belongs {
            return Err(CourseError::LessonNotFound);
        }

        let quiz = self
            .course_repository
            .find_quiz_by_lesson(lesson_id)
            .await
            .map_err(|err| {
                error!(%lesson_id, db_error = ?err, "courses: failed to load quiz");
                CourseError::Internal(err)
            })?
            .ok_or(CourseError::QuizNotFound)?;

        let questions = self
            .course_repository
            .questions_for_quiz(quiz.id)
            .await
            .map_err(|err| {
                error!(quiz_id = %quiz.id, db_error = ?err, "courses: failed to load questions");
                CourseError::Internal(err)
            })?;

        Ok(QuizDto::from_entities(quiz, questions))
    }

    pub async fn progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> UseCaseResult<CourseProgressDto> {
        self.require_enrollment(user_id, course_id).await?;

        let total_lessons = self
            .course_repository
            .count_lessons(course_id)
            .await
            .map_err(CourseError::Internal)?;
        let completed_lessons = self
            .enrollment_repository
            .count_completed_lessons(user_id, course_id)
            .await
            .map_err(CourseError::Internal)?;

        Ok(CourseProgressDto::new(completed_lessons, total_lessons))
    }

    /// Marks the enrollment complete and issues the certificate when the
    /// score clears the course pass mark. Completing an already-completed
    /// course returns the existing certificate instead of minting another.
    pub async fn complete_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        score: i32,
    ) -> UseCaseResult<CompleteCourseResponse> {
        let course = self.require_course(course_id).await?;
        let enrollment = self.require_enrollment(user_id, course_id).await?;

        if let Some(certificate) = self
            .certificate_repository
            .find_for_user_and_course(user_id, course_id)
            .await
            .map_err(CourseError::Internal)?
        {
            info!(
                %user_id,
                %course_id,
                certificate_id = %certificate.id,
                "courses: completion repeated, returning existing certificate"
            );
            return Ok(CompleteCourseResponse {
                certificate_id: certificate.id,
                verification_code: certificate.verification_code,
            });
        }

        if score < course.pass_score {
            let err = CourseError::ScoreBelowPassMark {
                score,
                pass_score: course.pass_score,
            };
            warn!(
                %user_id,
                %course_id,
                score,
                pass_score = course.pass_score,
                status = err.status_code().as_u16(),
                "courses: completion score below pass mark"
            );
            return Err(err);
        }

        let verification_code = generate_verification_code();
        let certificate_id = self
            .certificate_repository
            .create(InsertCertificateEntity {
                user_id,
                course_id,
                verification_code: verification_code.clone(),
                score: Some(score),
                issued_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %course_id,
                    db_error = ?err,
                    "courses: failed to issue certificate"
                );
                CourseError::Internal(err)
            })?;

        self.enrollment_repository
            .mark_enrollment_completed(enrollment.id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %course_id,
                    db_error = ?err,
                    "courses: failed to mark enrollment completed"
                );
                CourseError::Internal(err)
            })?;

        info!(
            %user_id,
            %course_id,
            %certificate_id,
            "courses: course completed and certificate issued"
        );

        Ok(CompleteCourseResponse {
            certificate_id,
            verification_code,
        })
    }

    async fn require_course(
        &self,
        course_id: Uuid,
    ) -> UseCaseResult<crates::domain::entities::courses::CourseEntity> {
        self.course_repository
            .find_published_by_id(course_id)
            .await
            .map_err(|err| {
                error!(%course_id, db_error = ?err, "courses: failed to load course");
                CourseError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = CourseError::CourseNotFound;
                warn!(
                    %course_id,
                    status = err.status_code().as_u16(),
                    "courses: unknown or unpublished course"
                );
                err
            })
    }

    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> UseCaseResult<Option<crates::domain::entities::enrollments::EnrollmentEntity>> {
        self.enrollment_repository
            .find_enrollment(user_id, course_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %course_id,
                    db_error = ?err,
                    "courses: failed to load enrollment"
                );
                CourseError::Internal(err)
            })
    }

    async fn require_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> UseCaseResult<crates::domain::entities::enrollments::EnrollmentEntity> {
        self.find_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| {
                let err = CourseError::NotEnrolled;
                warn!(
                    %user_id,
                    %course_id,
                    status = err.status_code().as_u16(),
                    "courses: action requires enrollment"
                );
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::entities::{
        certificates::CertificateEntity, courses::CourseEntity, enrollments::EnrollmentEntity,
    };
    use crates::domain::repositories::{
        certificates::MockCertificateRepository, courses::MockCourseRepository,
        enrollments::MockEnrollmentRepository,
    };

    fn sample_course(pass_score: i32) -> CourseEntity {
        CourseEntity {
            id: Uuid::new_v4(),
            title: "Community Health Basics".to_string(),
            description: None,
            category: Some("health".to_string()),
            pass_score,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    fn sample_enrollment(user_id: Uuid, course_id: Uuid) -> EnrollmentEntity {
        EnrollmentEntity {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            enrolled_at: Utc::now(),
            completed_at: None,
        }
    }

    fn sample_certificate(user_id: Uuid, course_id: Uuid) -> CertificateEntity {
        CertificateEntity {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            verification_code: "SOMA-AB12CD34EF".to_string(),
            score: Some(90),
            verified: false,
            verified_at: None,
            certificate_url: None,
            issued_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn completion_issues_certificate_when_score_clears_pass_mark() {
        let user_id = Uuid::new_v4();
        let course = sample_course(70);
        let course_id = course.id;
        let enrollment = sample_enrollment(user_id, course_id);
        let certificate_id = Uuid::new_v4();

        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_published_by_id()
            .returning(move |_| {
                let course = course.clone();
                Ok(Some(course))
            });

        let mut enrollment_repo = MockEnrollmentRepository::new();
        enrollment_repo.expect_find_enrollment().returning(move |_, _| {
            let enrollment = enrollment.clone();
            Ok(Some(enrollment))
        });
        enrollment_repo
            .expect_mark_enrollment_completed()
            .times(1)
            .returning(|_| Ok(()));

        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_for_user_and_course()
            .returning(|_, _| Ok(None));
        certificate_repo
            .expect_create()
            .withf(move |entity| entity.score == Some(85) && entity.user_id == user_id)
            .times(1)
            .returning(move |_| Ok(certificate_id));

        let usecase = CourseUseCase::new(
            Arc::new(course_repo),
            Arc::new(enrollment_repo),
            Arc::new(certificate_repo),
        );

        let response = usecase.complete_course(user_id, course_id, 85).await.unwrap();
        assert_eq!(response.certificate_id, certificate_id);
        assert!(response.verification_code.starts_with("SOMA-"));
    }

    #[tokio::test]
    async fn repeated_completion_returns_existing_certificate() {
        let user_id = Uuid::new_v4();
        let course = sample_course(70);
        let course_id = course.id;
        let enrollment = sample_enrollment(user_id, course_id);
        let existing = sample_certificate(user_id, course_id);
        let existing_id = existing.id;

        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_published_by_id()
            .returning(move |_| {
                let course = course.clone();
                Ok(Some(course))
            });

        let mut enrollment_repo = MockEnrollmentRepository::new();
        enrollment_repo.expect_find_enrollment().returning(move |_, _| {
            let enrollment = enrollment.clone();
            Ok(Some(enrollment))
        });
        enrollment_repo.expect_mark_enrollment_completed().never();

        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_for_user_and_course()
            .returning(move |_, _| {
                let existing = existing.clone();
                Ok(Some(existing))
            });
        certificate_repo.expect_create().never();

        let usecase = CourseUseCase::new(
            Arc::new(course_repo),
            Arc::new(enrollment_repo),
            Arc::new(certificate_repo),
        );

        let response = usecase.complete_course(user_id, course_id, 95).await.unwrap();
        assert_eq!(response.certificate_id, existing_id);
    }

    #[tokio::test]
    async fn low_score_does_not_issue_certificate() {
        let user_id = Uuid::new_v4();
        let course = sample_course(70);
        let course_id = course.id;
        let enrollment = sample_enrollment(user_id, course_id);

        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_published_by_id()
            .returning(move |_| {
                let course = course.clone();
                Ok(Some(course))
            });

        let mut enrollment_repo = MockEnrollmentRepository::new();
        enrollment_repo.expect_find_enrollment().returning(move |_, _| {
            let enrollment = enrollment.clone();
            Ok(Some(enrollment))
        });
        enrollment_repo.expect_mark_enrollment_completed().never();

        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_find_for_user_and_course()
            .returning(|_, _| Ok(None));
        certificate_repo.expect_create().never();

        let usecase = CourseUseCase::new(
            Arc::new(course_repo),
            Arc::new(enrollment_repo),
            Arc::new(certificate_repo),
        );

        let result = usecase.complete_course(user_id, course_id, 40).await;
        assert!(matches!(
            result,
            Err(CourseError::ScoreBelowPassMark { score: 40, .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_enrollment_conflicts() {
        let user_id = Uuid::new_v4();
        let course = sample_course(70);
        let course_id = course.id;
        let enrollment = sample_enrollment(user_id, course_id);

        let mut course_repo = MockCourseRepository::new();
        course_repo
            .expect_find_published_by_id()
            .returning(move |_| {
                let course = course.clone();
                Ok(Some(course))
            });

        let mut enrollment_repo = MockEnrollmentRepository::new();
        enrollment_repo.expect_find_enrollment().returning(move |_, _| {
            let enrollment = enrollment.clone();
            Ok(Some(enrollment))
        });
        enrollment_repo.expect_enroll().never();

        let certificate_repo = MockCertificateRepository::new();
        let usecase = CourseUseCase::new(
            Arc::new(course_repo),
            Arc::new(enrollment_repo),
            Arc::new(certificate_repo),
        );

        let result = usecase.enroll(user_id, course_id).await;
        assert!(matches!(result, Err(CourseError::AlreadyEnrolled)));
    }

    #[test]
    fn progress_percentage_is_clamped_and_rounded_down() {
        assert_eq!(CourseProgressDto::new(0, 0).percent, 0);
        assert_eq!(CourseProgressDto::new(1, 3).percent, 33);
        assert_eq!(CourseProgressDto::new(3, 3).percent, 100);
        assert_eq!(CourseProgressDto::new(5, 3).percent, 100);
    }
}
