use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::axum_http::error_responses::error_response;
use crate::usecases::courses::CourseUseCase;
use crates::{
    domain::{
        repositories::{
            certificates::CertificateRepository, courses::CourseRepository,
            enrollments::EnrollmentRepository,
        },
        value_objects::courses::CompleteCourseRequest,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            certificates::CertificatePostgres, courses::CoursePostgres,
            enrollments::EnrollmentPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let course_repository = CoursePostgres::new(Arc::clone(&db_pool));
    let enrollment_repository = EnrollmentPostgres::new(Arc::clone(&db_pool));
    let certificate_repository = CertificatePostgres::new(Arc::clone(&db_pool));
    let course_usecase = CourseUseCase::new(
        Arc::new(course_repository),
        Arc::new(enrollment_repository),
        Arc::new(certificate_repository),
    );

    Router::new()
        .route("/", get(list_courses))
        .route("/:course_id", get(course_detail))
        .route("/:course_id/enroll", post(enroll))
        .route("/:course_id/progress", get(progress))
        .route("/:course_id/complete", post(complete_course))
        .route(
            "/:course_id/lessons/:lesson_id/complete",
            post(complete_lesson),
        )
        .route("/:course_id/lessons/:lesson_id/quiz", get(lesson_quiz))
        .with_state(Arc::new(course_usecase))
}

pub async fn list_courses<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase.list_courses().await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn course_detail<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    _auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase.course_detail(course_id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn enroll<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase.enroll(auth.user_id, course_id).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn progress<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase.progress(auth.user_id, course_id).await {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn complete_lesson<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    auth: AuthUser,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase
        .complete_lesson(auth.user_id, course_id, lesson_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn lesson_quiz<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    auth: AuthUser,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase
        .lesson_quiz(auth.user_id, course_id, lesson_id)
        .await
    {
        Ok(quiz) => (StatusCode::OK, Json(quiz)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn complete_course<C, E, Cert>(
    State(course_usecase): State<Arc<CourseUseCase<C, E, Cert>>>,
    auth: AuthUser,
    Path(course_id): Path<Uuid>,
    Json(request): Json<CompleteCourseRequest>,
) -> impl IntoResponse
where
    C: CourseRepository + Send + Sync + 'static,
    E: EnrollmentRepository + Send + Sync + 'static,
    Cert: CertificateRepository + Send + Sync + 'static,
{
    match course_usecase
        .complete_course(auth.user_id, course_id, request.score)
        .await
    {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
