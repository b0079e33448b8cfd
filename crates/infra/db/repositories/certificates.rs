use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{certificates, courses, profiles},
    },
};
use domain::{
    entities::certificates::{CertificateEntity, InsertCertificateEntity},
    repositories::certificates::CertificateRepository,
    value_objects::certificates::CertificateVerificationRecord,
};

pub struct CertificatePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CertificatePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CertificateRepository for CertificatePostgres {
    async fn create(&self, insert_certificate_entity: InsertCertificateEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let certificate_id = insert_into(certificates::table)
            .values(&insert_certificate_entity)
            .returning(certificates::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(certificate_id)
    }

    async fn find_owned(
        &self,
        certificate_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CertificateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let certificate = certificates::table
            .filter(certificates::id.eq(certificate_id))
            .filter(certificates::user_id.eq(user_id))
            .select(CertificateEntity::as_select())
            .first::<CertificateEntity>(&mut conn)
            .optional()?;

        Ok(certificate)
    }

    async fn find_for_user_and_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<CertificateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let certificate = certificates::table
            .filter(certificates::user_id.eq(user_id))
            .filter(certificates::course_id.eq(course_id))
            .select(CertificateEntity::as_select())
            .first::<CertificateEntity>(&mut conn)
            .optional()?;

        Ok(certificate)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CertificateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = certificates::table
            .filter(certificates::user_id.eq(user_id))
            .order(certificates::issued_at.desc())
            .select(CertificateEntity::as_select())
            .load::<CertificateEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_verification_by_code(
        &self,
        verification_code: String,
    ) -> Result<Option<CertificateVerificationRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = certificates::table
            .inner_join(profiles::table)
            .inner_join(courses::table)
            .filter(certificates::verification_code.eq(&verification_code))
            .select((
                CertificateEntity::as_select(),
                profiles::full_name,
                profiles::email,
                courses::title,
            ))
            .first::<(CertificateEntity, Option<String>, Option<String>, String)>(&mut conn)
            .optional()?;

        Ok(row.map(
            |(certificate, student_full_name, student_email, course_title)| {
                CertificateVerificationRecord {
                    id: certificate.id,
                    user_id: certificate.user_id,
                    verification_code: certificate.verification_code,
                    score: certificate.score,
                    verified: certificate.verified,
                    verified_at: certificate.verified_at,
                    certificate_url: certificate.certificate_url,
                    issued_at: certificate.issued_at,
                    student_full_name,
                    student_email,
                    course_title,
                }
            },
        ))
    }

    async fn mark_verified(&self, verification_code: String) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Guarded single-shot update: verified_at records the first public
        // lookup and is never overwritten.
        let affected = update(certificates::table)
            .filter(certificates::verification_code.eq(&verification_code))
            .filter(certificates::verified.eq(false))
            .set((
                certificates::verified.eq(true),
                certificates::verified_at.eq(Some(Utc::now())),
            ))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn set_certificate_url(&self, certificate_id: Uuid, url: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(certificates::table)
            .filter(certificates::id.eq(certificate_id))
            .set(certificates::certificate_url.eq(Some(url)))
            .execute(&mut conn)?;

        Ok(())
    }
}
