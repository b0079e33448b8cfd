use anyhow::Result;
use async_trait::async_trait;
use diesel::{QueryDsl, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::health_plans},
};
use domain::{
    entities::health_plans::{HealthPlanEntity, InsertHealthPlanEntity},
    repositories::health_plans::HealthPlanRepository,
};

pub struct HealthPlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl HealthPlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl HealthPlanRepository for HealthPlanPostgres {
    async fn insert_plan(
        &self,
        insert_health_plan_entity: InsertHealthPlanEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let plan_id = insert_into(health_plans::table)
            .values(&insert_health_plan_entity)
            .returning(health_plans::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(plan_id)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<HealthPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = health_plans::table
            .filter(health_plans::user_id.eq(user_id))
            .order(health_plans::created_at.desc())
            .select(HealthPlanEntity::as_select())
            .load::<HealthPlanEntity>(&mut conn)?;

        Ok(results)
    }
}
