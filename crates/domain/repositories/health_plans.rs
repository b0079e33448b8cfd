use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::health_plans::{HealthPlanEntity, InsertHealthPlanEntity};

#[mockall::automock]
#[async_trait]
pub trait HealthPlanRepository {
    async fn insert_plan(&self, insert_health_plan_entity: InsertHealthPlanEntity) -> Result<Uuid>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<HealthPlanEntity>>;
}
