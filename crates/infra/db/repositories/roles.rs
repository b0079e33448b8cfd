use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, delete, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{profiles, user_roles},
    },
};
use domain::{
    entities::user_roles::InsertUserRoleEntity, repositories::roles::RoleRepository,
};

pub struct RolePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RolePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RoleRepository for RolePostgres {
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = user_roles::table
            .filter(user_roles::user_id.eq(user_id))
            .select(user_roles::role)
            .load::<String>(&mut conn)?;

        Ok(results)
    }

    async fn find_profile_id_by_email(&self, email: String) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let profile_id = profiles::table
            .filter(profiles::email.eq(&email))
            .select(profiles::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(profile_id)
    }

    async fn grant(&self, insert_user_role_entity: InsertUserRoleEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let grant_id = insert_into(user_roles::table)
            .values(&insert_user_role_entity)
            .returning(user_roles::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(grant_id)
    }

    async fn revoke(&self, user_id: Uuid, role: String) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let removed = delete(
            user_roles::table
                .filter(user_roles::user_id.eq(user_id))
                .filter(user_roles::role.eq(&role)),
        )
        .execute(&mut conn)?;

        Ok(removed)
    }
}
