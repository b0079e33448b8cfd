use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user_roles::InsertUserRoleEntity;

#[mockall::automock]
#[async_trait]
pub trait RoleRepository {
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>>;

    async fn find_profile_id_by_email(&self, email: String) -> Result<Option<Uuid>>;

    async fn grant(&self, insert_user_role_entity: InsertUserRoleEntity) -> Result<Uuid>;

    /// Returns the number of grants removed.
    async fn revoke(&self, user_id: Uuid, role: String) -> Result<usize>;
}
