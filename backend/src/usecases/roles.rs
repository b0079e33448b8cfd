use std::collections::HashSet;
use std::sync::Arc;

use crates::domain::{
    entities::user_roles::InsertUserRoleEntity, repositories::roles::RoleRepository,
    value_objects::enums::roles::Role,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("missing required role: {0}")]
    Forbidden(Role),
    #[error("no profile found for that email")]
    UserNotFound,
    #[error("role already granted")]
    AlreadyGranted,
    #[error("role grant not found")]
    GrantNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RoleError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RoleError::Forbidden(_) => StatusCode::FORBIDDEN,
            RoleError::UserNotFound | RoleError::GrantNotFound => StatusCode::NOT_FOUND,
            RoleError::AlreadyGranted => StatusCode::CONFLICT,
            RoleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, RoleError>;

/// Whether a held role satisfies a required one. Higher grants cover the
/// tiers below them.
fn satisfies(held: Role, required: Role) -> bool {
    if held == required {
        return true;
    }
    match held {
        Role::SuperAdmin => true,
        Role::Admin => required == Role::Moderator || required == Role::User,
        Role::Moderator => required == Role::User,
        Role::User => false,
    }
}

/// The single authorization seam: every protected surface resolves the
/// caller's role set through this use case instead of re-deriving
/// admin/super-admin booleans in place.
pub struct RoleUseCase<R>
where
    R: RoleRepository + Send + Sync + 'static,
{
    role_repository: Arc<R>,
}

impl<R> RoleUseCase<R>
where
    R: RoleRepository + Send + Sync + 'static,
{
    pub fn new(role_repository: Arc<R>) -> Self {
        Self { role_repository }
    }

    pub async fn current_user_roles(&self, user_id: Uuid) -> UseCaseResult<HashSet<Role>> {
        let raw_roles = self
            .role_repository
            .roles_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "roles: failed to load role grants");
                RoleError::Internal(err)
            })?;

        let mut roles = HashSet::new();
        for raw in raw_roles {
            match Role::from_str(&raw) {
                Some(role) => {
                    roles.insert(role);
                }
                None => {
                    warn!(%user_id, role = raw, "roles: ignoring unknown role grant");
                }
            }
        }

        Ok(roles)
    }

    pub async fn require(&self, user_id: Uuid, required: Role) -> UseCaseResult<()> {
        let roles = self.current_user_roles(user_id).await?;
        if roles.iter().any(|held| satisfies(*held, required)) {
            return Ok(());
        }

        let err = RoleError::Forbidden(required);
        warn!(
            %user_id,
            required = %required,
            status = err.status_code().as_u16(),
            "roles: required role not held"
        );
        Err(err)
    }

    pub async fn grant_role(
        &self,
        caller_id: Uuid,
        email: String,
        role: Role,
        notes: Option<String>,
    ) -> UseCaseResult<Uuid> {
        self.require_grant_privilege(caller_id, role).await?;

        let target_id = self.resolve_profile(&email).await?;

        let existing = self.current_user_roles(target_id).await?;
        if existing.contains(&role) {
            let err = RoleError::AlreadyGranted;
            warn!(
                %caller_id,
                %target_id,
                role = %role,
                status = err.status_code().as_u16(),
                "roles: duplicate grant attempt"
            );
            return Err(err);
        }

        let grant_id = self
            .role_repository
            .grant(InsertUserRoleEntity {
                user_id: target_id,
                role: role.to_string(),
                granted_by: Some(caller_id),
                notes,
            })
            .await
            .map_err(|err| {
                error!(%caller_id, %target_id, db_error = ?err, "roles: grant failed");
                RoleError::Internal(err)
            })?;

        info!(%caller_id, %target_id, role = %role, "roles: role granted");

        Ok(grant_id)
    }

    pub async fn revoke_role(
        &self,
        caller_id: Uuid,
        email: String,
        role: Role,
    ) -> UseCaseResult<()> {
        self.require_grant_privilege(caller_id, role).await?;

        let target_id = self.resolve_profile(&email).await?;

        let removed = self
            .role_repository
            .revoke(target_id, role.to_string())
            .await
            .map_err(|err| {
                error!(%caller_id, %target_id, db_error = ?err, "roles: revoke failed");
                RoleError::Internal(err)
            })?;

        if removed == 0 {
            let err = RoleError::GrantNotFound;
            warn!(
                %caller_id,
                %target_id,
                role = %role,
                status = err.status_code().as_u16(),
                "roles: revoke matched no grant"
            );
            return Err(err);
        }

        info!(%caller_id, %target_id, role = %role, "roles: role revoked");

        Ok(())
    }

    /// Admins manage the lower tiers; touching admin or super-admin grants
    /// takes a super-admin caller.
    async fn require_grant_privilege(&self, caller_id: Uuid, role: Role) -> UseCaseResult<()> {
        match role {
            Role::Admin | Role::SuperAdmin => self.require(caller_id, Role::SuperAdmin).await,
            Role::Moderator | Role::User => self.require(caller_id, Role::Admin).await,
        }
    }

    async fn resolve_profile(&self, email: &str) -> UseCaseResult<Uuid> {
        self.role_repository
            .find_profile_id_by_email(email.to_string())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "roles: profile lookup failed");
                RoleError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = RoleError::UserNotFound;
                warn!(
                    status = err.status_code().as_u16(),
                    "roles: no profile for email"
                );
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::roles::MockRoleRepository;
    use mockall::predicate::eq;

    fn repo_with_roles(user_id: Uuid, roles: Vec<&'static str>) -> MockRoleRepository {
        let mut repo = MockRoleRepository::new();
        repo.expect_roles_for_user()
            .with(eq(user_id))
            .returning(move |_| {
                let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
                Ok(roles)
            });
        repo
    }

    #[test]
    fn higher_grants_cover_lower_tiers() {
        assert!(satisfies(Role::SuperAdmin, Role::Admin));
        assert!(satisfies(Role::Admin, Role::Moderator));
        assert!(satisfies(Role::Moderator, Role::User));
        assert!(!satisfies(Role::Admin, Role::SuperAdmin));
        assert!(!satisfies(Role::User, Role::Moderator));
    }

    #[tokio::test]
    async fn require_passes_with_a_covering_grant() {
        let user_id = Uuid::new_v4();
        let repo = repo_with_roles(user_id, vec!["super_admin"]);

        let usecase = RoleUseCase::new(Arc::new(repo));
        usecase.require(user_id, Role::Admin).await.unwrap();
    }

    #[tokio::test]
    async fn require_fails_without_grant() {
        let user_id = Uuid::new_v4();
        let repo = repo_with_roles(user_id, vec!["user"]);

        let usecase = RoleUseCase::new(Arc::new(repo));
        let result = usecase.require(user_id, Role::Admin).await;

        assert!(matches!(result, Err(RoleError::Forbidden(Role::Admin))));
    }

    #[tokio::test]
    async fn unknown_role_strings_are_ignored() {
        let user_id = Uuid::new_v4();
        let repo = repo_with_roles(user_id, vec!["admin", "owner"]);

        let usecase = RoleUseCase::new(Arc::new(repo));
        let roles = usecase.current_user_roles(user_id).await.unwrap();

        assert_eq!(roles, HashSet::from([Role::Admin]));
    }

    #[tokio::test]
    async fn non_admin_cannot_grant_roles() {
        let caller = Uuid::new_v4();
        let mut repo = repo_with_roles(caller, vec!["moderator"]);
        repo.expect_find_profile_id_by_email().never();
        repo.expect_grant().never();

        let usecase = RoleUseCase::new(Arc::new(repo));
        let result = usecase
            .grant_role(caller, "learner@example.com".to_string(), Role::Moderator, None)
            .await;

        assert!(matches!(result, Err(RoleError::Forbidden(Role::Admin))));
    }

    #[tokio::test]
    async fn admin_grants_require_super_admin() {
        let caller = Uuid::new_v4();
        let mut repo = repo_with_roles(caller, vec!["admin"]);
        repo.expect_find_profile_id_by_email().never();
        repo.expect_grant().never();

        let usecase = RoleUseCase::new(Arc::new(repo));
        let result = usecase
            .grant_role(caller, "learner@example.com".to_string(), Role::Admin, None)
            .await;

        assert!(matches!(result, Err(RoleError::Forbidden(Role::SuperAdmin))));
    }
}
