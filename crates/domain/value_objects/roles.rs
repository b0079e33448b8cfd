use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::roles::Role;

#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub email: String,
    pub role: Role,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRoleRequest {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct CurrentRolesResponse {
    pub roles: Vec<Role>,
}
