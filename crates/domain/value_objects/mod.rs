pub mod ai;
pub mod certificates;
pub mod courses;
pub mod enums;
pub mod health_plans;
pub mod payments;
pub mod phone;
pub mod roles;
