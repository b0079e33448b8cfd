pub mod ai;
pub mod certificates;
pub mod courses;
pub mod health_plans;
pub mod payments;
pub mod roles;
