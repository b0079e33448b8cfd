pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod health_plans;
pub mod payments;
pub mod roles;
pub mod storage;
