pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod health_plans;
pub mod lessons;
pub mod payment_transactions;
pub mod profiles;
pub mod quizzes;
pub mod user_roles;
