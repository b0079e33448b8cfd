pub mod ai;
pub mod documents;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod payments;
