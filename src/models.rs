pub mod dashboard;
pub mod projeto;
