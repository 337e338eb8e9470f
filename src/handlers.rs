pub mod dashboard;
pub mod projetos;
