pub mod consolidacao;
pub mod dashboard_service;
pub mod projeto_service;
