pub mod projeto_repo;
pub use projeto_repo::ProjetoRepository;
