pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod solicitacao_repo;
pub use solicitacao_repo::SolicitacaoRepository;
pub mod tramitacao_repo;
pub use tramitacao_repo::TramitacaoRepository;
pub mod documento_repo;
pub use documento_repo::DocumentoRepository;
pub mod unidade_repo;
pub use unidade_repo::UnidadeRepository;
pub mod servidor_repo;
pub use servidor_repo::ServidorRepository;
pub mod notificacao_repo;
pub use notificacao_repo::NotificacaoRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
