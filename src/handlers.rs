pub mod auth;
pub mod dashboard;
pub mod documentos;
pub mod lotes;
pub mod notificacoes;
pub mod servidores;
pub mod solicitacoes;
pub mod tramitacao;
pub mod unidades;
