pub mod auth;
pub mod dashboard;
pub mod documento;
pub mod lote;
pub mod notificacao;
pub mod servidor;
pub mod solicitacao;
pub mod tramitacao;
pub mod unidade;
