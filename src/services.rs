pub mod auth;
pub mod dashboard_service;
pub mod documento_service;
pub mod lote_service;
pub mod notificacao_service;
pub mod servidor_service;
pub mod solicitacao_service;
pub mod tramitacao_service;
pub mod unidade_service;

#[cfg(test)]
mod integracao;
