// src/services/notificacao_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::NotificacaoRepository,
    models::{auth::Profile, notificacao::Notificacao},
};

#[derive(Clone)]
pub struct NotificacaoService {
    repo: NotificacaoRepository,
}

impl NotificacaoService {
    pub fn new(repo: NotificacaoRepository) -> Self {
        Self { repo }
    }

    /// Pessoais e da fila do papel, mais recentes primeiro.
    pub async fn minhas(&self, ator: &Profile) -> Result<Vec<Notificacao>, AppError> {
        self.repo.list_for(ator.id, ator.papel).await
    }

    pub async fn marcar_lida(&self, ator: &Profile, id: Uuid) -> Result<(), AppError> {
        if !self.repo.mark_read(id, ator.id, ator.papel).await? {
            return Err(AppError::ResourceNotFound(format!("Notificação {}", id)));
        }
        Ok(())
    }
}
