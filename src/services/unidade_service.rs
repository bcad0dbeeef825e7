// src/services/unidade_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{NotificacaoRepository, ProfileRepository, UnidadeRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Profile,
        notificacao::DestinoNotificacao,
        tramitacao::Papel,
        unidade::{CriarUnidadePayload, DesignarTitularPayload, HistoricoTitular, TipoTitularidade, Unidade},
    },
};

/// O titular atual de uma unidade para o tipo de suprimento.
pub fn titular_atual(unidade: &Unidade, tipo: TipoTitularidade) -> Option<Uuid> {
    match tipo {
        TipoTitularidade::Ordinario => unidade.titular_ordinario_id,
        TipoTitularidade::Juri => unidade.titular_juri_id,
    }
}

/// Só um SUPRIDO pode ser titular: é ele quem confirma o recebimento e presta contas.
pub fn exigir_titular_suprido(perfil: &Profile) -> Result<(), AppError> {
    if perfil.papel != Papel::Suprido {
        return Err(AppError::RegraDeNegocio(format!(
            "{} tem o papel {} e não pode ser titular de suprimento",
            perfil.nome, perfil.papel
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UnidadeService {
    pool: PgPool,
    unidade_repo: UnidadeRepository,
    profile_repo: ProfileRepository,
    notificacao_repo: NotificacaoRepository,
}

impl UnidadeService {
    pub fn new(
        pool: PgPool,
        unidade_repo: UnidadeRepository,
        profile_repo: ProfileRepository,
        notificacao_repo: NotificacaoRepository,
    ) -> Self {
        Self {
            pool,
            unidade_repo,
            profile_repo,
            notificacao_repo,
        }
    }

    pub async fn listar(&self) -> Result<Vec<Unidade>, AppError> {
        self.unidade_repo.list_all().await
    }

    pub async fn criar(&self, payload: &CriarUnidadePayload) -> Result<Unidade, AppError> {
        let unidade = self
            .unidade_repo
            .create(payload.codigo.trim(), payload.nome.trim(), payload.comarca.trim())
            .await?;
        tracing::info!("🏛️ Unidade {} ({}) cadastrada", unidade.codigo, unidade.nome);
        Ok(unidade)
    }

    /// Troca o titular e registra a mudança no histórico, na mesma transação.
    pub async fn designar_titular(
        &self,
        user: &AuthenticatedUser,
        unidade_id: Uuid,
        payload: &DesignarTitularPayload,
    ) -> Result<Unidade, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let atual = self
            .unidade_repo
            .find_for_update(&mut *tx, unidade_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Unidade {}", unidade_id)))?;

        let titular = self
            .profile_repo
            .find_by_id(&mut *tx, payload.titular_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Perfil {}", payload.titular_id)))?;
        exigir_titular_suprido(&titular)?;

        let anterior = titular_atual(&atual, payload.tipo);
        let portaria = payload.portaria.trim();

        let unidade = self
            .unidade_repo
            .set_titular(
                &mut *tx,
                unidade_id,
                payload.tipo,
                titular.id,
                portaria,
                payload.data_portaria,
            )
            .await?;

        self.unidade_repo
            .insert_historico(
                &mut *tx,
                unidade_id,
                payload.tipo,
                anterior,
                titular.id,
                portaria,
                payload.data_portaria,
                user.0.id,
            )
            .await?;

        self.notificacao_repo
            .insert(
                &mut *tx,
                DestinoNotificacao::Usuario(titular.id),
                None,
                "Designação de titular de suprimento",
                &format!(
                    "Você foi designado(a) titular ({:?}) da unidade {} pela portaria {}.",
                    payload.tipo, unidade.nome, portaria
                ),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "👥 Titular {:?} da unidade {} alterado: {:?} -> {}",
            payload.tipo,
            unidade.codigo,
            anterior,
            titular.id
        );
        Ok(unidade)
    }

    pub async fn historico_titulares(&self, unidade_id: Uuid) -> Result<Vec<HistoricoTitular>, AppError> {
        self.unidade_repo.list_historico(unidade_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tramitacao_service::tests::perfil;
    use chrono::Utc;

    #[test]
    fn current_holder_depends_on_kind() {
        let ordinario = Uuid::new_v4();
        let unidade = Unidade {
            id: Uuid::new_v4(),
            codigo: "0042".into(),
            nome: "Vara Única de Salinópolis".into(),
            comarca: "Salinópolis".into(),
            titular_ordinario_id: Some(ordinario),
            portaria_ordinario: Some("10/2026-GP".into()),
            data_portaria_ordinario: None,
            titular_juri_id: None,
            portaria_juri: None,
            data_portaria_juri: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(titular_atual(&unidade, TipoTitularidade::Ordinario), Some(ordinario));
        assert_eq!(titular_atual(&unidade, TipoTitularidade::Juri), None);
    }

    #[test]
    fn only_requesters_can_hold_a_unit() {
        assert!(exigir_titular_suprido(&perfil(Papel::Suprido)).is_ok());
        for papel in [Papel::Gestor, Papel::Sefin, Papel::Sosfu, Papel::Ajsefin] {
            assert!(
                matches!(exigir_titular_suprido(&perfil(papel)), Err(AppError::RegraDeNegocio(_))),
                "{papel:?} não deveria ser aceito como titular"
            );
        }
    }
}
