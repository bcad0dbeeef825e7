// src/db/tramitacao_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tramitacao::{AcaoTramitacao, HistoricoTramitacao, Papel, StatusSolicitacao},
};

const HISTORICO_COLUMNS: &str = r#"
    id, solicitacao_id, acao, origem, destino, status_anterior, status_novo,
    observacao, ator_id, created_at
"#;

/// Uma linha nova de histórico. Não há update nem delete: a tabela é só inserção.
#[derive(Debug, Clone)]
pub struct NovoHistorico<'a> {
    pub solicitacao_id: Uuid,
    pub acao: AcaoTramitacao,
    pub origem: Papel,
    pub destino: Papel,
    pub status_anterior: Option<StatusSolicitacao>,
    pub status_novo: StatusSolicitacao,
    pub observacao: Option<&'a str>,
    pub ator_id: Uuid,
}

#[derive(Clone, Default)]
pub struct TramitacaoRepository;

impl TramitacaoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_historico<'e, E>(
        &self,
        executor: E,
        novo: &NovoHistorico<'_>,
    ) -> Result<HistoricoTramitacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO historico_tramitacao (
                solicitacao_id, acao, origem, destino, status_anterior, status_novo,
                observacao, ator_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {HISTORICO_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, HistoricoTramitacao>(&sql)
            .bind(novo.solicitacao_id)
            .bind(novo.acao)
            .bind(novo.origem)
            .bind(novo.destino)
            .bind(novo.status_anterior)
            .bind(novo.status_novo)
            .bind(novo.observacao)
            .bind(novo.ator_id)
            .fetch_one(executor)
            .await?;

        Ok(row)
    }

    pub async fn list_by_solicitacao<'e, E>(
        &self,
        executor: E,
        solicitacao_id: Uuid,
    ) -> Result<Vec<HistoricoTramitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {HISTORICO_COLUMNS} FROM historico_tramitacao WHERE solicitacao_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, HistoricoTramitacao>(&sql)
            .bind(solicitacao_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}
