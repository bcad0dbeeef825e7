// src/db/solicitacao_repo.rs

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        solicitacao::{ItemDespesa, Solicitacao, TipoSuprimento},
        tramitacao::{Papel, PlanoTransicao, StatusSolicitacao},
    },
};

const SOLICITACAO_COLUMNS: &str = r#"
    id, nup, tipo, status, destino_atual, suprido_id, unidade_id, competencia,
    descricao, valor_solicitado, valor_concedido, numero_portaria, itens,
    dados_extras, versao, updated_by, created_at, updated_at
"#;

/// Dados de uma solicitação ainda não gravada.
#[derive(Debug, Clone)]
pub struct NovaSolicitacao<'a> {
    pub tipo: TipoSuprimento,
    pub status: StatusSolicitacao,
    pub destino_atual: Papel,
    pub suprido_id: Uuid,
    pub unidade_id: Option<Uuid>,
    pub competencia: Option<&'a str>,
    pub descricao: &'a str,
    pub itens: &'a [ItemDespesa],
    pub valor_solicitado: Decimal,
    pub dados_extras: &'a Value,
}

#[derive(Clone)]
pub struct SolicitacaoRepository {
    pool: PgPool,
}

impl SolicitacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// NUP no formato TJPA-SF-AAAA-NNNNNN, a partir da sequence do banco.
    pub async fn next_nup<'e, E>(&self, executor: E) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let nup: String = sqlx::query_scalar(
            r#"
            SELECT 'TJPA-SF-' || to_char(NOW(), 'YYYY') || '-'
                || lpad(nextval('solicitacoes_nup_seq')::text, 6, '0')
            "#,
        )
        .fetch_one(executor)
        .await?;

        Ok(nup)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        nup: &str,
        nova: &NovaSolicitacao<'_>,
    ) -> Result<Solicitacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO solicitacoes (
                nup, tipo, status, destino_atual, suprido_id, unidade_id,
                competencia, descricao, itens, valor_solicitado, dados_extras
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SOLICITACAO_COLUMNS}
            "#
        );

        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(nup)
            .bind(nova.tipo)
            .bind(nova.status)
            .bind(nova.destino_atual)
            .bind(nova.suprido_id)
            .bind(nova.unidade_id)
            .bind(nova.competencia)
            .bind(nova.descricao)
            .bind(Json(nova.itens))
            .bind(nova.valor_solicitado)
            .bind(nova.dados_extras)
            .fetch_one(executor)
            .await?;

        Ok(solicitacao)
    }

    /// Inserção idempotente do lote: a chave (unidade_id, competencia) é única.
    /// `None` quando a unidade já tem solicitação para a competência.
    pub async fn insert_lote_if_absent<'e, E>(
        &self,
        executor: E,
        nup: &str,
        nova: &NovaSolicitacao<'_>,
    ) -> Result<Option<Solicitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO solicitacoes (
                nup, tipo, status, destino_atual, suprido_id, unidade_id,
                competencia, descricao, itens, valor_solicitado, dados_extras
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (unidade_id, competencia) WHERE competencia IS NOT NULL
            DO NOTHING
            RETURNING {SOLICITACAO_COLUMNS}
            "#
        );

        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(nup)
            .bind(nova.tipo)
            .bind(nova.status)
            .bind(nova.destino_atual)
            .bind(nova.suprido_id)
            .bind(nova.unidade_id)
            .bind(nova.competencia)
            .bind(nova.descricao)
            .bind(Json(nova.itens))
            .bind(nova.valor_solicitado)
            .bind(nova.dados_extras)
            .fetch_optional(executor)
            .await?;

        Ok(solicitacao)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Solicitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SOLICITACAO_COLUMNS} FROM solicitacoes WHERE id = $1");
        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(solicitacao)
    }

    /// Trava a linha até o fim da transação: dois revisores não tramitam ao mesmo tempo.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Solicitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SOLICITACAO_COLUMNS} FROM solicitacoes WHERE id = $1 FOR UPDATE");
        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(solicitacao)
    }

    pub async fn list_by_suprido(
        &self,
        suprido_id: Uuid,
        status: Option<StatusSolicitacao>,
    ) -> Result<Vec<Solicitacao>, AppError> {
        let sql = format!(
            r#"
            SELECT {SOLICITACAO_COLUMNS} FROM solicitacoes
            WHERE suprido_id = $1
              AND status <> 'EXCLUIDO'
              AND ($2::status_solicitacao IS NULL OR status = $2)
            ORDER BY updated_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(suprido_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// A fila de um papel: tudo cujo dono atual é esse papel.
    pub async fn list_by_destino(
        &self,
        papel: Papel,
        status: Option<StatusSolicitacao>,
    ) -> Result<Vec<Solicitacao>, AppError> {
        let sql = format!(
            r#"
            SELECT {SOLICITACAO_COLUMNS} FROM solicitacoes
            WHERE destino_atual = $1
              AND status NOT IN ('EXCLUIDO', 'CANCELADO', 'ARQUIVADO')
              AND ($2::status_solicitacao IS NULL OR status = $2)
            ORDER BY updated_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(papel)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // =========================================================================
    //  ESCRITA (sempre condicionada à versão lida)
    // =========================================================================

    pub async fn update_conteudo<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        versao_lida: i32,
        descricao: &str,
        itens: &[ItemDespesa],
        valor_solicitado: Decimal,
        dados_extras: &Value,
    ) -> Result<Option<Solicitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE solicitacoes
            SET descricao = $1, itens = $2, valor_solicitado = $3, dados_extras = $4,
                versao = versao + 1
            WHERE id = $5 AND versao = $6
            RETURNING {SOLICITACAO_COLUMNS}
            "#
        );
        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(descricao)
            .bind(Json(itens))
            .bind(valor_solicitado)
            .bind(dados_extras)
            .bind(id)
            .bind(versao_lida)
            .fetch_optional(executor)
            .await?;
        Ok(solicitacao)
    }

    pub async fn apply_transition<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        versao_lida: i32,
        plano: &PlanoTransicao,
    ) -> Result<Option<Solicitacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE solicitacoes
            SET status = $1,
                destino_atual = $2,
                numero_portaria = COALESCE($3, numero_portaria),
                valor_concedido = COALESCE($4, valor_concedido),
                versao = versao + 1
            WHERE id = $5 AND versao = $6
            RETURNING {SOLICITACAO_COLUMNS}
            "#
        );
        let solicitacao = sqlx::query_as::<_, Solicitacao>(&sql)
            .bind(plano.status_novo)
            .bind(plano.destino)
            .bind(plano.numero_portaria.as_deref())
            .bind(plano.valor_concedido)
            .bind(id)
            .bind(versao_lida)
            .fetch_optional(executor)
            .await?;
        Ok(solicitacao)
    }
}
