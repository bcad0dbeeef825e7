// src/db/documento_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_trigger_error, AppError},
    models::documento::{Documento, TipoDocumento},
};

const DOCUMENTO_COLUMNS: &str = r#"
    id, solicitacao_id, tipo, nome, status, conteudo, created_by, content_hash,
    assinatura, assinado_por, assinante_nome, assinante_cargo, assinado_em,
    created_at, updated_at
"#;

/// Campos gravados no ato da assinatura.
#[derive(Debug, Clone)]
pub struct DadosAssinatura<'a> {
    pub content_hash: &'a str,
    pub assinatura: &'a str,
    pub assinado_por: Uuid,
    pub assinante_nome: &'a str,
    pub assinante_cargo: Option<&'a str>,
    pub assinado_em: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct DocumentoRepository;

impl DocumentoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        solicitacao_id: Uuid,
        tipo: TipoDocumento,
        nome: &str,
        conteudo: &str,
        created_by: Uuid,
    ) -> Result<Documento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO documentos (solicitacao_id, tipo, nome, conteudo, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {DOCUMENTO_COLUMNS}
            "#
        );
        let doc = sqlx::query_as::<_, Documento>(&sql)
            .bind(solicitacao_id)
            .bind(tipo)
            .bind(nome)
            .bind(conteudo)
            .bind(created_by)
            .fetch_one(executor)
            .await?;
        Ok(doc)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {DOCUMENTO_COLUMNS} FROM documentos WHERE id = $1");
        let doc = sqlx::query_as::<_, Documento>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(doc)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {DOCUMENTO_COLUMNS} FROM documentos WHERE id = $1 FOR UPDATE");
        let doc = sqlx::query_as::<_, Documento>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(doc)
    }

    pub async fn list_by_solicitacao<'e, E>(
        &self,
        executor: E,
        solicitacao_id: Uuid,
    ) -> Result<Vec<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {DOCUMENTO_COLUMNS} FROM documentos WHERE solicitacao_id = $1 ORDER BY created_at ASC"
        );
        let docs = sqlx::query_as::<_, Documento>(&sql)
            .bind(solicitacao_id)
            .fetch_all(executor)
            .await?;
        Ok(docs)
    }

    // Só minutas podem mudar; o trigger do banco garante o mesmo para assinados.
    pub async fn update_minuta<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        nome: Option<&str>,
        conteudo: Option<&str>,
    ) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE documentos
            SET nome = COALESCE($1, nome), conteudo = COALESCE($2, conteudo)
            WHERE id = $3 AND status = 'MINUTA'
            RETURNING {DOCUMENTO_COLUMNS}
            "#
        );
        let doc = sqlx::query_as::<_, Documento>(&sql)
            .bind(nome)
            .bind(conteudo)
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(map_trigger_error)?;
        Ok(doc)
    }

    pub async fn delete_minuta<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM documentos WHERE id = $1 AND status = 'MINUTA'")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_trigger_error)?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_signed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        dados: &DadosAssinatura<'_>,
    ) -> Result<Option<Documento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE documentos
            SET status = 'ASSINADO',
                content_hash = $1,
                assinatura = $2,
                assinado_por = $3,
                assinante_nome = $4,
                assinante_cargo = $5,
                assinado_em = $6
            WHERE id = $7 AND status = 'MINUTA'
            RETURNING {DOCUMENTO_COLUMNS}
            "#
        );
        let doc = sqlx::query_as::<_, Documento>(&sql)
            .bind(dados.content_hash)
            .bind(dados.assinatura)
            .bind(dados.assinado_por)
            .bind(dados.assinante_nome)
            .bind(dados.assinante_cargo)
            .bind(dados.assinado_em)
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(map_trigger_error)?;
        Ok(doc)
    }
}
