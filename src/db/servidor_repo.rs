// src/db/servidor_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::servidor::{ImportacaoServidores, LinhaServidor},
};

#[derive(Clone)]
pub struct ServidorRepository {
    pool: PgPool,
}

impl ServidorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_importacao<'e, E>(
        &self,
        executor: E,
        origem: &str,
        executado_por: Uuid,
    ) -> Result<ImportacaoServidores, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ImportacaoServidores>(
            r#"
            INSERT INTO servidores_importacoes (origem, executado_por)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(origem)
        .bind(executado_por)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Upsert por matrícula. Devolve `true` quando a linha foi inserida (e não atualizada).
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        linha: &LinhaServidor,
        importacao_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // xmax = 0 só para tuplas recém-inseridas
        let inserido: bool = sqlx::query_scalar(
            r#"
            INSERT INTO servidores_tj (matricula, nome, cpf, email, cargo, lotacao, importacao_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (matricula) DO UPDATE SET
                nome = EXCLUDED.nome,
                cpf = COALESCE(EXCLUDED.cpf, servidores_tj.cpf),
                email = COALESCE(EXCLUDED.email, servidores_tj.email),
                cargo = COALESCE(EXCLUDED.cargo, servidores_tj.cargo),
                lotacao = COALESCE(EXCLUDED.lotacao, servidores_tj.lotacao),
                importacao_id = EXCLUDED.importacao_id,
                updated_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&linha.matricula)
        .bind(&linha.nome)
        .bind(linha.cpf.as_deref())
        .bind(linha.email.as_deref())
        .bind(linha.cargo.as_deref())
        .bind(linha.lotacao.as_deref())
        .bind(importacao_id)
        .fetch_one(executor)
        .await?;
        Ok(inserido)
    }

    pub async fn finalize_importacao<'e, E>(
        &self,
        executor: E,
        importacao_id: Uuid,
        total_linhas: i32,
        inseridos: i32,
        atualizados: i32,
        rejeitados: i32,
    ) -> Result<ImportacaoServidores, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ImportacaoServidores>(
            r#"
            UPDATE servidores_importacoes
            SET total_linhas = $1, inseridos = $2, atualizados = $3, rejeitados = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(total_linhas)
        .bind(inseridos)
        .bind(atualizados)
        .bind(rejeitados)
        .bind(importacao_id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_importacoes(&self) -> Result<Vec<ImportacaoServidores>, AppError> {
        let rows = sqlx::query_as::<_, ImportacaoServidores>(
            "SELECT * FROM servidores_importacoes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // E-mails de perfis que aparecem em mais de um registro de RH
    pub async fn list_emails_ambiguos<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let emails: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT lower(s.email)
            FROM servidores_tj s
            WHERE s.email IS NOT NULL
              AND EXISTS (SELECT 1 FROM profiles p WHERE lower(p.email) = lower(s.email))
            GROUP BY lower(s.email)
            HAVING COUNT(*) > 1
            ORDER BY 1
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(emails)
    }
}
