// src/db/unidade_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::unidade::{HistoricoTitular, TipoTitularidade, Unidade},
};

const UNIDADE_COLUMNS: &str = r#"
    id, codigo, nome, comarca,
    titular_ordinario_id, portaria_ordinario, data_portaria_ordinario,
    titular_juri_id, portaria_juri, data_portaria_juri,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct UnidadeRepository {
    pool: PgPool,
}

impl UnidadeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, codigo: &str, nome: &str, comarca: &str) -> Result<Unidade, AppError> {
        let sql = format!(
            "INSERT INTO unidades (codigo, nome, comarca) VALUES ($1, $2, $3) RETURNING {UNIDADE_COLUMNS}"
        );
        sqlx::query_as::<_, Unidade>(&sql)
            .bind(codigo)
            .bind(nome)
            .bind(comarca)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation(format!("codigo {}", codigo));
                    }
                }
                e.into()
            })
    }

    pub async fn list_all(&self) -> Result<Vec<Unidade>, AppError> {
        let sql = format!("SELECT {UNIDADE_COLUMNS} FROM unidades ORDER BY comarca, nome");
        let rows = sqlx::query_as::<_, Unidade>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Unidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {UNIDADE_COLUMNS} FROM unidades WHERE id = $1");
        let row = sqlx::query_as::<_, Unidade>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Unidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {UNIDADE_COLUMNS} FROM unidades WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, Unidade>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    // O ponteiro é sobrescrito; o histórico fica em historico_titulares.
    pub async fn set_titular<'e, E>(
        &self,
        executor: E,
        unidade_id: Uuid,
        tipo: TipoTitularidade,
        titular_id: Uuid,
        portaria: &str,
        data_portaria: NaiveDate,
    ) -> Result<Unidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let set_clause = match tipo {
            TipoTitularidade::Ordinario => {
                "titular_ordinario_id = $1, portaria_ordinario = $2, data_portaria_ordinario = $3"
            }
            TipoTitularidade::Juri => "titular_juri_id = $1, portaria_juri = $2, data_portaria_juri = $3",
        };
        let sql = format!(
            "UPDATE unidades SET {set_clause}, updated_at = NOW() WHERE id = $4 RETURNING {UNIDADE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Unidade>(&sql)
            .bind(titular_id)
            .bind(portaria)
            .bind(data_portaria)
            .bind(unidade_id)
            .fetch_one(executor)
            .await?;
        Ok(row)
    }

    pub async fn insert_historico<'e, E>(
        &self,
        executor: E,
        unidade_id: Uuid,
        tipo: TipoTitularidade,
        titular_anterior_id: Option<Uuid>,
        titular_novo_id: Uuid,
        portaria: &str,
        data_portaria: NaiveDate,
        alterado_por: Uuid,
    ) -> Result<HistoricoTitular, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, HistoricoTitular>(
            r#"
            INSERT INTO historico_titulares (
                unidade_id, tipo, titular_anterior_id, titular_novo_id,
                portaria, data_portaria, alterado_por
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(unidade_id)
        .bind(tipo)
        .bind(titular_anterior_id)
        .bind(titular_novo_id)
        .bind(portaria)
        .bind(data_portaria)
        .bind(alterado_por)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_historico(&self, unidade_id: Uuid) -> Result<Vec<HistoricoTitular>, AppError> {
        let rows = sqlx::query_as::<_, HistoricoTitular>(
            "SELECT * FROM historico_titulares WHERE unidade_id = $1 ORDER BY created_at DESC",
        )
        .bind(unidade_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
