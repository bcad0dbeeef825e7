// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{dashboard::ResumoStatus, tramitacao::Papel},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Fila de um papel (mesmo filtro da listagem)
    pub async fn resumo_por_destino(&self, papel: Papel) -> Result<Vec<ResumoStatus>, AppError> {
        let rows = sqlx::query_as::<_, ResumoStatus>(
            r#"
            SELECT status, COUNT(*) AS quantidade, COALESCE(SUM(valor_solicitado), 0) AS valor_total
            FROM solicitacoes
            WHERE destino_atual = $1
              AND status NOT IN ('EXCLUIDO', 'CANCELADO', 'ARQUIVADO')
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(papel)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn resumo_por_suprido(&self, suprido_id: Uuid) -> Result<Vec<ResumoStatus>, AppError> {
        let rows = sqlx::query_as::<_, ResumoStatus>(
            r#"
            SELECT status, COUNT(*) AS quantidade, COALESCE(SUM(valor_solicitado), 0) AS valor_total
            FROM solicitacoes
            WHERE suprido_id = $1 AND status <> 'EXCLUIDO'
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(suprido_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
