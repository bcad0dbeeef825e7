// src/db/notificacao_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        notificacao::{DestinoNotificacao, Notificacao},
        tramitacao::Papel,
    },
};

#[derive(Clone)]
pub struct NotificacaoRepository {
    pool: PgPool,
}

impl NotificacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        destino: DestinoNotificacao,
        solicitacao_id: Option<Uuid>,
        titulo: &str,
        mensagem: &str,
    ) -> Result<Notificacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (destinatario_id, papel_destino) = match destino {
            DestinoNotificacao::Usuario(id) => (Some(id), None),
            DestinoNotificacao::Fila(papel) => (None, Some(papel)),
        };

        // Recém-criada: ninguém leu ainda
        let row = sqlx::query_as::<_, Notificacao>(
            r#"
            INSERT INTO system_notifications (destinatario_id, papel_destino, solicitacao_id, titulo, mensagem)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, destinatario_id, papel_destino, solicitacao_id, titulo, mensagem,
                      FALSE AS lida, created_at
            "#,
        )
        .bind(destinatario_id)
        .bind(papel_destino)
        .bind(solicitacao_id)
        .bind(titulo)
        .bind(mensagem)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    // Pessoais + as da fila do papel do usuário; `lida` é a leitura deste usuário
    pub async fn list_for(&self, user_id: Uuid, papel: Papel) -> Result<Vec<Notificacao>, AppError> {
        let rows = sqlx::query_as::<_, Notificacao>(
            r#"
            SELECT n.id, n.destinatario_id, n.papel_destino, n.solicitacao_id, n.titulo, n.mensagem,
                   (l.profile_id IS NOT NULL) AS lida, n.created_at
            FROM system_notifications n
            LEFT JOIN notificacoes_lidas l ON l.notificacao_id = n.id AND l.profile_id = $1
            WHERE n.destinatario_id = $1 OR n.papel_destino = $2
            ORDER BY n.created_at DESC
            LIMIT 200
            "#,
        )
        .bind(user_id)
        .bind(papel)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// `false` quando a notificação não existe ou não é endereçada ao usuário.
    /// Marcar de novo o que já foi lido não é erro.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid, papel: Papel) -> Result<bool, AppError> {
        let visivel: bool = sqlx::query_scalar(
            r#"
            WITH alvo AS (
                SELECT id FROM system_notifications
                WHERE id = $1 AND (destinatario_id = $2 OR papel_destino = $3)
            ),
            marcada AS (
                INSERT INTO notificacoes_lidas (notificacao_id, profile_id)
                SELECT id, $2 FROM alvo
                ON CONFLICT DO NOTHING
            )
            SELECT EXISTS (SELECT 1 FROM alvo)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(papel)
        .fetch_one(&self.pool)
        .await?;
        Ok(visivel)
    }

    pub async fn count_unread(&self, user_id: Uuid, papel: Papel) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM system_notifications n
            WHERE (n.destinatario_id = $1 OR n.papel_destino = $2)
              AND NOT EXISTS (
                  SELECT 1 FROM notificacoes_lidas l
                  WHERE l.notificacao_id = n.id AND l.profile_id = $1
              )
            "#,
        )
        .bind(user_id)
        .bind(papel)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
