use sqlx::{PgPool, Postgres, Transaction};

use crate::common::error::AppError;
use crate::middleware::auth::AuthenticatedUser;

// ---
// Helper de auditoria: abre a transação já "carimbada" com o autor
// ---
/// Inicia uma transação e define `app.user_id` (local à transação),
/// lido pelo trigger que preenche `solicitacoes.updated_by`.
pub(crate) async fn begin_audited(
    pool: &PgPool,
    user: &AuthenticatedUser,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user.0.id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
