// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::Profile, tramitacao::Papel},
};

const PROFILE_COLUMNS: &str = r#"
    id, email, password_hash, nome, matricula, cargo, papel,
    signature_pin_hash, created_at, updated_at
"#;

// O repositório de perfis, responsável por todas as interações com a tabela 'profiles'
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um perfil pelo e-mail (sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE lower(email) = lower($1)");
        let maybe_profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_profile)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let maybe_profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(maybe_profile)
    }

    // Cria um novo perfil (sempre como SUPRIDO)
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        nome: &str,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO profiles (email, password_hash, nome)
            VALUES ($1, $2, $3)
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(nome)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return match db_err.constraint() {
                            Some("profiles_email_key") | None => AppError::EmailAlreadyExists,
                            Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                        };
                    }
                }
                e.into()
            })?;

        Ok(profile)
    }

    pub async fn set_signature_pin(&self, id: Uuid, pin_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE profiles SET signature_pin_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(pin_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn update_papel(&self, id: Uuid, papel: Papel) -> Result<Profile, AppError> {
        let sql = format!(
            "UPDATE profiles SET papel = $1, updated_at = NOW() WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(papel)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    // Titular (ordinário ou júri) de alguma unidade
    pub async fn is_titular<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let titular: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM unidades WHERE titular_ordinario_id = $1 OR titular_juri_id = $1)",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(titular)
    }

    /// Job de mesclagem: copia nome, matrícula e cargo da base de RH para os perfis
    /// cujo e-mail coincide com exatamente um registro. Devolve quantos perfis mudaram.
    pub async fn merge_from_servidores<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            WITH unicos AS (
                SELECT lower(email) AS email_chave, nome, matricula, cargo
                FROM (
                    SELECT email, nome, matricula, cargo,
                           COUNT(*) OVER (PARTITION BY lower(email)) AS ocorrencias
                    FROM servidores_tj
                    WHERE email IS NOT NULL
                ) s
                WHERE s.ocorrencias = 1
            )
            UPDATE profiles p
            SET nome = u.nome,
                matricula = u.matricula,
                cargo = COALESCE(u.cargo, p.cargo),
                updated_at = NOW()
            FROM unicos u
            WHERE u.email_chave = lower(p.email)
              AND (
                  p.nome IS DISTINCT FROM u.nome
                  OR p.matricula IS DISTINCT FROM u.matricula
                  OR (u.cargo IS NOT NULL AND p.cargo IS DISTINCT FROM u.cargo)
              )
            "#,
        )
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
