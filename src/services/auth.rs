// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::{
        auth::{Claims, Profile},
        tramitacao::Papel,
    },
};

const TOKEN_VALIDADE_DIAS: i64 = 7;

/// Gera o JWT (HS256) de um perfil, válido por 7 dias a partir de `agora`.
pub fn encode_token(secret: &str, profile_id: Uuid, agora: DateTime<Utc>) -> Result<String, AppError> {
    let expires_at = agora + chrono::Duration::days(TOKEN_VALIDADE_DIAS);

    let claims = Claims {
        sub: profile_id,
        exp: expires_at.timestamp() as usize,
        iat: agora.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

/// bcrypt é caro: roda fora do executor assíncrono.
pub(crate) async fn hash_blocking(segredo: &str) -> Result<String, AppError> {
    let segredo = segredo.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&segredo, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_blocking(segredo: &str, hash_armazenado: &str) -> Result<bool, AppError> {
    let segredo = segredo.to_owned();
    let hash_armazenado = hash_armazenado.to_owned();
    let ok = tokio::task::spawn_blocking(move || verify(&segredo, &hash_armazenado))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação: {}", e))??;
    Ok(ok)
}

/// Titular de unidade precisa continuar SUPRIDO enquanto estiver designado.
pub fn validar_troca_de_papel(eh_titular: bool, novo: Papel) -> Result<(), AppError> {
    if eh_titular && novo != Papel::Suprido {
        return Err(AppError::RegraDeNegocio(format!(
            "perfil é titular de unidade e não pode passar a {}",
            novo
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { profile_repo, jwt_secret, pool }
    }

    /// Cria um perfil SUPRIDO e devolve o token de acesso.
    pub async fn register(&self, email: &str, password: &str, nome: &str) -> Result<String, AppError> {
        let hashed_password = hash_blocking(password).await?;

        let profile = self
            .profile_repo
            .create_profile(&self.pool, email.trim(), &hashed_password, nome.trim())
            .await?;

        tracing::info!("👤 Novo perfil registrado: {} ({})", profile.id, profile.papel);

        encode_token(&self.jwt_secret, profile.id, Utc::now())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let profile = self
            .profile_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_blocking(password, &profile.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        encode_token(&self.jwt_secret, profile.id, Utc::now())
    }

    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        self.profile_repo
            .find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Cadastra (ou troca) o PIN de assinatura. O formato já foi validado no payload.
    pub async fn definir_pin(&self, profile_id: Uuid, pin: &str) -> Result<(), AppError> {
        let pin_hash = hash_blocking(pin).await?;
        self.profile_repo.set_signature_pin(profile_id, &pin_hash).await?;
        tracing::info!("🔐 PIN de assinatura atualizado para {}", profile_id);
        Ok(())
    }

    pub async fn alterar_papel(
        &self,
        ator: &Profile,
        profile_id: Uuid,
        papel: Papel,
    ) -> Result<Profile, AppError> {
        let eh_titular = self.profile_repo.is_titular(&self.pool, profile_id).await?;
        validar_troca_de_papel(eh_titular, papel)?;

        let profile = self.profile_repo.update_papel(profile_id, papel).await?;
        tracing::info!("🎖️ Papel de {} alterado para {} por {}", profile_id, papel, ator.id);
        Ok(profile)
    }
}
