// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::tramitacao::Papel,
};

/// Papel exigido por uma rota.
pub trait PapelDef: Send + Sync + 'static {
    fn papel() -> Papel;
}

/// Extrator guardião: só deixa passar quem tem o papel `T`.
pub struct RequirePapel<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePapel<T>
where
    T: PapelDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        let exigido = T::papel();
        if user.0.papel != exigido {
            tracing::warn!(
                "Acesso negado a {} (papel {}): exige {}",
                user.0.id,
                user.0.papel,
                exigido
            );
            return Err(AppError::PapelNaoAutorizado {
                exigido: exigido.to_string(),
            }
            .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePapel(PhantomData))
    }
}

// ---
// PAPÉIS (TIPOS)
// ---

pub struct PapelSosfu;
impl PapelDef for PapelSosfu {
    fn papel() -> Papel { Papel::Sosfu }
}
