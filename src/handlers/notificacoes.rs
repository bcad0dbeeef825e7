// src/handlers/notificacoes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notificacao::Notificacao,
};

// GET /api/notificacoes
#[utoipa::path(
    get,
    path = "/api/notificacoes",
    tag = "Notificações",
    responses(
        (status = 200, description = "Notificações do usuário e do seu papel", body = Vec<Notificacao>)
    ),
    security(("api_jwt" = []))
)]
pub async fn minhas_notificacoes(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Notificacao>>, ApiError> {
    let notificacoes = app_state
        .notificacao_service
        .minhas(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(notificacoes))
}

// POST /api/notificacoes/{id}/lida
#[utoipa::path(
    post,
    path = "/api/notificacoes/{id}/lida",
    tag = "Notificações",
    responses(
        (status = 204, description = "Notificação marcada como lida"),
        (status = 404, description = "Notificação não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da notificação")
    ),
    security(("api_jwt" = []))
)]
pub async fn marcar_lida(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .notificacao_service
        .marcar_lida(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
