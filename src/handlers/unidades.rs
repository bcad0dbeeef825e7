// src/handlers/unidades.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PapelSosfu, RequirePapel},
    },
    models::unidade::{CriarUnidadePayload, DesignarTitularPayload, HistoricoTitular, Unidade},
};

// GET /api/unidades
#[utoipa::path(
    get,
    path = "/api/unidades",
    tag = "Unidades",
    responses(
        (status = 200, description = "Unidades com titulares atuais", body = Vec<Unidade>)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_unidades(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Unidade>>, ApiError> {
    let unidades = app_state
        .unidade_service
        .listar()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(unidades))
}

// POST /api/unidades
#[utoipa::path(
    post,
    path = "/api/unidades",
    tag = "Unidades",
    request_body = CriarUnidadePayload,
    responses(
        (status = 201, description = "Unidade cadastrada", body = Unidade),
        (status = 409, description = "Código já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_unidade(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePapel<PapelSosfu>,
    Json(payload): Json<CriarUnidadePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unidade = app_state
        .unidade_service
        .criar(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(unidade)))
}

// PUT /api/unidades/{id}/titular
#[utoipa::path(
    put,
    path = "/api/unidades/{id}/titular",
    tag = "Unidades",
    request_body = DesignarTitularPayload,
    responses(
        (status = 200, description = "Titular designado", body = Unidade),
        (status = 404, description = "Unidade ou servidor não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da unidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn designar_titular(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePapel<PapelSosfu>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DesignarTitularPayload>,
) -> Result<Json<Unidade>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unidade = app_state
        .unidade_service
        .designar_titular(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(unidade))
}

// GET /api/unidades/{id}/titulares
#[utoipa::path(
    get,
    path = "/api/unidades/{id}/titulares",
    tag = "Unidades",
    responses(
        (status = 200, description = "Histórico de titulares", body = Vec<HistoricoTitular>)
    ),
    params(
        ("id" = Uuid, Path, description = "ID da unidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn historico_titulares(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoricoTitular>>, ApiError> {
    let historico = app_state
        .unidade_service
        .historico_titulares(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(historico))
}
