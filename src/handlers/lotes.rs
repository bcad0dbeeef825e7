// src/handlers/lotes.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PapelSosfu, RequirePapel},
    },
    models::lote::{GerarLotePayload, ResultadoLote},
};

// POST /api/lotes
#[utoipa::path(
    post,
    path = "/api/lotes",
    tag = "Lotes",
    request_body = GerarLotePayload,
    responses(
        (status = 200, description = "Resultado por unidade (criada, ignorada, rejeitada ou falha)", body = ResultadoLote),
        (status = 400, description = "Competência inválida ou lote vazio"),
        (status = 403, description = "Apenas SOSFU gera lotes")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_lote(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePapel<PapelSosfu>,
    Json(payload): Json<GerarLotePayload>,
) -> Result<Json<ResultadoLote>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let resultado = app_state
        .lote_service
        .gerar_lote(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resultado))
}
