// src/handlers/tramitacao.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        solicitacao::Solicitacao,
        tramitacao::{HistoricoTramitacao, TramitarPayload, TransicaoDisponivel},
    },
};

// POST /api/solicitacoes/{id}/tramitar
#[utoipa::path(
    post,
    path = "/api/solicitacoes/{id}/tramitar",
    tag = "Tramitação",
    request_body = TramitarPayload,
    responses(
        (status = 200, description = "Solicitação tramitada (histórico e notificação gravados na mesma transação)", body = Solicitacao),
        (status = 403, description = "Usuário não é o responsável atual"),
        (status = 409, description = "Versão desatualizada"),
        (status = 422, description = "Transição inválida ou regra de negócio violada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn tramitar(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TramitarPayload>,
) -> Result<Json<Solicitacao>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let solicitacao = app_state
        .tramitacao_service
        .tramitar(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(solicitacao))
}

// GET /api/solicitacoes/{id}/transicoes
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}/transicoes",
    tag = "Tramitação",
    responses(
        (status = 200, description = "Ações que o usuário pode executar agora", body = Vec<TransicaoDisponivel>)
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_transicoes(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransicaoDisponivel>>, ApiError> {
    let transicoes = app_state
        .tramitacao_service
        .listar_transicoes(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(transicoes))
}

// GET /api/solicitacoes/{id}/historico
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}/historico",
    tag = "Tramitação",
    responses(
        (status = 200, description = "Trilha de auditoria em ordem cronológica", body = Vec<HistoricoTramitacao>)
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn historico(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoricoTramitacao>>, ApiError> {
    let historico = app_state
        .tramitacao_service
        .historico(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(historico))
}
