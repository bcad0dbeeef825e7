// src/handlers/solicitacoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::solicitacao::{
        AtualizarSolicitacaoPayload, CriarSolicitacaoPayload, FiltroFila, Solicitacao,
        SolicitacaoDetalhe,
    },
};

// POST /api/solicitacoes
#[utoipa::path(
    post,
    path = "/api/solicitacoes",
    tag = "Solicitações",
    request_body = CriarSolicitacaoPayload,
    responses(
        (status = 201, description = "Solicitação criada (RASCUNHO, ou já enviada ao gestor com enviar=true)", body = Solicitacao),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente SUPRIDO cria solicitações")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_solicitacao(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CriarSolicitacaoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let solicitacao = app_state
        .solicitacao_service
        .criar(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(solicitacao)))
}

// GET /api/solicitacoes
#[utoipa::path(
    get,
    path = "/api/solicitacoes",
    tag = "Solicitações",
    responses(
        (status = 200, description = "Fila do usuário (suprido: as próprias; demais papéis: as que estão com o papel)", body = Vec<Solicitacao>)
    ),
    params(
        ("status" = Option<crate::models::tramitacao::StatusSolicitacao>, Query, description = "Filtra por status")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_solicitacoes(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filtro): Query<FiltroFila>,
) -> Result<Json<Vec<Solicitacao>>, ApiError> {
    let lista = app_state
        .solicitacao_service
        .listar_fila(&user.0, &filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(lista))
}

// GET /api/solicitacoes/{id}
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitações",
    responses(
        (status = 200, description = "Detalhe com histórico e ações disponíveis", body = SolicitacaoDetalhe),
        (status = 404, description = "Não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_solicitacao(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SolicitacaoDetalhe>, ApiError> {
    let detalhe = app_state
        .solicitacao_service
        .obter(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detalhe))
}

// PUT /api/solicitacoes/{id}
#[utoipa::path(
    put,
    path = "/api/solicitacoes/{id}",
    tag = "Solicitações",
    request_body = AtualizarSolicitacaoPayload,
    responses(
        (status = 200, description = "Rascunho atualizado", body = Solicitacao),
        (status = 403, description = "Não é o suprido da solicitação"),
        (status = 409, description = "Versão desatualizada"),
        (status = 422, description = "Solicitação fora de edição")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_solicitacao(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarSolicitacaoPayload>,
) -> Result<Json<Solicitacao>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let solicitacao = app_state
        .solicitacao_service
        .atualizar_rascunho(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(solicitacao))
}
