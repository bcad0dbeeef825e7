// src/handlers/documentos.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::documento::{
        AssinarDocumentoPayload, AtualizarDocumentoPayload, Documento, GerarDocumentoPayload,
        VerificacaoAssinatura,
    },
};

// POST /api/solicitacoes/{id}/documentos
#[utoipa::path(
    post,
    path = "/api/solicitacoes/{id}/documentos",
    tag = "Documentos",
    request_body = GerarDocumentoPayload,
    responses(
        (status = 201, description = "Minuta gerada a partir dos dados da solicitação", body = Documento),
        (status = 404, description = "Solicitação não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(solicitacao_id): Path<Uuid>,
    Json(payload): Json<GerarDocumentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let doc = app_state
        .documento_service
        .gerar(&user.0, solicitacao_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(doc)))
}

// GET /api/solicitacoes/{id}/documentos
#[utoipa::path(
    get,
    path = "/api/solicitacoes/{id}/documentos",
    tag = "Documentos",
    responses(
        (status = 200, description = "Documentos do processo", body = Vec<Documento>)
    ),
    params(
        ("id" = Uuid, Path, description = "ID da solicitação")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_documentos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(solicitacao_id): Path<Uuid>,
) -> Result<Json<Vec<Documento>>, ApiError> {
    let docs = app_state
        .documento_service
        .listar(&user.0, solicitacao_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(docs))
}

// PUT /api/documentos/{id}
#[utoipa::path(
    put,
    path = "/api/documentos/{id}",
    tag = "Documentos",
    request_body = AtualizarDocumentoPayload,
    responses(
        (status = 200, description = "Minuta atualizada", body = Documento),
        (status = 403, description = "Somente o autor edita a minuta"),
        (status = 409, description = "Documento já assinado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarDocumentoPayload>,
) -> Result<Json<Documento>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let doc = app_state
        .documento_service
        .atualizar(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(doc))
}

// DELETE /api/documentos/{id}
#[utoipa::path(
    delete,
    path = "/api/documentos/{id}",
    tag = "Documentos",
    responses(
        (status = 204, description = "Minuta excluída"),
        (status = 409, description = "Documento já assinado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    security(("api_jwt" = []))
)]
pub async fn excluir_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .documento_service
        .excluir(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/documentos/{id}/assinar
#[utoipa::path(
    post,
    path = "/api/documentos/{id}/assinar",
    tag = "Documentos",
    request_body = AssinarDocumentoPayload,
    responses(
        (status = 200, description = "Documento assinado e selado", body = Documento),
        (status = 401, description = "PIN incorreto"),
        (status = 409, description = "Documento já assinado"),
        (status = 422, description = "PIN não cadastrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    security(("api_jwt" = []))
)]
pub async fn assinar_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssinarDocumentoPayload>,
) -> Result<Json<Documento>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let doc = app_state
        .documento_service
        .assinar(&user, id, &payload.pin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(doc))
}

// GET /api/documentos/{id}/verificar
#[utoipa::path(
    get,
    path = "/api/documentos/{id}/verificar",
    tag = "Documentos",
    responses(
        (status = 200, description = "Resultado da conferência de hash e selo", body = VerificacaoAssinatura)
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    security(("api_jwt" = []))
)]
pub async fn verificar_documento(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificacaoAssinatura>, ApiError> {
    let verificacao = app_state
        .documento_service
        .verificar(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(verificacao))
}

// GET /api/documentos/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/documentos/{id}/pdf",
    tag = "Documentos",
    responses(
        (status = 200, description = "PDF do documento", content_type = "application/pdf")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    security(("api_jwt" = []))
)]
pub async fn exportar_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (doc, pdf_bytes) = app_state
        .documento_service
        .exportar_pdf(&user.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"documento_{}.pdf\"", doc.id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
