// src/handlers/servidores.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PapelSosfu, RequirePapel},
    },
    models::servidor::{ImportacaoQuery, ImportacaoServidores, SincronizacaoPerfis},
};

const ORIGEM_PADRAO: &str = "upload.csv";

// POST /api/servidores/importacoes
#[utoipa::path(
    post,
    path = "/api/servidores/importacoes",
    tag = "Servidores",
    request_body(content = String, content_type = "text/csv", description = "Planilha de RH (; ou ,)"),
    responses(
        (status = 201, description = "Importação registrada com linhas aceitas e rejeitadas", body = ImportacaoServidores),
        (status = 400, description = "Cabeçalho ausente ou arquivo ilegível")
    ),
    params(
        ("origem" = Option<String>, Query, description = "Nome do arquivo de origem")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar_servidores(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePapel<PapelSosfu>,
    Query(query): Query<ImportacaoQuery>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let origem = query.origem.as_deref().unwrap_or(ORIGEM_PADRAO);

    let importacao = app_state
        .servidor_service
        .importar(&user, origem, &body)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(importacao)))
}

// GET /api/servidores/importacoes
#[utoipa::path(
    get,
    path = "/api/servidores/importacoes",
    tag = "Servidores",
    responses(
        (status = 200, description = "Execuções de importação, mais recentes primeiro", body = Vec<ImportacaoServidores>)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_importacoes(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePapel<PapelSosfu>,
) -> Result<Json<Vec<ImportacaoServidores>>, ApiError> {
    let importacoes = app_state
        .servidor_service
        .listar_importacoes()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(importacoes))
}

// POST /api/servidores/sincronizar
#[utoipa::path(
    post,
    path = "/api/servidores/sincronizar",
    tag = "Servidores",
    responses(
        (status = 200, description = "Perfis vinculados à base de servidores", body = SincronizacaoPerfis)
    ),
    security(("api_jwt" = []))
)]
pub async fn sincronizar_perfis(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePapel<PapelSosfu>,
) -> Result<Json<SincronizacaoPerfis>, ApiError> {
    let resultado = app_state
        .servidor_service
        .sincronizar_perfis(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resultado))
}
