// src/handlers/auth.rs

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
    models::auth::{
        AlterarPapelPayload, AuthResponse, DefinirPinPayload, LoginPayload, Profile, RegisterPayload,
    },
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Perfil criado (papel SUPRIDO)", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .register(&payload.email, &payload.password, &payload.nome)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token de acesso (7 dias)", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil do usuário autenticado", body = Profile),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(profile): AuthenticatedUser) -> Json<Profile> {
    Json(profile)
}

// PUT /api/users/me/pin
#[utoipa::path(
    put,
    path = "/api/users/me/pin",
    tag = "Users",
    request_body = DefinirPinPayload,
    responses(
        (status = 204, description = "PIN de assinatura cadastrado"),
        (status = 400, description = "PIN fora do formato (4 a 6 dígitos)")
    ),
    security(("api_jwt" = []))
)]
pub async fn definir_pin(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<DefinirPinPayload>,
) -> Result<StatusCode, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .definir_pin(user.0.id, &payload.pin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/users/{profile_id}/papel
#[utoipa::path(
    put,
    path = "/api/users/{profile_id}/papel",
    tag = "Users",
    request_body = AlterarPapelPayload,
    responses(
        (status = 200, description = "Papel alterado", body = Profile),
        (status = 403, description = "Somente SOSFU"),
        (status = 404, description = "Perfil não encontrado")
    ),
    params(
        ("profile_id" = Uuid, Path, description = "ID do perfil")
    ),
    security(("api_jwt" = []))
)]
pub async fn alterar_papel(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequirePapel<PapelSosfu>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<AlterarPapelPayload>,
) -> Result<Json<Profile>, ApiError> {
    let profile = app_state
        .auth_service
        .alterar_papel(&user.0, profile_id, payload.papel)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}
