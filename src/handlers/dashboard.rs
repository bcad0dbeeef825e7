// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::ResumoFila,
};

// GET /api/dashboard/resumo
#[utoipa::path(
    get,
    path = "/api/dashboard/resumo",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagem por status da fila do papel", body = ResumoFila),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn resumo(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<Json<ResumoFila>, ApiError> {
    let resumo = app_state
        .dashboard_service
        .resumo(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(resumo))
}
