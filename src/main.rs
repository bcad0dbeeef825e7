//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não sobe.
    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;
    let bind_addr = app_state.config.bind_addr.clone();

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/pin", put(handlers::auth::definir_pin))
        .route("/{profile_id}/papel", put(handlers::auth::alterar_papel));

    let solicitacao_routes = Router::new()
        .route(
            "/",
            post(handlers::solicitacoes::criar_solicitacao).get(handlers::solicitacoes::listar_solicitacoes),
        )
        .route(
            "/{id}",
            get(handlers::solicitacoes::obter_solicitacao).put(handlers::solicitacoes::atualizar_solicitacao),
        )
        .route("/{id}/tramitar", post(handlers::tramitacao::tramitar))
        .route("/{id}/transicoes", get(handlers::tramitacao::listar_transicoes))
        .route("/{id}/historico", get(handlers::tramitacao::historico))
        .route(
            "/{id}/documentos",
            post(handlers::documentos::gerar_documento).get(handlers::documentos::listar_documentos),
        );

    let documento_routes = Router::new()
        .route(
            "/{id}",
            put(handlers::documentos::atualizar_documento).delete(handlers::documentos::excluir_documento),
        )
        .route("/{id}/assinar", post(handlers::documentos::assinar_documento))
        .route("/{id}/verificar", get(handlers::documentos::verificar_documento))
        .route("/{id}/pdf", get(handlers::documentos::exportar_pdf));

    let unidade_routes = Router::new()
        .route(
            "/",
            get(handlers::unidades::listar_unidades).post(handlers::unidades::criar_unidade),
        )
        .route("/{id}/titular", put(handlers::unidades::designar_titular))
        .route("/{id}/titulares", get(handlers::unidades::historico_titulares));

    let servidor_routes = Router::new()
        .route(
            "/importacoes",
            post(handlers::servidores::importar_servidores).get(handlers::servidores::listar_importacoes),
        )
        .route("/sincronizar", post(handlers::servidores::sincronizar_perfis));

    let notificacao_routes = Router::new()
        .route("/", get(handlers::notificacoes::minhas_notificacoes))
        .route("/{id}/lida", post(handlers::notificacoes::marcar_lida));

    // Tudo abaixo exige token válido
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/solicitacoes", solicitacao_routes)
        .nest("/documentos", documento_routes)
        .route("/lotes", post(handlers::lotes::gerar_lote))
        .nest("/unidades", unidade_routes)
        .nest("/servidores", servidor_routes)
        .nest("/notificacoes", notificacao_routes)
        .route("/dashboard/resumo", get(handlers::dashboard::resumo))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
