// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        DashboardRepository, DocumentoRepository, NotificacaoRepository, ProfileRepository,
        ServidorRepository, SolicitacaoRepository, TramitacaoRepository, UnidadeRepository,
    },
    services::{
        auth::AuthService, dashboard_service::DashboardService,
        documento_service::DocumentoService, lote_service::LoteService,
        notificacao_service::NotificacaoService, servidor_service::ServidorService,
        solicitacao_service::SolicitacaoService, tramitacao_service::TramitacaoService,
        unidade_service::UnidadeService,
    },
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub signature_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub fonts_dir: String,
}

fn obrigatoria(nome: &str) -> anyhow::Result<String> {
    env::var(nome)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} deve ser definida", nome))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", v))?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url: obrigatoria("DATABASE_URL")?,
            jwt_secret: obrigatoria("JWT_SECRET")?,
            signature_secret: obrigatoria("SIGNATURE_SECRET")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_max_connections,
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub solicitacao_service: SolicitacaoService,
    pub tramitacao_service: TramitacaoService,
    pub documento_service: DocumentoService,
    pub lote_service: LoteService,
    pub unidade_service: UnidadeService,
    pub servidor_service: ServidorService,
    pub notificacao_service: NotificacaoService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(config, db_pool)
    }

    /// Monta repositórios e serviços sobre um pool já aberto.
    pub fn from_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        // --- Monta o grafo de dependências ---
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let solicitacao_repo = SolicitacaoRepository::new(db_pool.clone());
        let tramitacao_repo = TramitacaoRepository::new();
        let documento_repo = DocumentoRepository::new();
        let unidade_repo = UnidadeRepository::new(db_pool.clone());
        let servidor_repo = ServidorRepository::new(db_pool.clone());
        let notificacao_repo = NotificacaoRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(profile_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let tramitacao_service = TramitacaoService::new(
            db_pool.clone(),
            solicitacao_repo.clone(),
            tramitacao_repo.clone(),
            notificacao_repo.clone(),
        );
        let solicitacao_service = SolicitacaoService::new(
            db_pool.clone(),
            solicitacao_repo.clone(),
            tramitacao_repo.clone(),
            tramitacao_service.clone(),
        );
        let documento_service = DocumentoService::new(
            db_pool.clone(),
            documento_repo.clone(),
            solicitacao_repo.clone(),
            profile_repo.clone(),
            unidade_repo.clone(),
            config.signature_secret.clone(),
            config.fonts_dir.clone(),
        );
        let lote_service = LoteService::new(
            db_pool.clone(),
            solicitacao_repo,
            tramitacao_repo,
            documento_repo,
            unidade_repo.clone(),
            profile_repo.clone(),
            notificacao_repo.clone(),
        );
        let unidade_service = UnidadeService::new(
            db_pool.clone(),
            unidade_repo,
            profile_repo.clone(),
            notificacao_repo.clone(),
        );
        let servidor_service = ServidorService::new(db_pool.clone(), servidor_repo, profile_repo);
        let notificacao_service = NotificacaoService::new(notificacao_repo.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, notificacao_repo);

        Ok(Self {
            db_pool,
            config,
            i18n_store,
            auth_service,
            solicitacao_service,
            tramitacao_service,
            documento_service,
            lote_service,
            unidade_service,
            servidor_service,
            notificacao_service,
            dashboard_service,
        })
    }
}
