// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Código SQLSTATE levantado pelo trigger de documentos assinados
pub const SQLSTATE_DOCUMENTO_ASSINADO: &str = "P0002";

// Erros de domínio e de infraestrutura, todos convertidos em ApiError na borda HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Papel {exigido} exigido")]
    PapelNaoAutorizado { exigido: String },

    #[error("Usuário não é o responsável atual pela solicitação")]
    NaoEhResponsavel,

    #[error("Transição inválida: {acao} a partir de ({status}, {destino})")]
    TransicaoInvalida {
        status: String,
        destino: String,
        acao: String,
    },

    #[error("Conflito de versão: esperada {esperada}, atual {atual}")]
    ConflitoDeVersao { esperada: i32, atual: i32 },

    #[error("Regra de negócio violada: {0}")]
    RegraDeNegocio(String),

    #[error("Documento assinado não pode ser alterado")]
    DocumentoAssinado,

    #[error("PIN de assinatura não cadastrado")]
    PinNaoDefinido,

    #[error("PIN de assinatura incorreto")]
    PinIncorreto,

    #[error("Competência inválida: {0}")]
    CompetenciaInvalida(String),

    #[error("Arquivo CSV inválido: {0}")]
    CsvInvalido(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente vai para o cliente, já traduzido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP + chave de mensagem + argumentos da mensagem.
    fn classify(&self) -> (StatusCode, &'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation", vec![]),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_already_exists", vec![]),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials", vec![]),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token", vec![]),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found", vec![]),
            AppError::ResourceNotFound(resource) => (
                StatusCode::NOT_FOUND,
                "error.resource_not_found",
                vec![("resource", resource.clone())],
            ),
            AppError::PapelNaoAutorizado { exigido } => (
                StatusCode::FORBIDDEN,
                "error.papel_nao_autorizado",
                vec![("papel", exigido.clone())],
            ),
            AppError::NaoEhResponsavel => (StatusCode::FORBIDDEN, "error.nao_eh_responsavel", vec![]),
            AppError::TransicaoInvalida { status, destino, acao } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "error.transicao_invalida",
                vec![
                    ("status", status.clone()),
                    ("destino", destino.clone()),
                    ("acao", acao.clone()),
                ],
            ),
            AppError::ConflitoDeVersao { esperada, atual } => (
                StatusCode::CONFLICT,
                "error.conflito_versao",
                vec![("esperada", esperada.to_string()), ("atual", atual.to_string())],
            ),
            AppError::RegraDeNegocio(motivo) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "error.regra_negocio",
                vec![("motivo", motivo.clone())],
            ),
            AppError::DocumentoAssinado => (StatusCode::CONFLICT, "error.documento_assinado", vec![]),
            AppError::PinNaoDefinido => (StatusCode::UNPROCESSABLE_ENTITY, "error.pin_nao_definido", vec![]),
            AppError::PinIncorreto => (StatusCode::UNAUTHORIZED, "error.pin_incorreto", vec![]),
            AppError::CompetenciaInvalida(valor) => (
                StatusCode::BAD_REQUEST,
                "error.competencia_invalida",
                vec![("valor", valor.clone())],
            ),
            AppError::CsvInvalido(motivo) => (
                StatusCode::BAD_REQUEST,
                "error.csv_invalido",
                vec![("motivo", motivo.clone())],
            ),
            AppError::UniqueConstraintViolation(what) => (
                StatusCode::CONFLICT,
                "error.unique_violation",
                vec![("campo", what.clone())],
            ),
            // Todos os outros erros (DatabaseError, InternalServerError, ...) viram 500.
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal", vec![]),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key, args) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let error = i18n.translate(&locale.0, key, &args);

        // Validação devolve todos os campos com problema
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let msg_key = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("validation.{}", e.code));
                            Value::String(i18n.translate(&locale.0, &msg_key, &[]))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

/// Traduz erros do Postgres levantados pelos triggers de imutabilidade.
pub fn map_trigger_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(SQLSTATE_DOCUMENTO_ASSINADO) {
            return AppError::DocumentoAssinado;
        }
    }
    e.into()
}
