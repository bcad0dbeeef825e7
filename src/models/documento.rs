// src/models/documento.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_documento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoDocumento {
    Capa,
    Requerimento,
    Portaria,
    CertidaoAtesto,
    NotaEmpenho,
    Despacho,
}

impl TipoDocumento {
    pub fn titulo(&self) -> &'static str {
        match self {
            TipoDocumento::Capa => "Capa do Processo",
            TipoDocumento::Requerimento => "Requerimento de Suprimento de Fundos",
            TipoDocumento::Portaria => "Portaria de Concessão",
            TipoDocumento::CertidaoAtesto => "Certidão de Atesto",
            TipoDocumento::NotaEmpenho => "Nota de Empenho",
            TipoDocumento::Despacho => "Despacho",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_documento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusDocumento {
    Minuta,
    Assinado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Documento {
    pub id: Uuid,
    pub solicitacao_id: Uuid,
    pub tipo: TipoDocumento,
    #[schema(example = "Requerimento Inicial")]
    pub nome: String,
    pub status: StatusDocumento,
    pub conteudo: String,
    pub created_by: Uuid,

    /// SHA-256 (hex) do conteúdo no momento da assinatura.
    pub content_hash: Option<String>,
    /// Selo HMAC-SHA256 (hex) que vincula assinante, documento e conteúdo.
    pub assinatura: Option<String>,
    pub assinado_por: Option<Uuid>,
    pub assinante_nome: Option<String>,
    pub assinante_cargo: Option<String>,
    pub assinado_em: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GerarDocumentoPayload {
    pub tipo: TipoDocumento,

    #[validate(length(min = 1, max = 200, message = "validation.obrigatorio"))]
    pub nome: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarDocumentoPayload {
    #[validate(length(min = 1, max = 200, message = "validation.obrigatorio"))]
    pub nome: Option<String>,

    #[validate(length(min = 1, message = "validation.obrigatorio"))]
    pub conteudo: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssinarDocumentoPayload {
    #[validate(length(min = 4, max = 6, message = "validation.pin_formato"))]
    #[schema(example = "4821")]
    pub pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificacaoAssinatura {
    pub documento_id: Uuid,
    pub assinado: bool,
    /// Conteúdo atual bate com o hash e o selo confere.
    pub integro: bool,
    pub content_hash: Option<String>,
    pub assinante_nome: Option<String>,
    pub assinado_em: Option<DateTime<Utc>>,
}
