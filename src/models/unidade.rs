// src/models/unidade.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_titularidade", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoTitularidade {
    Ordinario,
    Juri,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unidade {
    pub id: Uuid,
    #[schema(example = "0042")]
    pub codigo: String,
    #[schema(example = "Vara Única de Salinópolis")]
    pub nome: String,
    #[schema(example = "Salinópolis")]
    pub comarca: String,

    pub titular_ordinario_id: Option<Uuid>,
    pub portaria_ordinario: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_portaria_ordinario: Option<NaiveDate>,

    pub titular_juri_id: Option<Uuid>,
    pub portaria_juri: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_portaria_juri: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoTitular {
    pub id: Uuid,
    pub unidade_id: Uuid,
    pub tipo: TipoTitularidade,
    pub titular_anterior_id: Option<Uuid>,
    pub titular_novo_id: Uuid,
    pub portaria: String,
    #[schema(value_type = String, format = Date, example = "2026-02-01")]
    pub data_portaria: NaiveDate,
    pub alterado_por: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarUnidadePayload {
    #[validate(length(min = 1, max = 20, message = "validation.obrigatorio"))]
    pub codigo: String,
    #[validate(length(min = 1, message = "validation.obrigatorio"))]
    pub nome: String,
    #[validate(length(min = 1, message = "validation.obrigatorio"))]
    pub comarca: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignarTitularPayload {
    pub tipo: TipoTitularidade,
    pub titular_id: Uuid,
    #[validate(length(min = 1, max = 60, message = "validation.portaria"))]
    #[schema(example = "312/2026-GP")]
    pub portaria: String,
    #[schema(value_type = String, format = Date, example = "2026-02-01")]
    pub data_portaria: NaiveDate,
}
