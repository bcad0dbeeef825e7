// src/models/servidor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Registro vindo da base de RH (servidores_tj)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServidorTj {
    pub id: Uuid,
    #[schema(example = "123456")]
    pub matricula: String,
    pub nome: String,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub cargo: Option<String>,
    pub lotacao: Option<String>,
    pub importacao_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Uma execução da importação (versiona quem escreveu cada registro).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportacaoServidores {
    pub id: Uuid,
    #[schema(example = "servidores_2026_02.csv")]
    pub origem: String,
    pub total_linhas: i32,
    pub inseridos: i32,
    pub atualizados: i32,
    pub rejeitados: i32,
    pub executado_por: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Linha da planilha de RH, já normalizada.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinhaServidor {
    pub matricula: String,
    pub nome: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    #[serde(default)]
    pub lotacao: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportacaoQuery {
    #[schema(example = "servidores_2026_02.csv")]
    pub origem: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SincronizacaoPerfis {
    pub perfis_atualizados: u64,
    /// E-mails com mais de um registro de RH; esses perfis não são tocados.
    #[schema(example = json!(["maria.souza@tjpa.jus.br"]))]
    pub emails_ambiguos: Vec<String>,
}
