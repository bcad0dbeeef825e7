// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::tramitacao::{Papel, StatusSolicitacao};

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoStatus {
    pub status: StatusSolicitacao,
    #[schema(example = 4)]
    pub quantidade: i64,
    #[schema(example = "1800.00")]
    pub valor_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoFila {
    pub papel: Papel,
    pub por_status: Vec<ResumoStatus>,
    pub total_quantidade: i64,
    pub total_valor: Decimal,
    pub notificacoes_nao_lidas: i64,
}
