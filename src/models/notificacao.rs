// src/models/notificacao.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::tramitacao::Papel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notificacao {
    pub id: Uuid,
    pub destinatario_id: Option<Uuid>,
    pub papel_destino: Option<Papel>,
    pub solicitacao_id: Option<Uuid>,
    #[schema(example = "Solicitação aguardando atesto")]
    pub titulo: String,
    pub mensagem: String,
    /// Lida pelo usuário que consulta (avisos de fila têm leitura individual).
    pub lida: bool,
    pub created_at: DateTime<Utc>,
}

/// Destino de uma notificação: uma pessoa ou a fila de um papel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinoNotificacao {
    Usuario(Uuid),
    Fila(Papel),
}
