// src/models/tramitacao.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

/// Papel organizacional: quem "segura" a solicitação em cada momento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "papel", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Papel {
    Suprido,
    Gestor,
    Sefin,
    Sosfu,
    Ajsefin,
}

impl Papel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Papel::Suprido => "SUPRIDO",
            Papel::Gestor => "GESTOR",
            Papel::Sefin => "SEFIN",
            Papel::Sosfu => "SOSFU",
            Papel::Ajsefin => "AJSEFIN",
        }
    }
}

impl fmt::Display for Papel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_solicitacao", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusSolicitacao {
    Rascunho,
    PendenteAtesto,
    Devolvido,
    Aprovado,
    AguardandoAutorizacao,
    Concedido,
    AguardandoConfirmacaoSuprido,
    PrestandoContas,
    PcEmAnalise,
    Atestado,
    Arquivado,
    Cancelado,
    Excluido,
}

impl StatusSolicitacao {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusSolicitacao::Rascunho => "RASCUNHO",
            StatusSolicitacao::PendenteAtesto => "PENDENTE_ATESTO",
            StatusSolicitacao::Devolvido => "DEVOLVIDO",
            StatusSolicitacao::Aprovado => "APROVADO",
            StatusSolicitacao::AguardandoAutorizacao => "AGUARDANDO_AUTORIZACAO",
            StatusSolicitacao::Concedido => "CONCEDIDO",
            StatusSolicitacao::AguardandoConfirmacaoSuprido => "AGUARDANDO_CONFIRMACAO_SUPRIDO",
            StatusSolicitacao::PrestandoContas => "PRESTANDO_CONTAS",
            StatusSolicitacao::PcEmAnalise => "PC_EM_ANALISE",
            StatusSolicitacao::Atestado => "ATESTADO",
            StatusSolicitacao::Arquivado => "ARQUIVADO",
            StatusSolicitacao::Cancelado => "CANCELADO",
            StatusSolicitacao::Excluido => "EXCLUIDO",
        }
    }

    /// Rótulo usado nos documentos gerados.
    pub fn label(&self) -> &'static str {
        match self {
            StatusSolicitacao::Rascunho => "RASCUNHO",
            StatusSolicitacao::PendenteAtesto => "PENDENTE ATESTO",
            StatusSolicitacao::Devolvido => "DEVOLVIDO",
            StatusSolicitacao::Aprovado => "APROVADO",
            StatusSolicitacao::AguardandoAutorizacao => "AGUARDANDO AUTORIZAÇÃO",
            StatusSolicitacao::Concedido => "CONCEDIDO",
            StatusSolicitacao::AguardandoConfirmacaoSuprido => "AGUARDANDO CONFIRMAÇÃO DO SUPRIDO",
            StatusSolicitacao::PrestandoContas => "PRESTANDO CONTAS",
            StatusSolicitacao::PcEmAnalise => "PRESTAÇÃO DE CONTAS EM ANÁLISE",
            StatusSolicitacao::Atestado => "ATESTADO",
            StatusSolicitacao::Arquivado => "ARQUIVADO",
            StatusSolicitacao::Cancelado => "CANCELADO",
            StatusSolicitacao::Excluido => "EXCLUÍDO",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatusSolicitacao::Arquivado | StatusSolicitacao::Cancelado | StatusSolicitacao::Excluido
        )
    }
}

impl fmt::Display for StatusSolicitacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "acao_tramitacao", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcaoTramitacao {
    Submeter,
    Aprovar,
    Devolver,
    EncaminharSefin,
    Conceder,
    Reencaminhar,
    LiberarRecurso,
    ConfirmarRecebimento,
    EnviarPrestacao,
    AtestarPrestacao,
    Arquivar,
    Cancelar,
    Excluir,
    // Registrada apenas pelo gerador de lotes
    GerarLote,
}

impl AcaoTramitacao {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcaoTramitacao::Submeter => "SUBMETER",
            AcaoTramitacao::Aprovar => "APROVAR",
            AcaoTramitacao::Devolver => "DEVOLVER",
            AcaoTramitacao::EncaminharSefin => "ENCAMINHAR_SEFIN",
            AcaoTramitacao::Conceder => "CONCEDER",
            AcaoTramitacao::Reencaminhar => "REENCAMINHAR",
            AcaoTramitacao::LiberarRecurso => "LIBERAR_RECURSO",
            AcaoTramitacao::ConfirmarRecebimento => "CONFIRMAR_RECEBIMENTO",
            AcaoTramitacao::EnviarPrestacao => "ENVIAR_PRESTACAO",
            AcaoTramitacao::AtestarPrestacao => "ATESTAR_PRESTACAO",
            AcaoTramitacao::Arquivar => "ARQUIVAR",
            AcaoTramitacao::Cancelar => "CANCELAR",
            AcaoTramitacao::Excluir => "EXCLUIR",
            AcaoTramitacao::GerarLote => "GERAR_LOTE",
        }
    }
}

impl fmt::Display for AcaoTramitacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Histórico (somente inserção) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricoTramitacao {
    pub id: Uuid,
    pub solicitacao_id: Uuid,
    pub acao: AcaoTramitacao,
    pub origem: Papel,
    pub destino: Papel,
    pub status_anterior: Option<StatusSolicitacao>,
    pub status_novo: StatusSolicitacao,
    #[schema(example = "Falta o comprovante de lotação.")]
    pub observacao: Option<String>,
    pub ator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// O resultado de validar uma ação contra a tabela de transições:
/// tudo o que precisa ser gravado, antes de tocar no banco.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanoTransicao {
    pub acao: AcaoTramitacao,
    pub origem: Papel,
    pub destino: Papel,
    pub status_anterior: StatusSolicitacao,
    pub status_novo: StatusSolicitacao,
    pub observacao: Option<String>,
    pub numero_portaria: Option<String>,
    pub valor_concedido: Option<Decimal>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TramitarPayload {
    #[schema(example = "APROVAR")]
    pub acao: AcaoTramitacao,

    #[validate(length(max = 2000, message = "validation.observacao_longa"))]
    pub observacao: Option<String>,

    #[validate(length(min = 1, max = 60, message = "validation.portaria"))]
    #[schema(example = "1234/2026-GP")]
    pub numero_portaria: Option<String>,

    #[schema(example = "450.00")]
    pub valor_concedido: Option<Decimal>,

    /// Token de concorrência otimista: a versão que o cliente viu.
    #[schema(example = 3)]
    pub versao_esperada: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransicaoDisponivel {
    pub acao: AcaoTramitacao,
    pub status_novo: StatusSolicitacao,
    pub destino: Papel,
}
