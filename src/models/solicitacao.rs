// src/models/solicitacao.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    models::tramitacao::{AcaoTramitacao, HistoricoTramitacao, Papel, StatusSolicitacao},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_suprimento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoSuprimento {
    Ordinario,
    ExtraEmergencial,
    Juri,
}

impl TipoSuprimento {
    pub fn label(&self) -> &'static str {
        match self {
            TipoSuprimento::Ordinario => "ORDINÁRIO",
            TipoSuprimento::ExtraEmergencial => "EXTRA-EMERGENCIAL",
            TipoSuprimento::Juri => "JÚRI",
        }
    }
}

/// Maior valor que cabe em NUMERIC(14, 2).
pub fn valor_maximo() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

/// Sem frações de centavo (`10.500` passa, `10.005` não).
pub fn centavos_exatos(valor: &Decimal) -> bool {
    valor.normalize().scale() <= 2
}

fn valor_monetario(valor: &Decimal) -> Result<(), ValidationError> {
    let chave = if *valor <= Decimal::ZERO {
        "validation.valor_positivo"
    } else if !centavos_exatos(valor) {
        "validation.valor_centavos"
    } else if *valor > valor_maximo() {
        "validation.valor_maximo"
    } else {
        return Ok(());
    };
    Err(ValidationError::new("valor").with_message(chave.into()))
}

/// Linha de despesa (guardada em JSONB dentro da solicitação).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDespesa {
    #[validate(length(min = 1, message = "validation.obrigatorio"))]
    #[schema(example = "Material de consumo")]
    pub descricao: String,

    #[schema(example = "3.3.90.30")]
    pub elemento_despesa: Option<String>,

    #[validate(custom(function = "valor_monetario"))]
    #[schema(example = "300.00")]
    pub valor: Decimal,
}

pub fn total_itens(itens: &[ItemDespesa]) -> Decimal {
    itens.iter().map(|i| i.valor).sum()
}

/// Soma dos itens, recusada se não couber na coluna do valor solicitado.
pub fn total_dentro_do_limite(itens: &[ItemDespesa]) -> Result<Decimal, AppError> {
    let total = itens
        .iter()
        .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.valor))
        .filter(|t| *t <= valor_maximo())
        .ok_or_else(|| AppError::RegraDeNegocio("soma dos itens excede o valor máximo permitido".into()))?;
    Ok(total)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Solicitacao {
    pub id: Uuid,
    #[schema(example = "TJPA-SF-2026-000042")]
    pub nup: String,
    pub tipo: TipoSuprimento,
    pub status: StatusSolicitacao,
    pub destino_atual: Papel,
    pub suprido_id: Uuid,
    pub unidade_id: Option<Uuid>,
    #[schema(example = "2026-Q1")]
    pub competencia: Option<String>,
    pub descricao: String,
    #[schema(example = "450.00")]
    pub valor_solicitado: Decimal,
    pub valor_concedido: Option<Decimal>,
    pub numero_portaria: Option<String>,
    #[schema(value_type = Vec<ItemDespesa>)]
    pub itens: Json<Vec<ItemDespesa>>,
    #[schema(example = json!({"participantes": {"jurados": 25, "servidores": 6}}))]
    pub dados_extras: Value,
    #[schema(example = 1)]
    pub versao: i32,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolicitacaoDetalhe {
    #[serde(flatten)]
    pub solicitacao: Solicitacao,
    pub historico: Vec<HistoricoTramitacao>,
    pub acoes_disponiveis: Vec<AcaoTramitacao>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarSolicitacaoPayload {
    #[schema(example = "EXTRA_EMERGENCIAL")]
    pub tipo: TipoSuprimento,

    #[validate(length(min = 1, max = 4000, message = "validation.obrigatorio"))]
    #[schema(example = "Aquisição emergencial de material para a sessão do júri")]
    pub descricao: String,

    pub unidade_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub itens: Vec<ItemDespesa>,

    pub dados_extras: Option<Value>,

    /// Se verdadeiro, a solicitação já nasce enviada ao gestor.
    #[serde(default)]
    pub enviar: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarSolicitacaoPayload {
    #[validate(length(min = 1, max = 4000, message = "validation.obrigatorio"))]
    pub descricao: Option<String>,

    #[validate(nested)]
    pub itens: Option<Vec<ItemDespesa>>,

    pub dados_extras: Option<Value>,

    pub versao_esperada: Option<i32>,

    #[serde(default)]
    pub enviar: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FiltroFila {
    pub status: Option<StatusSolicitacao>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn item(valor: &str) -> ItemDespesa {
        ItemDespesa {
            descricao: "Despesa".into(),
            elemento_despesa: None,
            valor: Decimal::from_str(valor).unwrap(),
        }
    }

    #[test]
    fn total_sums_every_line() {
        let itens = vec![item("300.00"), item("150.00")];
        assert_eq!(total_itens(&itens), Decimal::from_str("450.00").unwrap());
        assert_eq!(total_itens(&[]), Decimal::ZERO);
    }

    #[test]
    fn nested_items_must_be_positive() {
        let payload = CriarSolicitacaoPayload {
            tipo: TipoSuprimento::Juri,
            descricao: "Sessão do júri".into(),
            unidade_id: None,
            itens: vec![item("10.00"), item("0")],
            dados_extras: None,
            enviar: false,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn payload_reads_screaming_enum_and_camel_case() {
        let payload: CriarSolicitacaoPayload = serde_json::from_value(json!({
            "tipo": "EXTRA_EMERGENCIAL",
            "descricao": "Conserto",
            "itens": [{"descricao": "Serviço", "elementoDespesa": "3.3.90.39", "valor": 120.5}],
            "enviar": true
        }))
        .unwrap();
        assert_eq!(payload.tipo, TipoSuprimento::ExtraEmergencial);
        assert_eq!(payload.itens[0].elemento_despesa.as_deref(), Some("3.3.90.39"));
        assert!(payload.enviar);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn item_value_must_fit_the_money_column() {
        let com_fracao = ItemDespesa { valor: Decimal::from_str("10.005").unwrap(), ..item("1") };
        assert!(com_fracao.validate().is_err());

        let zeros_a_direita = ItemDespesa { valor: Decimal::from_str("10.500").unwrap(), ..item("1") };
        assert!(zeros_a_direita.validate().is_ok());

        let grande = ItemDespesa { valor: Decimal::from_str("1000000000000.00").unwrap(), ..item("1") };
        assert!(grande.validate().is_err());
        assert!(ItemDespesa { valor: valor_maximo(), ..item("1") }.validate().is_ok());
    }

    #[test]
    fn total_over_the_limit_is_a_business_error() {
        let itens = vec![
            ItemDespesa { valor: valor_maximo(), ..item("1") },
            item("0.01"),
        ];
        assert!(matches!(total_dentro_do_limite(&itens), Err(AppError::RegraDeNegocio(_))));
        assert_eq!(
            total_dentro_do_limite(&[item("300.00"), item("150.00")]).unwrap(),
            Decimal::from_str("450.00").unwrap()
        );
    }
}
