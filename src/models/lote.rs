// src/models/lote.rs

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Chave trimestral do suprimento ordinário, no formato `AAAA-Tn` (ex.: `2026-Q1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Competencia {
    pub ano: i32,
    pub trimestre: u8,
}

impl FromStr for Competencia {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ano, trimestre) = s
            .trim()
            .split_once("-Q")
            .ok_or_else(|| s.to_string())?;

        let ano: i32 = ano.parse().map_err(|_| s.to_string())?;
        let trimestre: u8 = trimestre.parse().map_err(|_| s.to_string())?;

        if !(2000..=2100).contains(&ano) || !(1..=4).contains(&trimestre) {
            return Err(s.to_string());
        }
        Ok(Self { ano, trimestre })
    }
}

impl fmt::Display for Competencia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.ano, self.trimestre)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinhaDistribuicao {
    #[schema(example = "3.3.90.30")]
    pub elemento_despesa: String,
    #[schema(example = "Material de consumo")]
    pub descricao: Option<String>,
    #[schema(example = "1500.00")]
    pub valor: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnidadeLote {
    pub unidade_id: Uuid,
    #[schema(example = "4000.00")]
    pub valor_autorizado: Decimal,
    pub distribuicao: Vec<LinhaDistribuicao>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GerarLotePayload {
    #[schema(example = "2026-Q1")]
    pub competencia: String,

    #[validate(length(min = 1, message = "validation.lote_vazio"))]
    pub unidades: Vec<UnidadeLote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SituacaoUnidadeLote {
    Criada,
    /// Já existia solicitação para (unidade, competência).
    Ignorada,
    /// Distribuição não confere ou a unidade não tem titular apto.
    Rejeitada,
    Falha,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoUnidadeLote {
    pub unidade_id: Uuid,
    pub situacao: SituacaoUnidadeLote,
    pub solicitacao_id: Option<Uuid>,
    pub mensagem: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoLote {
    #[schema(example = "2026-Q1")]
    pub competencia: String,
    pub criadas: usize,
    pub ignoradas: usize,
    pub rejeitadas: usize,
    pub falhas: usize,
    pub unidades: Vec<ResultadoUnidadeLote>,
}

impl ResultadoLote {
    pub fn consolidar(competencia: &Competencia, unidades: Vec<ResultadoUnidadeLote>) -> Self {
        let contar = |s: SituacaoUnidadeLote| unidades.iter().filter(|u| u.situacao == s).count();
        Self {
            competencia: competencia.to_string(),
            criadas: contar(SituacaoUnidadeLote::Criada),
            ignoradas: contar(SituacaoUnidadeLote::Ignorada),
            rejeitadas: contar(SituacaoUnidadeLote::Rejeitada),
            falhas: contar(SituacaoUnidadeLote::Falha),
            unidades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quarter_keys() {
        let c: Competencia = "2026-Q3".parse().unwrap();
        assert_eq!(c, Competencia { ano: 2026, trimestre: 3 });
        assert_eq!(c.to_string(), "2026-Q3");
        assert_eq!(" 2025-Q1 ".parse::<Competencia>().unwrap().trimestre, 1);
    }

    #[test]
    fn rejects_malformed_quarters() {
        for bad in ["2026-Q5", "2026-Q0", "2026Q1", "26-Q1", "2026-T1", "", "abcd-Q2"] {
            assert!(bad.parse::<Competencia>().is_err(), "{bad} deveria falhar");
        }
    }

    #[test]
    fn consolidation_counts_each_outcome() {
        let c: Competencia = "2026-Q1".parse().unwrap();
        let linha = |situacao| ResultadoUnidadeLote {
            unidade_id: Uuid::new_v4(),
            situacao,
            solicitacao_id: None,
            mensagem: None,
        };
        let r = ResultadoLote::consolidar(
            &c,
            vec![
                linha(SituacaoUnidadeLote::Criada),
                linha(SituacaoUnidadeLote::Criada),
                linha(SituacaoUnidadeLote::Ignorada),
                linha(SituacaoUnidadeLote::Falha),
            ],
        );
        assert_eq!((r.criadas, r.ignoradas, r.rejeitadas, r.falhas), (2, 1, 0, 1));
        assert_eq!(r.competencia, "2026-Q1");
    }

    #[test]
    fn batch_unit_serializes_with_camel_case_keys() {
        let unidade = UnidadeLote {
            unidade_id: Uuid::nil(),
            valor_autorizado: Decimal::new(400_050, 2),
            distribuicao: vec![LinhaDistribuicao {
                elemento_despesa: "3.3.90.39".into(),
                descricao: None,
                valor: Decimal::new(400_050, 2),
            }],
        };

        let v = serde_json::to_value(&unidade).unwrap();
        assert_eq!(v["unidadeId"], Uuid::nil().to_string());
        assert_eq!(v["valorAutorizado"].as_f64(), Some(4000.5));
        assert_eq!(v["distribuicao"][0]["elementoDespesa"], "3.3.90.39");

        let lido: UnidadeLote = serde_json::from_value(v).unwrap();
        assert_eq!(lido.valor_autorizado, unidade.valor_autorizado);
    }
}
