// src/services/lote_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{
        solicitacao_repo::NovaSolicitacao, tramitacao_repo::NovoHistorico, DocumentoRepository,
        NotificacaoRepository, ProfileRepository, SolicitacaoRepository, TramitacaoRepository,
        UnidadeRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::{
        documento::TipoDocumento,
        lote::{
            Competencia, GerarLotePayload, ResultadoLote, ResultadoUnidadeLote,
            SituacaoUnidadeLote, UnidadeLote,
        },
        notificacao::DestinoNotificacao,
        solicitacao::{centavos_exatos, total_itens, valor_maximo, ItemDespesa, TipoSuprimento},
        tramitacao::{AcaoTramitacao, Papel, StatusSolicitacao},
    },
    services::{
        documento_service::{formatar_reais, renderizar_conteudo},
        unidade_service::exigir_titular_suprido,
    },
};

/// Diferença máxima aceita entre a soma da distribuição e o valor autorizado.
pub fn tolerancia() -> Decimal {
    Decimal::new(1, 2)
}

const DOCUMENTOS_DO_LOTE: [TipoDocumento; 3] = [
    TipoDocumento::Capa,
    TipoDocumento::Requerimento,
    TipoDocumento::Portaria,
];

/// Confere a distribuição de uma unidade antes de qualquer escrita.
pub fn validar_distribuicao(unidade: &UnidadeLote) -> Result<(), String> {
    if unidade.valor_autorizado <= Decimal::ZERO {
        return Err("valor autorizado deve ser maior que zero".into());
    }
    if unidade.distribuicao.is_empty() {
        return Err("distribuição sem linhas".into());
    }
    if unidade.valor_autorizado > valor_maximo() || !centavos_exatos(&unidade.valor_autorizado) {
        return Err("valor autorizado fora do formato monetário".into());
    }
    if let Some(linha) = unidade.distribuicao.iter().find(|l| l.valor.is_sign_negative()) {
        return Err(format!("linha {} com valor negativo", linha.elemento_despesa));
    }
    if let Some(linha) = unidade.distribuicao.iter().find(|l| !centavos_exatos(&l.valor)) {
        return Err(format!("linha {} com fração de centavo", linha.elemento_despesa));
    }

    let soma: Decimal = unidade.distribuicao.iter().map(|l| l.valor).sum();
    if (soma - unidade.valor_autorizado).abs() > tolerancia() {
        return Err(format!(
            "soma da distribuição ({}) difere do valor autorizado ({})",
            formatar_reais(soma),
            formatar_reais(unidade.valor_autorizado)
        ));
    }
    Ok(())
}

/// Itens da solicitação e o total que eles somam. O valor autorizado fica só em `dados_extras`.
fn itens_da_distribuicao(unidade: &UnidadeLote) -> (Vec<ItemDespesa>, Decimal) {
    let itens: Vec<ItemDespesa> = unidade
        .distribuicao
        .iter()
        .map(|l| ItemDespesa {
            descricao: l
                .descricao
                .clone()
                .unwrap_or_else(|| format!("Elemento {}", l.elemento_despesa)),
            elemento_despesa: Some(l.elemento_despesa.clone()),
            valor: l.valor,
        })
        .collect();
    let total = total_itens(&itens);
    (itens, total)
}

#[derive(Clone)]
pub struct LoteService {
    pool: PgPool,
    solicitacao_repo: SolicitacaoRepository,
    tramitacao_repo: TramitacaoRepository,
    documento_repo: DocumentoRepository,
    unidade_repo: UnidadeRepository,
    profile_repo: ProfileRepository,
    notificacao_repo: NotificacaoRepository,
}

impl LoteService {
    pub fn new(
        pool: PgPool,
        solicitacao_repo: SolicitacaoRepository,
        tramitacao_repo: TramitacaoRepository,
        documento_repo: DocumentoRepository,
        unidade_repo: UnidadeRepository,
        profile_repo: ProfileRepository,
        notificacao_repo: NotificacaoRepository,
    ) -> Self {
        Self {
            pool,
            solicitacao_repo,
            tramitacao_repo,
            documento_repo,
            unidade_repo,
            profile_repo,
            notificacao_repo,
        }
    }

    /// Gera o suprimento ordinário da competência, unidade por unidade.
    /// Cada unidade é atômica; a falha de uma não desfaz as outras.
    pub async fn gerar_lote(
        &self,
        user: &AuthenticatedUser,
        payload: &GerarLotePayload,
    ) -> Result<ResultadoLote, AppError> {
        let competencia: Competencia = payload
            .competencia
            .parse()
            .map_err(AppError::CompetenciaInvalida)?;

        let mut resultados = Vec::with_capacity(payload.unidades.len());

        for unidade in &payload.unidades {
            let resultado = match validar_distribuicao(unidade) {
                Err(motivo) => ResultadoUnidadeLote {
                    unidade_id: unidade.unidade_id,
                    situacao: SituacaoUnidadeLote::Rejeitada,
                    solicitacao_id: None,
                    mensagem: Some(motivo),
                },
                Ok(()) => match self.processar_unidade(user, &competencia, unidade).await {
                    Ok(Some(solicitacao_id)) => ResultadoUnidadeLote {
                        unidade_id: unidade.unidade_id,
                        situacao: SituacaoUnidadeLote::Criada,
                        solicitacao_id: Some(solicitacao_id),
                        mensagem: None,
                    },
                    Ok(None) => ResultadoUnidadeLote {
                        unidade_id: unidade.unidade_id,
                        situacao: SituacaoUnidadeLote::Ignorada,
                        solicitacao_id: None,
                        mensagem: Some(format!("já existe solicitação para {}", competencia)),
                    },
                    Err(AppError::RegraDeNegocio(motivo)) => ResultadoUnidadeLote {
                        unidade_id: unidade.unidade_id,
                        situacao: SituacaoUnidadeLote::Rejeitada,
                        solicitacao_id: None,
                        mensagem: Some(motivo),
                    },
                    Err(e) => {
                        tracing::error!(
                            "Falha no lote {} para a unidade {}: {:?}",
                            competencia,
                            unidade.unidade_id,
                            e
                        );
                        ResultadoUnidadeLote {
                            unidade_id: unidade.unidade_id,
                            situacao: SituacaoUnidadeLote::Falha,
                            solicitacao_id: None,
                            mensagem: Some(e.to_string()),
                        }
                    }
                },
            };
            resultados.push(resultado);
        }

        let resultado = ResultadoLote::consolidar(&competencia, resultados);
        tracing::info!(
            "🏭 Lote {} concluído: {} criadas, {} ignoradas, {} rejeitadas, {} falhas",
            resultado.competencia,
            resultado.criadas,
            resultado.ignoradas,
            resultado.rejeitadas,
            resultado.falhas
        );
        Ok(resultado)
    }

    /// `None` quando a unidade já tinha solicitação para a competência.
    async fn processar_unidade(
        &self,
        user: &AuthenticatedUser,
        competencia: &Competencia,
        entrada: &UnidadeLote,
    ) -> Result<Option<Uuid>, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let unidade = self
            .unidade_repo
            .find_by_id(&mut *tx, entrada.unidade_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Unidade {}", entrada.unidade_id)))?;

        let titular_id = unidade.titular_ordinario_id.ok_or_else(|| {
            AppError::RegraDeNegocio(format!("unidade {} sem titular ordinário", unidade.codigo))
        })?;
        let titular = self
            .profile_repo
            .find_by_id(&mut *tx, titular_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        // O papel pode ter mudado depois da designação
        exigir_titular_suprido(&titular)?;

        let (itens, valor_solicitado) = itens_da_distribuicao(entrada);
        let competencia_txt = competencia.to_string();
        let descricao = format!(
            "Suprimento de fundos ordinário {} - {}",
            competencia_txt, unidade.nome
        );
        let dados_extras = json!({
            "lote": {
                "competencia": competencia_txt,
                "valorAutorizado": entrada.valor_autorizado,
            }
        });

        let nup = self.solicitacao_repo.next_nup(&mut *tx).await?;
        let Some(solicitacao) = self
            .solicitacao_repo
            .insert_lote_if_absent(
                &mut *tx,
                &nup,
                &NovaSolicitacao {
                    tipo: TipoSuprimento::Ordinario,
                    status: StatusSolicitacao::AguardandoAutorizacao,
                    destino_atual: Papel::Sefin,
                    suprido_id: titular.id,
                    unidade_id: Some(unidade.id),
                    competencia: Some(&competencia_txt),
                    descricao: &descricao,
                    itens: &itens,
                    valor_solicitado,
                    dados_extras: &dados_extras,
                },
            )
            .await?
        else {
            return Ok(None);
        };

        let hoje = Utc::now().date_naive();
        for tipo in DOCUMENTOS_DO_LOTE {
            let conteudo = renderizar_conteudo(tipo, &solicitacao, &titular, Some(&unidade), hoje);
            self.documento_repo
                .insert(&mut *tx, solicitacao.id, tipo, tipo.titulo(), &conteudo, user.0.id)
                .await?;
        }

        let observacao = format!("Gerado no lote da competência {}", competencia_txt);
        self.tramitacao_repo
            .insert_historico(
                &mut *tx,
                &NovoHistorico {
                    solicitacao_id: solicitacao.id,
                    acao: AcaoTramitacao::GerarLote,
                    origem: Papel::Sosfu,
                    destino: Papel::Sefin,
                    status_anterior: None,
                    status_novo: StatusSolicitacao::AguardandoAutorizacao,
                    observacao: Some(&observacao),
                    ator_id: user.0.id,
                },
            )
            .await?;

        self.notificacao_repo
            .insert(
                &mut *tx,
                DestinoNotificacao::Usuario(titular.id),
                Some(solicitacao.id),
                &format!("Suprimento ordinário {} gerado", competencia_txt),
                &format!(
                    "A solicitação {} ({}) foi gerada para a unidade {} e aguarda autorização da SEFIN.",
                    solicitacao.nup,
                    formatar_reais(solicitacao.valor_solicitado),
                    unidade.nome
                ),
            )
            .await?;

        tx.commit().await?;
        Ok(Some(solicitacao.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lote::LinhaDistribuicao;
    use std::str::FromStr;

    fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).unwrap()
    }

    fn linha(valor: &str) -> LinhaDistribuicao {
        LinhaDistribuicao {
            elemento_despesa: "3.3.90.30".into(),
            descricao: None,
            valor: dec(valor),
        }
    }

    fn unidade(autorizado: &str, linhas: Vec<LinhaDistribuicao>) -> UnidadeLote {
        UnidadeLote {
            unidade_id: Uuid::new_v4(),
            valor_autorizado: dec(autorizado),
            distribuicao: linhas,
        }
    }

    #[test]
    fn exact_distribution_is_accepted() {
        assert!(validar_distribuicao(&unidade("4000.00", vec![linha("1500.00"), linha("2500.00")])).is_ok());
    }

    #[test]
    fn one_cent_difference_is_tolerated() {
        assert!(validar_distribuicao(&unidade("1000.00", vec![linha("999.99")])).is_ok());
        assert!(validar_distribuicao(&unidade("1000.00", vec![linha("1000.01")])).is_ok());
    }

    #[test]
    fn larger_difference_is_rejected() {
        let err = validar_distribuicao(&unidade("1000.00", vec![linha("999.98")])).unwrap_err();
        assert!(err.contains("difere"));
        assert!(validar_distribuicao(&unidade("1000.00", vec![linha("1200.00")])).is_err());
    }

    #[test]
    fn negative_or_empty_distribution_is_rejected() {
        assert!(validar_distribuicao(&unidade("100.00", vec![])).is_err());
        assert!(validar_distribuicao(&unidade("100.00", vec![linha("150.00"), linha("-50.00")])).is_err());
        assert!(validar_distribuicao(&unidade("0", vec![linha("0")])).is_err());
    }

    #[test]
    fn fractions_of_a_cent_are_rejected() {
        let err = validar_distribuicao(&unidade("100.00", vec![linha("50.005"), linha("49.995")])).unwrap_err();
        assert!(err.contains("centavo"));
        assert!(validar_distribuicao(&unidade("100.001", vec![linha("100.00")])).is_err());
    }

    #[test]
    fn distribution_becomes_expense_items() {
        let mut u = unidade("300.00", vec![linha("100.00"), linha("200.00")]);
        u.distribuicao[0].descricao = Some("Material de expediente".into());
        let (itens, total) = itens_da_distribuicao(&u);
        assert_eq!(itens.len(), 2);
        assert_eq!(itens[0].descricao, "Material de expediente");
        assert_eq!(itens[1].descricao, "Elemento 3.3.90.30");
        assert_eq!(total, dec("300.00"));
    }

    #[test]
    fn requested_amount_follows_the_lines_within_tolerance() {
        let u = unidade("1000.00", vec![linha("999.99")]);
        assert!(validar_distribuicao(&u).is_ok());
        let (itens, total) = itens_da_distribuicao(&u);
        assert_eq!(total, dec("999.99"));
        assert_eq!(total, total_itens(&itens));
    }
}
