// src/services/solicitacao_service.rs

use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{solicitacao_repo::NovaSolicitacao, SolicitacaoRepository, TramitacaoRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Profile,
        solicitacao::{
            total_dentro_do_limite, AtualizarSolicitacaoPayload, CriarSolicitacaoPayload, FiltroFila,
            ItemDespesa, Solicitacao, SolicitacaoDetalhe,
        },
        tramitacao::{AcaoTramitacao, Papel, StatusSolicitacao, TramitarPayload},
    },
    services::tramitacao_service::{acoes_disponiveis, pode_visualizar, TramitacaoService},
};

fn payload_submeter() -> TramitarPayload {
    TramitarPayload {
        acao: AcaoTramitacao::Submeter,
        observacao: None,
        numero_portaria: None,
        valor_concedido: None,
        versao_esperada: None,
    }
}

/// Só o próprio suprido edita, e só enquanto a solicitação está com ele
/// em rascunho ou devolvida.
pub fn verificar_edicao(solicitacao: &Solicitacao, ator: &Profile) -> Result<(), AppError> {
    if ator.papel != Papel::Suprido || ator.id != solicitacao.suprido_id {
        return Err(AppError::NaoEhResponsavel);
    }
    let editavel = solicitacao.destino_atual == Papel::Suprido
        && matches!(
            solicitacao.status,
            StatusSolicitacao::Rascunho | StatusSolicitacao::Devolvido
        );
    if !editavel {
        return Err(AppError::RegraDeNegocio(format!(
            "solicitação em {} não pode ser editada",
            solicitacao.status
        )));
    }
    Ok(())
}

/// Aplica os campos presentes no payload sobre o conteúdo atual.
pub fn mesclar_edicao(
    atual: &Solicitacao,
    payload: &AtualizarSolicitacaoPayload,
) -> (String, Vec<ItemDespesa>, Value) {
    let descricao = payload
        .descricao
        .clone()
        .unwrap_or_else(|| atual.descricao.clone());
    let itens = payload
        .itens
        .clone()
        .unwrap_or_else(|| atual.itens.0.clone());
    let dados_extras = payload
        .dados_extras
        .clone()
        .unwrap_or_else(|| atual.dados_extras.clone());
    (descricao, itens, dados_extras)
}

#[derive(Clone)]
pub struct SolicitacaoService {
    pool: PgPool,
    solicitacao_repo: SolicitacaoRepository,
    tramitacao_repo: TramitacaoRepository,
    tramitacao_service: TramitacaoService,
}

impl SolicitacaoService {
    pub fn new(
        pool: PgPool,
        solicitacao_repo: SolicitacaoRepository,
        tramitacao_repo: TramitacaoRepository,
        tramitacao_service: TramitacaoService,
    ) -> Self {
        Self {
            pool,
            solicitacao_repo,
            tramitacao_repo,
            tramitacao_service,
        }
    }

    pub async fn criar(
        &self,
        user: &AuthenticatedUser,
        payload: &CriarSolicitacaoPayload,
    ) -> Result<Solicitacao, AppError> {
        if user.0.papel != Papel::Suprido {
            return Err(AppError::PapelNaoAutorizado {
                exigido: Papel::Suprido.to_string(),
            });
        }

        let dados_extras = payload.dados_extras.clone().unwrap_or_else(|| json!({}));
        let valor = total_dentro_do_limite(&payload.itens)?;

        let mut tx = begin_audited(&self.pool, user).await?;

        let nup = self.solicitacao_repo.next_nup(&mut *tx).await?;
        let criada = self
            .solicitacao_repo
            .insert(
                &mut *tx,
                &nup,
                &NovaSolicitacao {
                    tipo: payload.tipo,
                    status: StatusSolicitacao::Rascunho,
                    destino_atual: Papel::Suprido,
                    suprido_id: user.0.id,
                    unidade_id: payload.unidade_id,
                    competencia: None,
                    descricao: payload.descricao.trim(),
                    itens: &payload.itens,
                    valor_solicitado: valor,
                    dados_extras: &dados_extras,
                },
            )
            .await?;

        let solicitacao = if payload.enviar {
            let (enviada, _) = self
                .tramitacao_service
                .aplicar_em_transacao(&mut tx, &criada, &payload_submeter(), &user.0)
                .await?;
            enviada
        } else {
            criada
        };

        tx.commit().await?;

        tracing::info!(
            "📝 Solicitação {} criada por {} ({})",
            solicitacao.nup,
            user.0.id,
            solicitacao.status
        );

        Ok(solicitacao)
    }

    pub async fn atualizar_rascunho(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        payload: &AtualizarSolicitacaoPayload,
    ) -> Result<Solicitacao, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let atual = self
            .solicitacao_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Solicitação {}", id)))?;

        if !pode_visualizar(&atual, &user.0) {
            return Err(AppError::ResourceNotFound(format!("Solicitação {}", id)));
        }
        verificar_edicao(&atual, &user.0)?;

        if let Some(esperada) = payload.versao_esperada {
            if esperada != atual.versao {
                return Err(AppError::ConflitoDeVersao {
                    esperada,
                    atual: atual.versao,
                });
            }
        }

        let (descricao, itens, dados_extras) = mesclar_edicao(&atual, payload);
        let valor = total_dentro_do_limite(&itens)?;

        let editada = self
            .solicitacao_repo
            .update_conteudo(
                &mut *tx,
                id,
                atual.versao,
                descricao.trim(),
                &itens,
                valor,
                &dados_extras,
            )
            .await?
            .ok_or(AppError::ConflitoDeVersao {
                esperada: atual.versao,
                atual: atual.versao + 1,
            })?;

        let solicitacao = if payload.enviar {
            let (enviada, _) = self
                .tramitacao_service
                .aplicar_em_transacao(&mut tx, &editada, &payload_submeter(), &user.0)
                .await?;
            enviada
        } else {
            editada
        };

        tx.commit().await?;

        tracing::info!("✏️ Solicitação {} editada (versão {})", solicitacao.nup, solicitacao.versao);

        Ok(solicitacao)
    }

    pub async fn obter(&self, ator: &Profile, id: Uuid) -> Result<SolicitacaoDetalhe, AppError> {
        let solicitacao = self
            .solicitacao_repo
            .find_by_id(&self.pool, id)
            .await?
            .filter(|s| pode_visualizar(s, ator))
            .ok_or_else(|| AppError::ResourceNotFound(format!("Solicitação {}", id)))?;

        let historico = self
            .tramitacao_repo
            .list_by_solicitacao(&self.pool, id)
            .await?;

        let acoes = acoes_disponiveis(&solicitacao, ator)
            .into_iter()
            .map(|t| t.acao)
            .collect();

        Ok(SolicitacaoDetalhe {
            solicitacao,
            historico,
            acoes_disponiveis: acoes,
        })
    }

    /// A fila do ator: o suprido vê as próprias; os demais papéis, o que está com eles.
    pub async fn listar_fila(&self, ator: &Profile, filtro: &FiltroFila) -> Result<Vec<Solicitacao>, AppError> {
        match ator.papel {
            Papel::Suprido => {
                self.solicitacao_repo
                    .list_by_suprido(ator.id, filtro.status)
                    .await
            }
            papel => self.solicitacao_repo.list_by_destino(papel, filtro.status).await,
        }
    }
}
