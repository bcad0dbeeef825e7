// src/services/tramitacao_service.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{
        tramitacao_repo::NovoHistorico, NotificacaoRepository, SolicitacaoRepository,
        TramitacaoRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Profile,
        notificacao::DestinoNotificacao,
        solicitacao::{centavos_exatos, Solicitacao},
        tramitacao::{
            AcaoTramitacao, HistoricoTramitacao, Papel, PlanoTransicao, StatusSolicitacao,
            TramitarPayload, TransicaoDisponivel,
        },
    },
};

use AcaoTramitacao as A;
use Papel as P;
use StatusSolicitacao as S;

// =============================================================================
//  TABELA DE TRANSIÇÕES
// =============================================================================

/// (status, destino) × ação → (status, destino). Quem age é sempre o dono atual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegraTransicao {
    pub de: (StatusSolicitacao, Papel),
    pub acao: AcaoTramitacao,
    pub para: (StatusSolicitacao, Papel),
}

const fn regra(
    de: (StatusSolicitacao, Papel),
    acao: AcaoTramitacao,
    para: (StatusSolicitacao, Papel),
) -> RegraTransicao {
    RegraTransicao { de, acao, para }
}

pub const TABELA_TRANSICOES: &[RegraTransicao] = &[
    // Suprido: rascunho e correção
    regra((S::Rascunho, P::Suprido), A::Submeter, (S::PendenteAtesto, P::Gestor)),
    regra((S::Devolvido, P::Suprido), A::Submeter, (S::PendenteAtesto, P::Gestor)),
    regra((S::Rascunho, P::Suprido), A::Cancelar, (S::Cancelado, P::Suprido)),
    regra((S::Rascunho, P::Suprido), A::Excluir, (S::Excluido, P::Suprido)),
    regra((S::Devolvido, P::Suprido), A::Cancelar, (S::Cancelado, P::Suprido)),
    // Gestor: atesto
    regra((S::PendenteAtesto, P::Gestor), A::Aprovar, (S::Aprovado, P::Sosfu)),
    regra((S::PendenteAtesto, P::Gestor), A::Devolver, (S::Devolvido, P::Suprido)),
    regra((S::PendenteAtesto, P::Gestor), A::Cancelar, (S::Cancelado, P::Gestor)),
    regra((S::Devolvido, P::Gestor), A::Aprovar, (S::Aprovado, P::Sosfu)),
    regra((S::Devolvido, P::Gestor), A::Devolver, (S::Devolvido, P::Suprido)),
    // SOSFU: análise técnica
    regra((S::Aprovado, P::Sosfu), A::EncaminharSefin, (S::AguardandoAutorizacao, P::Sefin)),
    regra((S::Aprovado, P::Sosfu), A::Devolver, (S::Devolvido, P::Gestor)),
    // SEFIN: ordenação de despesa
    regra((S::AguardandoAutorizacao, P::Sefin), A::Conceder, (S::Concedido, P::Sosfu)),
    regra((S::AguardandoAutorizacao, P::Sefin), A::Devolver, (S::Devolvido, P::Ajsefin)),
    // AJSEFIN: saneamento
    regra((S::Devolvido, P::Ajsefin), A::Reencaminhar, (S::AguardandoAutorizacao, P::Sefin)),
    regra((S::Devolvido, P::Ajsefin), A::Devolver, (S::Devolvido, P::Gestor)),
    // Liberação e prestação de contas
    regra((S::Concedido, P::Sosfu), A::LiberarRecurso, (S::AguardandoConfirmacaoSuprido, P::Suprido)),
    regra(
        (S::AguardandoConfirmacaoSuprido, P::Suprido),
        A::ConfirmarRecebimento,
        (S::PrestandoContas, P::Suprido),
    ),
    regra((S::PrestandoContas, P::Suprido), A::EnviarPrestacao, (S::PcEmAnalise, P::Gestor)),
    regra((S::PcEmAnalise, P::Gestor), A::AtestarPrestacao, (S::Atestado, P::Sosfu)),
    regra((S::PcEmAnalise, P::Gestor), A::Devolver, (S::PrestandoContas, P::Suprido)),
    regra((S::Atestado, P::Sosfu), A::Arquivar, (S::Arquivado, P::Sosfu)),
    regra((S::Atestado, P::Sosfu), A::Devolver, (S::PrestandoContas, P::Suprido)),
];

pub fn regra_para(
    status: StatusSolicitacao,
    destino: Papel,
    acao: AcaoTramitacao,
) -> Option<&'static RegraTransicao> {
    TABELA_TRANSICOES
        .iter()
        .find(|r| r.de == (status, destino) && r.acao == acao)
}

/// Só o dono atual age. Na fila do suprido, "dono" é o próprio requerente.
pub fn eh_responsavel(solicitacao: &Solicitacao, ator: &Profile) -> bool {
    if ator.papel != solicitacao.destino_atual {
        return false;
    }
    solicitacao.destino_atual != Papel::Suprido || ator.id == solicitacao.suprido_id
}

/// O suprido só enxerga as próprias solicitações; os demais papéis enxergam todas.
pub fn pode_visualizar(solicitacao: &Solicitacao, ator: &Profile) -> bool {
    ator.papel != Papel::Suprido || ator.id == solicitacao.suprido_id
}

pub fn acoes_disponiveis(solicitacao: &Solicitacao, ator: &Profile) -> Vec<TransicaoDisponivel> {
    if !eh_responsavel(solicitacao, ator) {
        return vec![];
    }
    TABELA_TRANSICOES
        .iter()
        .filter(|r| r.de == (solicitacao.status, solicitacao.destino_atual))
        .map(|r| TransicaoDisponivel {
            acao: r.acao,
            status_novo: r.para.0,
            destino: r.para.1,
        })
        .collect()
}

fn texto_preenchido(valor: &Option<String>) -> Option<String> {
    valor
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Valida a ação contra a tabela e as regras de cada passo, sem tocar no banco.
pub fn planejar_transicao(
    solicitacao: &Solicitacao,
    payload: &TramitarPayload,
    ator: &Profile,
) -> Result<PlanoTransicao, AppError> {
    let acao = payload.acao;

    if !eh_responsavel(solicitacao, ator) {
        return Err(AppError::NaoEhResponsavel);
    }

    // Processo encerrado não tramita mais
    let regra = regra_para(solicitacao.status, solicitacao.destino_atual, acao)
        .filter(|_| !solicitacao.status.is_terminal())
        .ok_or_else(|| AppError::TransicaoInvalida {
            status: solicitacao.status.to_string(),
            destino: solicitacao.destino_atual.to_string(),
            acao: acao.to_string(),
        })?;

    let observacao = texto_preenchido(&payload.observacao);
    let mut numero_portaria = None;
    let mut valor_concedido = None;

    match acao {
        A::Submeter => {
            if solicitacao.itens.0.is_empty() || solicitacao.valor_solicitado <= Decimal::ZERO {
                return Err(AppError::RegraDeNegocio(
                    "a solicitação precisa de ao menos um item com valor positivo".into(),
                ));
            }
        }
        A::Devolver if observacao.is_none() => {
            return Err(AppError::RegraDeNegocio(
                "a devolução exige uma observação com o motivo".into(),
            ));
        }
        A::Conceder => {
            let portaria = texto_preenchido(&payload.numero_portaria).ok_or_else(|| {
                AppError::RegraDeNegocio("a concessão exige o número da portaria".into())
            })?;
            let valor = payload.valor_concedido.unwrap_or(solicitacao.valor_solicitado);
            if valor <= Decimal::ZERO
                || valor > solicitacao.valor_solicitado
                || !centavos_exatos(&valor)
            {
                return Err(AppError::RegraDeNegocio(format!(
                    "valor concedido deve estar entre 0 e {}",
                    solicitacao.valor_solicitado
                )));
            }
            numero_portaria = Some(portaria);
            valor_concedido = Some(valor);
        }
        _ => {}
    }

    Ok(PlanoTransicao {
        acao,
        origem: solicitacao.destino_atual,
        destino: regra.para.1,
        status_anterior: solicitacao.status,
        status_novo: regra.para.0,
        observacao,
        numero_portaria,
        valor_concedido,
    })
}

/// Para quem vai o aviso da nova etapa.
pub fn destino_notificacao(plano: &PlanoTransicao, suprido_id: Uuid) -> DestinoNotificacao {
    match plano.destino {
        Papel::Suprido => DestinoNotificacao::Usuario(suprido_id),
        papel => DestinoNotificacao::Fila(papel),
    }
}

pub fn texto_notificacao(plano: &PlanoTransicao, nup: &str) -> (String, String) {
    let titulo = format!("Solicitação {} - {}", nup, plano.status_novo.label());
    let mut mensagem = format!(
        "A solicitação {} foi tramitada de {} para {} ({}).",
        nup,
        plano.origem,
        plano.destino,
        plano.acao
    );
    if let Some(obs) = &plano.observacao {
        mensagem.push_str(&format!(" Observação: {}", obs));
    }
    (titulo, mensagem)
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct TramitacaoService {
    pool: PgPool,
    solicitacao_repo: SolicitacaoRepository,
    tramitacao_repo: TramitacaoRepository,
    notificacao_repo: NotificacaoRepository,
}

impl TramitacaoService {
    pub fn new(
        pool: PgPool,
        solicitacao_repo: SolicitacaoRepository,
        tramitacao_repo: TramitacaoRepository,
        notificacao_repo: NotificacaoRepository,
    ) -> Self {
        Self {
            pool,
            solicitacao_repo,
            tramitacao_repo,
            notificacao_repo,
        }
    }

    /// Tramita a solicitação: trava a linha, valida, atualiza, registra o histórico
    /// e notifica o novo dono. Tudo ou nada.
    pub async fn tramitar(
        &self,
        user: &AuthenticatedUser,
        solicitacao_id: Uuid,
        payload: &TramitarPayload,
    ) -> Result<Solicitacao, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let atual = self
            .solicitacao_repo
            .find_for_update(&mut *tx, solicitacao_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Solicitação {}", solicitacao_id)))?;

        let (atualizada, historico) = self
            .aplicar_em_transacao(&mut tx, &atual, payload, &user.0)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🔀 Solicitação {} tramitada: {} ({} -> {}) por {}",
            atualizada.nup,
            historico.acao,
            historico.origem,
            historico.destino,
            user.0.id
        );

        Ok(atualizada)
    }

    /// Núcleo da tramitação, reutilizado por quem já tem uma transação aberta
    /// (ex.: criar e enviar de uma vez). `atual` deve ter sido lida com FOR UPDATE.
    pub(crate) async fn aplicar_em_transacao(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        atual: &Solicitacao,
        payload: &TramitarPayload,
        ator: &Profile,
    ) -> Result<(Solicitacao, HistoricoTramitacao), AppError> {
        if let Some(esperada) = payload.versao_esperada {
            if esperada != atual.versao {
                return Err(AppError::ConflitoDeVersao {
                    esperada,
                    atual: atual.versao,
                });
            }
        }

        let plano = planejar_transicao(atual, payload, ator).inspect_err(|e| {
            tracing::warn!("Transição recusada para {}: {}", atual.nup, e);
        })?;

        let atualizada = self
            .solicitacao_repo
            .apply_transition(&mut **tx, atual.id, atual.versao, &plano)
            .await?
            .ok_or(AppError::ConflitoDeVersao {
                esperada: atual.versao,
                atual: atual.versao + 1,
            })?;

        let historico = self
            .tramitacao_repo
            .insert_historico(
                &mut **tx,
                &NovoHistorico {
                    solicitacao_id: atual.id,
                    acao: plano.acao,
                    origem: plano.origem,
                    destino: plano.destino,
                    status_anterior: Some(plano.status_anterior),
                    status_novo: plano.status_novo,
                    observacao: plano.observacao.as_deref(),
                    ator_id: ator.id,
                },
            )
            .await?;

        let (titulo, mensagem) = texto_notificacao(&plano, &atual.nup);
        self.notificacao_repo
            .insert(
                &mut **tx,
                destino_notificacao(&plano, atual.suprido_id),
                Some(atual.id),
                &titulo,
                &mensagem,
            )
            .await?;

        Ok((atualizada, historico))
    }

    pub async fn listar_transicoes(
        &self,
        ator: &Profile,
        solicitacao_id: Uuid,
    ) -> Result<Vec<TransicaoDisponivel>, AppError> {
        let solicitacao = self.buscar_visivel(ator, solicitacao_id).await?;
        Ok(acoes_disponiveis(&solicitacao, ator))
    }

    pub async fn historico(
        &self,
        ator: &Profile,
        solicitacao_id: Uuid,
    ) -> Result<Vec<HistoricoTramitacao>, AppError> {
        self.buscar_visivel(ator, solicitacao_id).await?;
        self.tramitacao_repo
            .list_by_solicitacao(&self.pool, solicitacao_id)
            .await
    }

    async fn buscar_visivel(&self, ator: &Profile, solicitacao_id: Uuid) -> Result<Solicitacao, AppError> {
        let solicitacao = self
            .solicitacao_repo
            .find_by_id(&self.pool, solicitacao_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Solicitação {}", solicitacao_id)))?;

        if !pode_visualizar(&solicitacao, ator) {
            // Não revela a existência de solicitações alheias
            return Err(AppError::ResourceNotFound(format!("Solicitação {}", solicitacao_id)));
        }
        Ok(solicitacao)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::solicitacao::{ItemDespesa, TipoSuprimento};
    use chrono::Utc;
    use serde_json::json;
    use sqlx::types::Json;
    use std::str::FromStr;

    const TODOS_STATUS: [StatusSolicitacao; 13] = [
        S::Rascunho,
        S::PendenteAtesto,
        S::Devolvido,
        S::Aprovado,
        S::AguardandoAutorizacao,
        S::Concedido,
        S::AguardandoConfirmacaoSuprido,
        S::PrestandoContas,
        S::PcEmAnalise,
        S::Atestado,
        S::Arquivado,
        S::Cancelado,
        S::Excluido,
    ];
    const TODOS_PAPEIS: [Papel; 5] = [P::Suprido, P::Gestor, P::Sefin, P::Sosfu, P::Ajsefin];
    const TODAS_ACOES: [AcaoTramitacao; 14] = [
        A::Submeter,
        A::Aprovar,
        A::Devolver,
        A::EncaminharSefin,
        A::Conceder,
        A::Reencaminhar,
        A::LiberarRecurso,
        A::ConfirmarRecebimento,
        A::EnviarPrestacao,
        A::AtestarPrestacao,
        A::Arquivar,
        A::Cancelar,
        A::Excluir,
        A::GerarLote,
    ];

    pub(crate) fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).unwrap()
    }

    pub(crate) fn perfil(papel: Papel) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: format!("{}@tjpa.jus.br", papel.as_str().to_lowercase()),
            password_hash: String::new(),
            nome: format!("Servidor {}", papel),
            matricula: Some("100200".into()),
            cargo: Some("Analista Judiciário".into()),
            papel,
            signature_pin_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn item(descricao: &str, valor: &str) -> ItemDespesa {
        ItemDespesa {
            descricao: descricao.into(),
            elemento_despesa: Some("3.3.90.30".into()),
            valor: dec(valor),
        }
    }

    pub(crate) fn solicitacao(suprido: &Profile, itens: Vec<ItemDespesa>) -> Solicitacao {
        let total = crate::models::solicitacao::total_itens(&itens);
        Solicitacao {
            id: Uuid::new_v4(),
            nup: "TJPA-SF-2026-000001".into(),
            tipo: TipoSuprimento::ExtraEmergencial,
            status: S::Rascunho,
            destino_atual: P::Suprido,
            suprido_id: suprido.id,
            unidade_id: None,
            competencia: None,
            descricao: "Material para audiência".into(),
            valor_solicitado: total,
            valor_concedido: None,
            numero_portaria: None,
            itens: Json(itens),
            dados_extras: json!({}),
            versao: 1,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn payload(acao: AcaoTramitacao) -> TramitarPayload {
        TramitarPayload {
            acao,
            observacao: None,
            numero_portaria: None,
            valor_concedido: None,
            versao_esperada: None,
        }
    }

    /// Espelha o UPDATE + INSERT que o serviço faz dentro da transação.
    fn aplicar(s: &mut Solicitacao, plano: &PlanoTransicao, historico: &mut Vec<PlanoTransicao>) {
        s.status = plano.status_novo;
        s.destino_atual = plano.destino;
        if plano.numero_portaria.is_some() {
            s.numero_portaria = plano.numero_portaria.clone();
        }
        if plano.valor_concedido.is_some() {
            s.valor_concedido = plano.valor_concedido;
        }
        s.versao += 1;
        historico.push(plano.clone());
    }

    fn ator_para(s: &Solicitacao, suprido: &Profile) -> Profile {
        if s.destino_atual == P::Suprido {
            suprido.clone()
        } else {
            perfil(s.destino_atual)
        }
    }

    fn payload_completo(acao: AcaoTramitacao) -> TramitarPayload {
        TramitarPayload {
            acao,
            observacao: Some("motivo registrado".into()),
            numero_portaria: Some("77/2026-GP".into()),
            valor_concedido: None,
            versao_esperada: None,
        }
    }

    #[test]
    fn every_pair_and_action_follows_the_table() {
        let suprido = perfil(P::Suprido);
        for status in TODOS_STATUS {
            for destino in TODOS_PAPEIS {
                for acao in TODAS_ACOES {
                    let mut s = solicitacao(&suprido, vec![item("Papel", "10.00")]);
                    s.status = status;
                    s.destino_atual = destino;
                    let ator = ator_para(&s, &suprido);

                    let resultado = planejar_transicao(&s, &payload_completo(acao), &ator);
                    match regra_para(status, destino, acao) {
                        Some(r) => {
                            let plano = resultado.unwrap();
                            assert_eq!((plano.status_novo, plano.destino), r.para);
                            assert_eq!(plano.status_anterior, status);
                            assert_eq!(plano.origem, destino);
                        }
                        None => assert!(
                            matches!(resultado, Err(AppError::TransicaoInvalida { .. })),
                            "{status:?}/{destino:?}/{acao:?} deveria ser inválida"
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for r in TABELA_TRANSICOES {
            assert!(!r.de.0.is_terminal(), "{:?} sai de estado terminal", r);
        }
    }

    #[test]
    fn cancel_and_delete_only_from_early_phases() {
        let iniciais = [S::Rascunho, S::PendenteAtesto, S::Devolvido];
        for r in TABELA_TRANSICOES {
            if matches!(r.para.0, S::Cancelado | S::Excluido) {
                assert!(iniciais.contains(&r.de.0), "{:?}", r);
            }
        }
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        for (i, a) in TABELA_TRANSICOES.iter().enumerate() {
            for b in &TABELA_TRANSICOES[i + 1..] {
                assert!(!(a.de == b.de && a.acao == b.acao), "duplicada: {:?}", a);
            }
        }
    }

    #[test]
    fn batch_action_is_never_accepted_from_clients() {
        assert!(TABELA_TRANSICOES.iter().all(|r| r.acao != A::GerarLote));
    }

    #[test]
    fn only_current_owner_may_act() {
        let suprido = perfil(P::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Papel", "10.00")]);
        s.status = S::PendenteAtesto;
        s.destino_atual = P::Gestor;

        let sosfu = perfil(P::Sosfu);
        assert!(matches!(
            planejar_transicao(&s, &payload(A::Aprovar), &sosfu),
            Err(AppError::NaoEhResponsavel)
        ));
        assert!(matches!(
            planejar_transicao(&s, &payload(A::Aprovar), &suprido),
            Err(AppError::NaoEhResponsavel)
        ));
    }

    #[test]
    fn another_requester_cannot_submit_my_draft() {
        let dono = perfil(P::Suprido);
        let outro = perfil(P::Suprido);
        let s = solicitacao(&dono, vec![item("Papel", "10.00")]);
        assert!(matches!(
            planejar_transicao(&s, &payload(A::Submeter), &outro),
            Err(AppError::NaoEhResponsavel)
        ));
        assert!(acoes_disponiveis(&s, &outro).is_empty());
        assert!(!pode_visualizar(&s, &outro));
        assert!(pode_visualizar(&s, &perfil(P::Gestor)));
    }

    #[test]
    fn submit_requires_items_with_positive_total() {
        let suprido = perfil(P::Suprido);
        let vazia = solicitacao(&suprido, vec![]);
        assert!(matches!(
            planejar_transicao(&vazia, &payload(A::Submeter), &suprido),
            Err(AppError::RegraDeNegocio(_))
        ));
    }

    #[test]
    fn return_requires_a_reason() {
        let suprido = perfil(P::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Papel", "10.00")]);
        s.status = S::PendenteAtesto;
        s.destino_atual = P::Gestor;
        let gestor = perfil(P::Gestor);

        let mut p = payload(A::Devolver);
        p.observacao = Some("   ".into());
        assert!(matches!(
            planejar_transicao(&s, &p, &gestor),
            Err(AppError::RegraDeNegocio(_))
        ));

        p.observacao = Some(" Falta nota fiscal ".into());
        let plano = planejar_transicao(&s, &p, &gestor).unwrap();
        assert_eq!(plano.observacao.as_deref(), Some("Falta nota fiscal"));
        assert_eq!((plano.status_novo, plano.destino), (S::Devolvido, P::Suprido));
    }

    #[test]
    fn grant_requires_ordinance_and_bounded_value() {
        let suprido = perfil(P::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Papel", "300.00"), item("Café", "150.00")]);
        s.status = S::AguardandoAutorizacao;
        s.destino_atual = P::Sefin;
        let sefin = perfil(P::Sefin);

        assert!(planejar_transicao(&s, &payload(A::Conceder), &sefin).is_err());

        let mut p = payload(A::Conceder);
        p.numero_portaria = Some("101/2026-GP".into());
        p.valor_concedido = Some(dec("500.00"));
        assert!(planejar_transicao(&s, &p, &sefin).is_err());

        p.valor_concedido = None;
        let plano = planejar_transicao(&s, &p, &sefin).unwrap();
        assert_eq!(plano.valor_concedido, Some(dec("450.00")));
        assert_eq!(plano.numero_portaria.as_deref(), Some("101/2026-GP"));
        assert_eq!((plano.status_novo, plano.destino), (S::Concedido, P::Sosfu));
    }

    #[test]
    fn portaria_is_ignored_outside_grant() {
        let suprido = perfil(P::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Papel", "10.00")]);
        s.status = S::PendenteAtesto;
        s.destino_atual = P::Gestor;
        let mut p = payload(A::Aprovar);
        p.numero_portaria = Some("999".into());
        p.valor_concedido = Some(dec("1.00"));
        let plano = planejar_transicao(&s, &p, &perfil(P::Gestor)).unwrap();
        assert!(plano.numero_portaria.is_none());
        assert!(plano.valor_concedido.is_none());
    }

    #[test]
    fn notification_goes_to_requester_or_role_queue() {
        let suprido = perfil(P::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Papel", "10.00")]);
        s.status = S::PendenteAtesto;
        s.destino_atual = P::Gestor;

        let mut p = payload(A::Devolver);
        p.observacao = Some("Ajustar itens".into());
        let devolucao = planejar_transicao(&s, &p, &perfil(P::Gestor)).unwrap();
        assert_eq!(
            destino_notificacao(&devolucao, suprido.id),
            DestinoNotificacao::Usuario(suprido.id)
        );
        let (titulo, mensagem) = texto_notificacao(&devolucao, &s.nup);
        assert!(titulo.contains("DEVOLVIDO"));
        assert!(mensagem.contains("Ajustar itens"));

        let aprovacao = planejar_transicao(&s, &payload(A::Aprovar), &perfil(P::Gestor)).unwrap();
        assert_eq!(
            destino_notificacao(&aprovacao, suprido.id),
            DestinoNotificacao::Fila(P::Sosfu)
        );
    }

    #[test]
    fn draft_edit_submit_and_manager_approval() {
        let suprido = perfil(P::Suprido);
        let gestor = perfil(P::Gestor);
        let mut historico = Vec::new();

        // Rascunho com R$ 450,00 em duas linhas
        let mut s = solicitacao(&suprido, vec![item("Material", "300.00"), item("Lanche", "150.00")]);
        assert_eq!(s.status, S::Rascunho);
        assert_eq!(s.valor_solicitado, dec("450.00"));
        assert!(historico.is_empty());

        // Edição do rascunho não tramita
        s.descricao = "Material e lanche para mutirão".into();
        s.versao += 1;

        // Envio ao gestor
        let plano = planejar_transicao(&s, &payload(A::Submeter), &suprido).unwrap();
        aplicar(&mut s, &plano, &mut historico);
        assert_eq!((s.status, s.destino_atual), (S::PendenteAtesto, P::Gestor));
        assert_eq!(historico.len(), 1);

        // Aprovação do gestor
        let antes = historico.len();
        let plano = planejar_transicao(&s, &payload(A::Aprovar), &gestor).unwrap();
        aplicar(&mut s, &plano, &mut historico);

        assert_eq!((s.status, s.destino_atual), (S::Aprovado, P::Sosfu));
        assert_eq!(historico.len(), antes + 1);
        let ultimo = historico.last().unwrap();
        assert_eq!(ultimo.status_anterior, S::PendenteAtesto);
        assert_eq!(ultimo.status_novo, S::Aprovado);
        assert_eq!(ultimo.acao, A::Aprovar);
    }

    #[test]
    fn failed_transition_leaves_no_history() {
        let suprido = perfil(P::Suprido);
        let mut historico = Vec::new();
        let mut s = solicitacao(&suprido, vec![item("Material", "300.00")]);

        // Aprovar um rascunho é inválido: nada muda, nada é registrado
        let antes = (s.status, s.destino_atual, s.versao);
        if let Ok(plano) = planejar_transicao(&s, &payload(A::Aprovar), &suprido) {
            aplicar(&mut s, &plano, &mut historico);
        }
        assert_eq!((s.status, s.destino_atual, s.versao), antes);
        assert!(historico.is_empty());
    }

    #[test]
    fn full_lifecycle_reaches_archive() {
        let suprido = perfil(P::Suprido);
        let mut historico = Vec::new();
        let mut s = solicitacao(&suprido, vec![item("Material", "300.00"), item("Lanche", "150.00")]);

        let roteiro = [
            A::Submeter,
            A::Aprovar,
            A::EncaminharSefin,
            A::Conceder,
            A::LiberarRecurso,
            A::ConfirmarRecebimento,
            A::EnviarPrestacao,
            A::AtestarPrestacao,
            A::Arquivar,
        ];
        for acao in roteiro {
            let ator = ator_para(&s, &suprido);
            let plano = planejar_transicao(&s, &payload_completo(acao), &ator).unwrap();
            aplicar(&mut s, &plano, &mut historico);
        }

        assert_eq!(s.status, S::Arquivado);
        assert_eq!(historico.len(), roteiro.len());
        assert_eq!(s.numero_portaria.as_deref(), Some("77/2026-GP"));
        assert_eq!(s.valor_concedido, Some(dec("450.00")));
        assert!(acoes_disponiveis(&s, &perfil(P::Sosfu)).is_empty());
    }

    #[test]
    fn sefin_return_bounces_through_ajsefin() {
        let suprido = perfil(P::Suprido);
        let mut historico = Vec::new();
        let mut s = solicitacao(&suprido, vec![item("Material", "300.00")]);
        s.status = S::AguardandoAutorizacao;
        s.destino_atual = P::Sefin;

        let plano = planejar_transicao(&s, &payload_completo(A::Devolver), &perfil(P::Sefin)).unwrap();
        aplicar(&mut s, &plano, &mut historico);
        assert_eq!((s.status, s.destino_atual), (S::Devolvido, P::Ajsefin));

        let ajsefin = perfil(P::Ajsefin);
        let acoes: Vec<_> = acoes_disponiveis(&s, &ajsefin).into_iter().map(|t| t.acao).collect();
        assert_eq!(acoes, vec![A::Reencaminhar, A::Devolver]);

        let plano = planejar_transicao(&s, &payload(A::Reencaminhar), &ajsefin).unwrap();
        aplicar(&mut s, &plano, &mut historico);
        assert_eq!((s.status, s.destino_atual), (S::AguardandoAutorizacao, P::Sefin));
    }
}
