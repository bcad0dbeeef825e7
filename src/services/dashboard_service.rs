// src/services/dashboard_service.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, NotificacaoRepository},
    models::{
        auth::Profile,
        dashboard::{ResumoFila, ResumoStatus},
        tramitacao::Papel,
    },
};

pub fn consolidar_resumo(papel: Papel, por_status: Vec<ResumoStatus>, notificacoes_nao_lidas: i64) -> ResumoFila {
    let total_quantidade: i64 = por_status.iter().map(|r| r.quantidade).sum();
    let total_valor = por_status.iter().map(|r| r.valor_total).sum::<Decimal>();
    ResumoFila {
        papel,
        por_status,
        total_quantidade,
        total_valor,
        notificacoes_nao_lidas,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    notificacao_repo: NotificacaoRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, notificacao_repo: NotificacaoRepository) -> Self {
        Self { repo, notificacao_repo }
    }

    /// Contagem e valor por status da fila do ator.
    pub async fn resumo(&self, ator: &Profile) -> Result<ResumoFila, AppError> {
        let por_status = match ator.papel {
            Papel::Suprido => self.repo.resumo_por_suprido(ator.id).await?,
            papel => self.repo.resumo_por_destino(papel).await?,
        };
        let nao_lidas = self.notificacao_repo.count_unread(ator.id, ator.papel).await?;
        Ok(consolidar_resumo(ator.papel, por_status, nao_lidas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tramitacao::StatusSolicitacao;
    use std::str::FromStr;

    #[test]
    fn totals_add_up_every_status() {
        let linhas = vec![
            ResumoStatus {
                status: StatusSolicitacao::PendenteAtesto,
                quantidade: 3,
                valor_total: Decimal::from_str("1350.00").unwrap(),
            },
            ResumoStatus {
                status: StatusSolicitacao::PcEmAnalise,
                quantidade: 1,
                valor_total: Decimal::from_str("450.00").unwrap(),
            },
        ];
        let r = consolidar_resumo(Papel::Gestor, linhas, 2);
        assert_eq!(r.total_quantidade, 4);
        assert_eq!(r.total_valor, Decimal::from_str("1800.00").unwrap());
        assert_eq!(r.notificacoes_nao_lidas, 2);
    }

    #[test]
    fn empty_queue_sums_to_zero() {
        let r = consolidar_resumo(Papel::Sefin, vec![], 0);
        assert_eq!(r.total_quantidade, 0);
        assert_eq!(r.total_valor, Decimal::ZERO);
    }
}
