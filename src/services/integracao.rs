// src/services/integracao.rs
//
// Fluxos completos contra o Postgres: cada #[sqlx::test] recebe um banco novo,
// já migrado, criado a partir de DATABASE_URL.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_trigger_error, AppError},
    config::{AppState, Config},
    db::{NotificacaoRepository, ProfileRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        documento::{AtualizarDocumentoPayload, GerarDocumentoPayload, StatusDocumento, TipoDocumento},
        lote::{GerarLotePayload, LinhaDistribuicao, SituacaoUnidadeLote, UnidadeLote},
        notificacao::DestinoNotificacao,
        solicitacao::{CriarSolicitacaoPayload, Solicitacao, TipoSuprimento},
        tramitacao::{AcaoTramitacao, Papel, StatusSolicitacao},
        unidade::{CriarUnidadePayload, DesignarTitularPayload, TipoTitularidade, Unidade},
    },
    services::tramitacao_service::tests::{dec, item, payload},
};

fn estado(pool: &PgPool) -> AppState {
    let config = Config {
        database_url: String::new(),
        jwt_secret: "segredo-jwt-de-teste".into(),
        signature_secret: "segredo-do-selo-de-teste".into(),
        bind_addr: "127.0.0.1:0".into(),
        database_max_connections: 5,
        fonts_dir: "./fonts".into(),
    };
    AppState::from_pool(config, pool.clone()).unwrap()
}

async fn perfil_com_email(pool: &PgPool, papel: Papel, email: &str) -> AuthenticatedUser {
    let repo = ProfileRepository::new(pool.clone());
    let criado = repo
        .create_profile(pool, email, "hash-nao-usado", "Servidor de Teste")
        .await
        .unwrap();
    let perfil = if papel == Papel::Suprido {
        criado
    } else {
        repo.update_papel(criado.id, papel).await.unwrap()
    };
    AuthenticatedUser(perfil)
}

async fn perfil(pool: &PgPool, papel: Papel) -> AuthenticatedUser {
    perfil_com_email(pool, papel, &format!("{}@tjpa.jus.br", Uuid::new_v4())).await
}

async fn recarregar(pool: &PgPool, user: &AuthenticatedUser) -> AuthenticatedUser {
    let perfil = ProfileRepository::new(pool.clone())
        .find_by_id(pool, user.0.id)
        .await
        .unwrap()
        .unwrap();
    AuthenticatedUser(perfil)
}

async fn rascunho(state: &AppState, suprido: &AuthenticatedUser) -> Solicitacao {
    let criar = CriarSolicitacaoPayload {
        tipo: TipoSuprimento::ExtraEmergencial,
        descricao: "Material para a sessão do júri".into(),
        unidade_id: None,
        itens: vec![item("Papel A4", "300.00"), item("Café", "150.00")],
        dados_extras: None,
        enviar: false,
    };
    state.solicitacao_service.criar(suprido, &criar).await.unwrap()
}

async fn historicos(pool: &PgPool, solicitacao_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM historico_tramitacao WHERE solicitacao_id = $1")
        .bind(solicitacao_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn unidade_com_titular(
    state: &AppState,
    sosfu: &AuthenticatedUser,
    titular: &AuthenticatedUser,
) -> Unidade {
    let unidade = state
        .unidade_service
        .criar(&CriarUnidadePayload {
            codigo: "0042".into(),
            nome: "Vara Única de Salinópolis".into(),
            comarca: "Salinópolis".into(),
        })
        .await
        .unwrap();
    state
        .unidade_service
        .designar_titular(sosfu, unidade.id, &designacao(titular.0.id))
        .await
        .unwrap()
}

fn designacao(titular_id: Uuid) -> DesignarTitularPayload {
    DesignarTitularPayload {
        tipo: TipoTitularidade::Ordinario,
        titular_id,
        portaria: "312/2026-GP".into(),
        data_portaria: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
    }
}

fn lote(unidade_id: Uuid, autorizado: &str, linhas: &[&str]) -> GerarLotePayload {
    GerarLotePayload {
        competencia: "2026-Q1".into(),
        unidades: vec![UnidadeLote {
            unidade_id,
            valor_autorizado: dec(autorizado),
            distribuicao: linhas
                .iter()
                .map(|v| LinhaDistribuicao {
                    elemento_despesa: "3.3.90.30".into(),
                    descricao: None,
                    valor: dec(v),
                })
                .collect(),
        }],
    }
}

#[sqlx::test]
async fn each_transition_writes_exactly_one_history_row(pool: PgPool) {
    let state = estado(&pool);
    let suprido = perfil(&pool, Papel::Suprido).await;
    let gestor = perfil(&pool, Papel::Gestor).await;
    let s = rascunho(&state, &suprido).await;
    assert_eq!(historicos(&pool, s.id).await, 0);

    let enviada = state
        .tramitacao_service
        .tramitar(&suprido, s.id, &payload(AcaoTramitacao::Submeter))
        .await
        .unwrap();
    assert_eq!(
        (enviada.status, enviada.destino_atual),
        (StatusSolicitacao::PendenteAtesto, Papel::Gestor)
    );
    assert_eq!(enviada.versao, s.versao + 1);
    assert_eq!(historicos(&pool, s.id).await, 1);

    // Recusas não deixam rastro
    let outro = perfil(&pool, Papel::Suprido).await;
    assert!(matches!(
        state.tramitacao_service.tramitar(&outro, s.id, &payload(AcaoTramitacao::Aprovar)).await,
        Err(AppError::NaoEhResponsavel)
    ));
    assert!(matches!(
        state.tramitacao_service.tramitar(&gestor, s.id, &payload(AcaoTramitacao::Devolver)).await,
        Err(AppError::RegraDeNegocio(_))
    ));
    let mut desatualizada = payload(AcaoTramitacao::Aprovar);
    desatualizada.versao_esperada = Some(s.versao);
    assert!(matches!(
        state.tramitacao_service.tramitar(&gestor, s.id, &desatualizada).await,
        Err(AppError::ConflitoDeVersao { .. })
    ));
    assert_eq!(historicos(&pool, s.id).await, 1);

    let aprovada = state
        .tramitacao_service
        .tramitar(&gestor, s.id, &payload(AcaoTramitacao::Aprovar))
        .await
        .unwrap();
    assert_eq!(
        (aprovada.status, aprovada.destino_atual),
        (StatusSolicitacao::Aprovado, Papel::Sosfu)
    );

    let historico = state.tramitacao_service.historico(&suprido.0, s.id).await.unwrap();
    assert_eq!(historico.len(), 2);
    let ultimo = &historico[1];
    assert_eq!(ultimo.status_anterior, Some(StatusSolicitacao::PendenteAtesto));
    assert_eq!(ultimo.status_novo, StatusSolicitacao::Aprovado);
    assert_eq!(ultimo.ator_id, gestor.0.id);
}

#[sqlx::test]
async fn signed_document_is_frozen(pool: PgPool) {
    let state = estado(&pool);
    let suprido = perfil(&pool, Papel::Suprido).await;
    let gestor = perfil(&pool, Papel::Gestor).await;
    let s = rascunho(&state, &suprido).await;

    let doc = state
        .documento_service
        .gerar(
            &suprido.0,
            s.id,
            &GerarDocumentoPayload {
                tipo: TipoDocumento::Requerimento,
                nome: None,
            },
        )
        .await
        .unwrap();

    let edicao = AtualizarDocumentoPayload {
        nome: None,
        conteudo: Some("Texto revisado do requerimento".into()),
    };
    assert!(matches!(
        state.documento_service.atualizar(&gestor, doc.id, &edicao).await,
        Err(AppError::NaoEhResponsavel)
    ));
    let editado = state.documento_service.atualizar(&suprido, doc.id, &edicao).await.unwrap();
    assert_eq!(editado.conteudo, "Texto revisado do requerimento");

    state.auth_service.definir_pin(suprido.0.id, "4821").await.unwrap();
    let suprido = recarregar(&pool, &suprido).await;
    let assinado = state.documento_service.assinar(&suprido, doc.id, "4821").await.unwrap();
    assert_eq!(assinado.status, StatusDocumento::Assinado);

    assert!(matches!(
        state.documento_service.atualizar(&suprido, doc.id, &edicao).await,
        Err(AppError::DocumentoAssinado)
    ));
    assert!(matches!(
        state.documento_service.excluir(&suprido, doc.id).await,
        Err(AppError::DocumentoAssinado)
    ));

    // Nem por fora do serviço
    let direto = sqlx::query("UPDATE documentos SET conteudo = 'adulterado' WHERE id = $1")
        .bind(doc.id)
        .execute(&pool)
        .await
        .map_err(map_trigger_error);
    assert!(matches!(direto, Err(AppError::DocumentoAssinado)));

    let verificacao = state.documento_service.verificar(&suprido.0, doc.id).await.unwrap();
    assert!(verificacao.assinado);
    assert!(verificacao.integro);
}

#[sqlx::test]
async fn repeated_batch_creates_no_duplicate(pool: PgPool) {
    let state = estado(&pool);
    let sosfu = perfil(&pool, Papel::Sosfu).await;
    let titular = perfil(&pool, Papel::Suprido).await;
    let unidade = unidade_com_titular(&state, &sosfu, &titular).await;

    // 999,99 contra 1.000,00 autorizados: dentro da tolerância
    let pedido = lote(unidade.id, "1000.00", &["999.99"]);

    let primeiro = state.lote_service.gerar_lote(&sosfu, &pedido).await.unwrap();
    assert_eq!((primeiro.criadas, primeiro.ignoradas), (1, 0));
    let segundo = state.lote_service.gerar_lote(&sosfu, &pedido).await.unwrap();
    assert_eq!((segundo.criadas, segundo.ignoradas), (0, 1));

    let (quantidade, valor): (i64, Option<Decimal>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(valor_solicitado) FROM solicitacoes WHERE unidade_id = $1 AND competencia = '2026-Q1'",
    )
    .bind(unidade.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(quantidade, 1);
    // O total acompanha os itens, não o valor autorizado
    assert_eq!(valor, Some(dec("999.99")));

    let solicitacao_id = primeiro.unidades[0].solicitacao_id.unwrap();
    let criada = state.solicitacao_service.obter(&titular.0, solicitacao_id).await.unwrap();
    assert_eq!(criada.solicitacao.suprido_id, titular.0.id);
    assert_eq!(
        (criada.solicitacao.status, criada.solicitacao.destino_atual),
        (StatusSolicitacao::AguardandoAutorizacao, Papel::Sefin)
    );
    assert_eq!(criada.historico.len(), 1);
    assert_eq!(state.documento_service.listar(&titular.0, solicitacao_id).await.unwrap().len(), 3);
}

#[sqlx::test]
async fn unit_holder_must_stay_a_requester(pool: PgPool) {
    let state = estado(&pool);
    let sosfu = perfil(&pool, Papel::Sosfu).await;
    let titular = perfil(&pool, Papel::Suprido).await;
    let gestor = perfil(&pool, Papel::Gestor).await;
    let unidade = unidade_com_titular(&state, &sosfu, &titular).await;

    assert!(matches!(
        state.unidade_service.designar_titular(&sosfu, unidade.id, &designacao(gestor.0.id)).await,
        Err(AppError::RegraDeNegocio(_))
    ));
    assert!(matches!(
        state.auth_service.alterar_papel(&sosfu.0, titular.0.id, Papel::Gestor).await,
        Err(AppError::RegraDeNegocio(_))
    ));

    // Papel trocado por fora: o lote recusa a unidade em vez de gerar um processo travado
    ProfileRepository::new(pool.clone())
        .update_papel(titular.0.id, Papel::Gestor)
        .await
        .unwrap();
    let resultado = state
        .lote_service
        .gerar_lote(&sosfu, &lote(unidade.id, "500.00", &["500.00"]))
        .await
        .unwrap();
    assert_eq!(resultado.rejeitadas, 1);
    assert_eq!(resultado.unidades[0].situacao, SituacaoUnidadeLote::Rejeitada);
}

#[sqlx::test]
async fn queue_notifications_are_read_per_user(pool: PgPool) {
    let state = estado(&pool);
    let ana = perfil(&pool, Papel::Sosfu).await;
    let bruno = perfil(&pool, Papel::Sosfu).await;

    let aviso = NotificacaoRepository::new(pool.clone())
        .insert(
            &pool,
            DestinoNotificacao::Fila(Papel::Sosfu),
            None,
            "Solicitação aprovada",
            "Há uma solicitação aguardando análise técnica.",
        )
        .await
        .unwrap();
    assert!(!aviso.lida);

    state.notificacao_service.marcar_lida(&ana.0, aviso.id).await.unwrap();
    // Repetir não é erro
    state.notificacao_service.marcar_lida(&ana.0, aviso.id).await.unwrap();

    let da_ana = state.notificacao_service.minhas(&ana.0).await.unwrap();
    let do_bruno = state.notificacao_service.minhas(&bruno.0).await.unwrap();
    assert!(da_ana.iter().find(|n| n.id == aviso.id).unwrap().lida);
    assert!(!do_bruno.iter().find(|n| n.id == aviso.id).unwrap().lida);

    assert_eq!(state.dashboard_service.resumo(&ana.0).await.unwrap().notificacoes_nao_lidas, 0);
    assert_eq!(state.dashboard_service.resumo(&bruno.0).await.unwrap().notificacoes_nao_lidas, 1);

    let suprido = perfil(&pool, Papel::Suprido).await;
    assert!(matches!(
        state.notificacao_service.marcar_lida(&suprido.0, aviso.id).await,
        Err(AppError::ResourceNotFound(_))
    ));
}

#[sqlx::test]
async fn merge_skips_emails_with_several_hr_records(pool: PgPool) {
    let state = estado(&pool);
    let sosfu = perfil(&pool, Papel::Sosfu).await;
    let ana = perfil_com_email(&pool, Papel::Suprido, "ana@tjpa.jus.br").await;
    let carlos = perfil_com_email(&pool, Papel::Suprido, "carlos@tjpa.jus.br").await;

    state
        .servidor_service
        .importar(
            &sosfu,
            "rh_janeiro.csv",
            "matricula;nome;email;cargo\n100;Ana Paula;ana@tjpa.jus.br;Analista\n300;Carlos Lima;carlos@tjpa.jus.br;Técnico\n",
        )
        .await
        .unwrap();
    // Outro arquivo traz a mesma caixa de e-mail com outra matrícula
    state
        .servidor_service
        .importar(&sosfu, "rh_fevereiro.csv", "matricula;nome;email\n200;Ana Lúcia;ANA@tjpa.jus.br\n")
        .await
        .unwrap();

    let sincronizacao = state.servidor_service.sincronizar_perfis(&sosfu).await.unwrap();
    assert_eq!(sincronizacao.perfis_atualizados, 1);
    assert_eq!(sincronizacao.emails_ambiguos, vec!["ana@tjpa.jus.br".to_string()]);

    let ana = recarregar(&pool, &ana).await;
    assert_eq!(ana.0.nome, "Servidor de Teste");
    assert!(ana.0.matricula.is_none());

    let carlos = recarregar(&pool, &carlos).await;
    assert_eq!(carlos.0.nome, "Carlos Lima");
    assert_eq!(carlos.0.matricula.as_deref(), Some("300"));
    assert_eq!(carlos.0.cargo.as_deref(), Some("Técnico"));
}
