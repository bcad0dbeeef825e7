// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::definir_pin,
        handlers::auth::alterar_papel,

        // --- Solicitações ---
        handlers::solicitacoes::criar_solicitacao,
        handlers::solicitacoes::listar_solicitacoes,
        handlers::solicitacoes::obter_solicitacao,
        handlers::solicitacoes::atualizar_solicitacao,

        // --- Tramitação ---
        handlers::tramitacao::tramitar,
        handlers::tramitacao::listar_transicoes,
        handlers::tramitacao::historico,

        // --- Documentos ---
        handlers::documentos::gerar_documento,
        handlers::documentos::listar_documentos,
        handlers::documentos::atualizar_documento,
        handlers::documentos::excluir_documento,
        handlers::documentos::assinar_documento,
        handlers::documentos::verificar_documento,
        handlers::documentos::exportar_pdf,

        // --- Lotes ---
        handlers::lotes::gerar_lote,

        // --- Unidades ---
        handlers::unidades::listar_unidades,
        handlers::unidades::criar_unidade,
        handlers::unidades::designar_titular,
        handlers::unidades::historico_titulares,

        // --- Servidores ---
        handlers::servidores::importar_servidores,
        handlers::servidores::listar_importacoes,
        handlers::servidores::sincronizar_perfis,

        // --- Notificações ---
        handlers::notificacoes::minhas_notificacoes,
        handlers::notificacoes::marcar_lida,

        // --- Dashboard ---
        handlers::dashboard::resumo,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Profile,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::DefinirPinPayload,
            models::auth::AlterarPapelPayload,

            // --- Tramitação ---
            models::tramitacao::Papel,
            models::tramitacao::StatusSolicitacao,
            models::tramitacao::AcaoTramitacao,
            models::tramitacao::HistoricoTramitacao,
            models::tramitacao::TramitarPayload,
            models::tramitacao::TransicaoDisponivel,

            // --- Solicitações ---
            models::solicitacao::TipoSuprimento,
            models::solicitacao::ItemDespesa,
            models::solicitacao::Solicitacao,
            models::solicitacao::SolicitacaoDetalhe,
            models::solicitacao::CriarSolicitacaoPayload,
            models::solicitacao::AtualizarSolicitacaoPayload,
            models::solicitacao::FiltroFila,

            // --- Documentos ---
            models::documento::TipoDocumento,
            models::documento::StatusDocumento,
            models::documento::Documento,
            models::documento::GerarDocumentoPayload,
            models::documento::AtualizarDocumentoPayload,
            models::documento::AssinarDocumentoPayload,
            models::documento::VerificacaoAssinatura,

            // --- Lotes ---
            models::lote::LinhaDistribuicao,
            models::lote::UnidadeLote,
            models::lote::GerarLotePayload,
            models::lote::SituacaoUnidadeLote,
            models::lote::ResultadoUnidadeLote,
            models::lote::ResultadoLote,

            // --- Unidades ---
            models::unidade::TipoTitularidade,
            models::unidade::Unidade,
            models::unidade::HistoricoTitular,
            models::unidade::CriarUnidadePayload,
            models::unidade::DesignarTitularPayload,

            // --- Servidores ---
            models::servidor::ServidorTj,
            models::servidor::ImportacaoServidores,
            models::servidor::ImportacaoQuery,
            models::servidor::SincronizacaoPerfis,

            // --- Notificações ---
            models::notificacao::Notificacao,

            // --- Dashboard ---
            models::dashboard::ResumoStatus,
            models::dashboard::ResumoFila,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Perfil, PIN de assinatura e papel"),
        (name = "Solicitações", description = "Pedidos de suprimento de fundos"),
        (name = "Tramitação", description = "Máquina de estados do processo"),
        (name = "Documentos", description = "Minutas, assinatura e PDF"),
        (name = "Lotes", description = "Geração do suprimento ordinário por competência"),
        (name = "Unidades", description = "Comarcas, titulares e histórico"),
        (name = "Servidores", description = "Importação da base de RH"),
        (name = "Notificações", description = "Avisos por usuário e por papel"),
        (name = "Dashboard", description = "Contagens da fila do papel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
