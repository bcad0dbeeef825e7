// src/services/documento_service.rs

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use genpdf::{elements, style, Element};
use hmac::{Hmac, Mac};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{
        documento_repo::DadosAssinatura, DocumentoRepository, ProfileRepository,
        SolicitacaoRepository, UnidadeRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Profile,
        documento::{
            AtualizarDocumentoPayload, Documento, GerarDocumentoPayload, StatusDocumento,
            TipoDocumento, VerificacaoAssinatura,
        },
        solicitacao::Solicitacao,
        unidade::Unidade,
    },
    services::{auth::verify_blocking, tramitacao_service::pode_visualizar},
};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
//  CONTEÚDO
// =============================================================================

/// `R$ 1.234,56`
pub fn formatar_reais(valor: Decimal) -> String {
    let v = valor.round_dp(2);
    let sinal = if v.is_sign_negative() { "-" } else { "" };
    let texto = format!("{:.2}", v.abs());
    let (inteiro, centavos) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let mut agrupado = String::with_capacity(inteiro.len() + inteiro.len() / 3);
    for (i, c) in inteiro.chars().enumerate() {
        if i > 0 && (inteiro.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(c);
    }
    format!("{}R$ {},{}", sinal, agrupado, centavos)
}

/// Texto-base da minuta, a partir dos dados da solicitação.
pub fn renderizar_conteudo(
    tipo: TipoDocumento,
    solicitacao: &Solicitacao,
    suprido: &Profile,
    unidade: Option<&Unidade>,
    hoje: NaiveDate,
) -> String {
    let mut linhas = vec![
        "TRIBUNAL DE JUSTIÇA DO ESTADO DO PARÁ".to_string(),
        "Secretaria de Planejamento, Coordenação e Finanças".to_string(),
        String::new(),
        tipo.titulo().to_uppercase(),
        format!("Processo: {}", solicitacao.nup),
        String::new(),
    ];

    let lotacao = unidade
        .map(|u| format!("{} (Comarca de {})", u.nome, u.comarca))
        .unwrap_or_else(|| "não informada".to_string());
    let matricula = suprido.matricula.as_deref().unwrap_or("não informada");
    let cargo = suprido.cargo.as_deref().unwrap_or("servidor(a)");
    let valor = formatar_reais(solicitacao.valor_solicitado);

    match tipo {
        TipoDocumento::Capa => {
            linhas.push(format!("Interessado(a): {}", suprido.nome));
            linhas.push(format!("Unidade: {}", lotacao));
            linhas.push(format!("Modalidade: Suprimento de Fundos {}", solicitacao.tipo.label()));
            if let Some(c) = &solicitacao.competencia {
                linhas.push(format!("Competência: {}", c));
            }
            linhas.push(format!("Valor: {}", valor));
            linhas.push(format!("Autuado em: {}", hoje.format("%d/%m/%Y")));
        }
        TipoDocumento::Requerimento => {
            linhas.push(format!(
                "Eu, {}, matrícula {}, {}, lotado(a) em {}, requeiro a concessão de \
                 suprimento de fundos na modalidade {}, no valor de {}, para atender \
                 às despesas abaixo discriminadas.",
                suprido.nome,
                matricula,
                cargo,
                lotacao,
                solicitacao.tipo.label(),
                valor
            ));
            linhas.push(String::new());
            linhas.push(format!("Justificativa: {}", solicitacao.descricao));
            linhas.push(String::new());
            for (i, item) in solicitacao.itens.0.iter().enumerate() {
                let elemento = item.elemento_despesa.as_deref().unwrap_or("-");
                linhas.push(format!(
                    "{}. {} [{}] {}",
                    i + 1,
                    item.descricao,
                    elemento,
                    formatar_reais(item.valor)
                ));
            }
            linhas.push(format!("Total: {}", valor));
        }
        TipoDocumento::Portaria => {
            let numero = solicitacao.numero_portaria.as_deref().unwrap_or("____/____");
            let concedido = solicitacao
                .valor_concedido
                .map(formatar_reais)
                .unwrap_or_else(|| valor.clone());
            linhas.push(format!("PORTARIA Nº {}", numero));
            linhas.push(String::new());
            linhas.push(format!(
                "O(A) Secretário(a) de Planejamento, Coordenação e Finanças, no uso de suas \
                 atribuições, RESOLVE conceder a {}, matrícula {}, suprimento de fundos na \
                 modalidade {}, no valor de {}, com prazo de aplicação de 90 (noventa) dias \
                 e prestação de contas em até 30 (trinta) dias após o término da aplicação.",
                suprido.nome,
                matricula,
                solicitacao.tipo.label(),
                concedido
            ));
        }
        TipoDocumento::CertidaoAtesto => {
            linhas.push(format!(
                "Atesto, para os devidos fins, que as despesas do processo {}, no valor de {}, \
                 foram realizadas no interesse do serviço da unidade {}.",
                solicitacao.nup, valor, lotacao
            ));
        }
        TipoDocumento::NotaEmpenho => {
            linhas.push(format!("Credor: {} (matrícula {})", suprido.nome, matricula));
            linhas.push(format!("Valor a empenhar: {}", valor));
            for item in solicitacao.itens.0.iter() {
                if let Some(elemento) = &item.elemento_despesa {
                    linhas.push(format!("Elemento {}: {}", elemento, formatar_reais(item.valor)));
                }
            }
        }
        TipoDocumento::Despacho => {
            linhas.push(format!(
                "Encaminhem-se os autos do processo {} para prosseguimento. Situação atual: {}.",
                solicitacao.nup,
                solicitacao.status.label()
            ));
        }
    }

    linhas.push(String::new());
    linhas.push(format!("Belém, {}.", hoje.format("%d/%m/%Y")));
    linhas.join("\n")
}

// =============================================================================
//  ASSINATURA
// =============================================================================

/// SHA-256 (hex) do conteúdo.
pub fn content_hash(conteudo: &str) -> String {
    hex::encode(Sha256::digest(conteudo.as_bytes()))
}

fn mensagem_selo(documento_id: Uuid, assinante_id: Uuid, hash: &str, assinado_em: DateTime<Utc>) -> String {
    format!(
        "{}|{}|{}|{}",
        documento_id,
        assinante_id,
        hash,
        assinado_em.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}

fn mac_selo(
    secret: &str,
    documento_id: Uuid,
    assinante_id: Uuid,
    hash: &str,
    assinado_em: DateTime<Utc>,
) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Chave de assinatura inválida: {}", e))?;
    mac.update(mensagem_selo(documento_id, assinante_id, hash, assinado_em).as_bytes());
    Ok(mac)
}

/// Selo HMAC-SHA256 (hex) que amarra documento, assinante, conteúdo e instante.
pub fn selo(
    secret: &str,
    documento_id: Uuid,
    assinante_id: Uuid,
    hash: &str,
    assinado_em: DateTime<Utc>,
) -> Result<String, AppError> {
    let mac = mac_selo(secret, documento_id, assinante_id, hash, assinado_em)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recalcula hash e selo de um documento assinado. Minuta nunca é íntegra.
pub fn conferir(secret: &str, doc: &Documento) -> bool {
    let (Some(hash), Some(assinatura), Some(assinante), Some(em)) = (
        doc.content_hash.as_deref(),
        doc.assinatura.as_deref(),
        doc.assinado_por,
        doc.assinado_em,
    ) else {
        return false;
    };

    if doc.status != StatusDocumento::Assinado || content_hash(&doc.conteudo) != hash {
        return false;
    }

    let Ok(bytes) = hex::decode(assinatura) else {
        return false;
    };
    match mac_selo(secret, doc.id, assinante, hash, em) {
        Ok(mac) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

pub fn linha_assinatura(doc: &Documento) -> Option<String> {
    let nome = doc.assinante_nome.as_deref()?;
    let em = doc.assinado_em?;
    let cargo = doc
        .assinante_cargo
        .as_deref()
        .map(|c| format!(", {}", c))
        .unwrap_or_default();
    Some(format!(
        "ASSINADO ELETRONICAMENTE por {}{} em {} (UTC)",
        nome,
        cargo,
        em.format("%d/%m/%Y às %H:%M:%S")
    ))
}

/// O que vai no QR code: id do documento e início do selo.
pub fn codigo_verificacao(doc: &Documento) -> Option<String> {
    let assinatura = doc.assinatura.as_deref()?;
    let prefixo: String = assinatura.chars().take(16).collect();
    Some(format!("TJPA-SF:{}:{}", doc.id, prefixo.to_uppercase()))
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct DocumentoService {
    pool: PgPool,
    documento_repo: DocumentoRepository,
    solicitacao_repo: SolicitacaoRepository,
    profile_repo: ProfileRepository,
    unidade_repo: UnidadeRepository,
    signature_secret: String,
    fonts_dir: String,
}

impl DocumentoService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        documento_repo: DocumentoRepository,
        solicitacao_repo: SolicitacaoRepository,
        profile_repo: ProfileRepository,
        unidade_repo: UnidadeRepository,
        signature_secret: String,
        fonts_dir: String,
    ) -> Self {
        Self {
            pool,
            documento_repo,
            solicitacao_repo,
            profile_repo,
            unidade_repo,
            signature_secret,
            fonts_dir,
        }
    }

    async fn solicitacao_visivel(&self, ator: &Profile, solicitacao_id: Uuid) -> Result<Solicitacao, AppError> {
        self.solicitacao_repo
            .find_by_id(&self.pool, solicitacao_id)
            .await?
            .filter(|s| pode_visualizar(s, ator))
            .ok_or_else(|| AppError::ResourceNotFound(format!("Solicitação {}", solicitacao_id)))
    }

    async fn documento_visivel(&self, ator: &Profile, id: Uuid) -> Result<Documento, AppError> {
        let doc = self
            .documento_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Documento {}", id)))?;
        self.solicitacao_visivel(ator, doc.solicitacao_id).await?;
        Ok(doc)
    }

    pub async fn gerar(
        &self,
        ator: &Profile,
        solicitacao_id: Uuid,
        payload: &GerarDocumentoPayload,
    ) -> Result<Documento, AppError> {
        let solicitacao = self.solicitacao_visivel(ator, solicitacao_id).await?;

        let suprido = self
            .profile_repo
            .find_by_id(&self.pool, solicitacao.suprido_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let unidade = match solicitacao.unidade_id {
            Some(id) => self.unidade_repo.find_by_id(&self.pool, id).await?,
            None => None,
        };

        let conteudo = renderizar_conteudo(
            payload.tipo,
            &solicitacao,
            &suprido,
            unidade.as_ref(),
            Utc::now().date_naive(),
        );
        let nome = payload
            .nome
            .as_deref()
            .unwrap_or_else(|| payload.tipo.titulo());

        let doc = self
            .documento_repo
            .insert(&self.pool, solicitacao.id, payload.tipo, nome, &conteudo, ator.id)
            .await?;

        tracing::info!("📄 Minuta {} ({:?}) gerada para {}", doc.id, doc.tipo, solicitacao.nup);
        Ok(doc)
    }

    pub async fn listar(&self, ator: &Profile, solicitacao_id: Uuid) -> Result<Vec<Documento>, AppError> {
        self.solicitacao_visivel(ator, solicitacao_id).await?;
        self.documento_repo
            .list_by_solicitacao(&self.pool, solicitacao_id)
            .await
    }

    pub async fn atualizar(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        payload: &AtualizarDocumentoPayload,
    ) -> Result<Documento, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let doc = self.minuta_do_autor(&mut tx, &user.0, id).await?;

        let atualizado = self
            .documento_repo
            .update_minuta(&mut *tx, doc.id, payload.nome.as_deref(), payload.conteudo.as_deref())
            .await?
            .ok_or(AppError::DocumentoAssinado)?;

        tx.commit().await?;
        Ok(atualizado)
    }

    pub async fn excluir(&self, user: &AuthenticatedUser, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;

        let doc = self.minuta_do_autor(&mut tx, &user.0, id).await?;

        if !self.documento_repo.delete_minuta(&mut *tx, doc.id).await? {
            return Err(AppError::DocumentoAssinado);
        }

        tx.commit().await?;
        tracing::info!("🗑️ Minuta {} excluída por {}", id, user.0.id);
        Ok(())
    }

    async fn minuta_do_autor(
        &self,
        tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
        ator: &Profile,
        id: Uuid,
    ) -> Result<Documento, AppError> {
        let doc = self
            .documento_repo
            .find_for_update(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Documento {}", id)))?;

        if doc.status == StatusDocumento::Assinado {
            return Err(AppError::DocumentoAssinado);
        }
        if doc.created_by != ator.id {
            return Err(AppError::NaoEhResponsavel);
        }
        Ok(doc)
    }

    /// Confere o PIN e sela o conteúdo atual. Depois disso o documento é imutável.
    pub async fn assinar(&self, user: &AuthenticatedUser, id: Uuid, pin: &str) -> Result<Documento, AppError> {
        let ator = &user.0;
        let pin_hash = ator
            .signature_pin_hash
            .as_deref()
            .ok_or(AppError::PinNaoDefinido)?;

        if !verify_blocking(pin, pin_hash).await? {
            tracing::warn!("PIN incorreto na assinatura do documento {} por {}", id, ator.id);
            return Err(AppError::PinIncorreto);
        }

        let mut tx = begin_audited(&self.pool, user).await?;

        let doc = self
            .documento_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Documento {}", id)))?;

        let solicitacao = self
            .solicitacao_repo
            .find_by_id(&mut *tx, doc.solicitacao_id)
            .await?
            .filter(|s| pode_visualizar(s, ator))
            .ok_or_else(|| AppError::ResourceNotFound(format!("Documento {}", id)))?;

        if doc.status == StatusDocumento::Assinado {
            return Err(AppError::DocumentoAssinado);
        }

        // O banco guarda microssegundos; o selo precisa do mesmo instante que será relido.
        let assinado_em = Utc::now().trunc_subsecs(6);
        let hash = content_hash(&doc.conteudo);
        let assinatura = selo(&self.signature_secret, doc.id, ator.id, &hash, assinado_em)?;

        let assinado = self
            .documento_repo
            .mark_signed(
                &mut *tx,
                doc.id,
                &DadosAssinatura {
                    content_hash: &hash,
                    assinatura: &assinatura,
                    assinado_por: ator.id,
                    assinante_nome: &ator.nome,
                    assinante_cargo: ator.cargo.as_deref(),
                    assinado_em,
                },
            )
            .await?
            .ok_or(AppError::DocumentoAssinado)?;

        tx.commit().await?;

        tracing::info!(
            "✍️ Documento {} do processo {} assinado por {}",
            assinado.id,
            solicitacao.nup,
            ator.id
        );
        Ok(assinado)
    }

    pub async fn verificar(&self, ator: &Profile, id: Uuid) -> Result<VerificacaoAssinatura, AppError> {
        let doc = self.documento_visivel(ator, id).await?;
        let integro = conferir(&self.signature_secret, &doc);
        if doc.status == StatusDocumento::Assinado && !integro {
            tracing::warn!("Documento {} com selo divergente", doc.id);
        }

        Ok(VerificacaoAssinatura {
            documento_id: doc.id,
            assinado: doc.status == StatusDocumento::Assinado,
            integro,
            content_hash: doc.content_hash,
            assinante_nome: doc.assinante_nome,
            assinado_em: doc.assinado_em,
        })
    }

    pub async fn exportar_pdf(&self, ator: &Profile, id: Uuid) -> Result<(Documento, Vec<u8>), AppError> {
        let doc = self.documento_visivel(ator, id).await?;
        let pdf = self.renderizar_pdf(&doc)?;
        Ok((doc, pdf))
    }

    fn renderizar_pdf(&self, doc: &Documento) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(format!("Fonte Roboto não encontrada em {}", self.fonts_dir)))?;

        let mut pdf = genpdf::Document::new(font_family);
        pdf.set_title(doc.nome.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(15);
        pdf.set_page_decorator(decorator);

        pdf.push(
            elements::Paragraph::new(doc.nome.to_uppercase())
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        if doc.status == StatusDocumento::Minuta {
            pdf.push(
                elements::Paragraph::new("MINUTA - SEM VALOR DE DOCUMENTO ASSINADO")
                    .styled(style::Style::new().italic().with_font_size(9)),
            );
        }
        pdf.push(elements::Break::new(1.5));

        for linha in doc.conteudo.lines() {
            if linha.trim().is_empty() {
                pdf.push(elements::Break::new(0.5));
            } else {
                pdf.push(elements::Paragraph::new(linha).styled(style::Style::new().with_font_size(10)));
            }
        }

        // --- BLOCO DE ASSINATURA ---
        if let (Some(linha), Some(codigo)) = (linha_assinatura(doc), codigo_verificacao(doc)) {
            pdf.push(elements::Break::new(2));
            pdf.push(elements::Paragraph::new(linha).styled(style::Style::new().bold().with_font_size(9)));
            if let Some(hash) = &doc.content_hash {
                pdf.push(
                    elements::Paragraph::new(format!("Hash SHA-256 do conteúdo: {}", hash))
                        .styled(style::Style::new().with_font_size(7)),
                );
            }
            pdf.push(
                elements::Paragraph::new(format!("Código de verificação: {}", codigo))
                    .styled(style::Style::new().with_font_size(7)),
            );
            pdf.push(elements::Break::new(1));

            let code = QrCode::new(codigo.as_bytes())
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
            let qr = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
                .with_scale(genpdf::Scale::new(0.4, 0.4));
            pdf.push(qr);
        }

        let mut buffer = Vec::new();
        pdf.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tramitacao::Papel;
    use crate::services::tramitacao_service::tests::{dec, item, perfil, solicitacao};

    const SECRET: &str = "selo-de-teste";

    fn hoje() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn minuta(conteudo: &str) -> Documento {
        Documento {
            id: Uuid::new_v4(),
            solicitacao_id: Uuid::new_v4(),
            tipo: TipoDocumento::Requerimento,
            nome: "Requerimento".into(),
            status: StatusDocumento::Minuta,
            conteudo: conteudo.into(),
            created_by: Uuid::new_v4(),
            content_hash: None,
            assinatura: None,
            assinado_por: None,
            assinante_nome: None,
            assinante_cargo: None,
            assinado_em: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assinar_em_memoria(doc: &mut Documento, assinante: &Profile) {
        let em = Utc::now().trunc_subsecs(6);
        let hash = content_hash(&doc.conteudo);
        doc.assinatura = Some(selo(SECRET, doc.id, assinante.id, &hash, em).unwrap());
        doc.content_hash = Some(hash);
        doc.assinado_por = Some(assinante.id);
        doc.assinante_nome = Some(assinante.nome.clone());
        doc.assinante_cargo = assinante.cargo.clone();
        doc.assinado_em = Some(em);
        doc.status = StatusDocumento::Assinado;
    }

    #[test]
    fn money_uses_brazilian_format() {
        assert_eq!(formatar_reais(dec("450")), "R$ 450,00");
        assert_eq!(formatar_reais(dec("1234567.8")), "R$ 1.234.567,80");
        assert_eq!(formatar_reais(dec("0.5")), "R$ 0,50");
        assert_eq!(formatar_reais(dec("-12.346")), "-R$ 12,35");
    }

    #[test]
    fn request_lists_items_and_total() {
        let suprido = perfil(Papel::Suprido);
        let s = solicitacao(&suprido, vec![item("Material", "300.00"), item("Lanche", "150.00")]);
        let texto = renderizar_conteudo(TipoDocumento::Requerimento, &s, &suprido, None, hoje());

        assert!(texto.contains(&s.nup));
        assert!(texto.contains(&suprido.nome));
        assert!(texto.contains("1. Material"));
        assert!(texto.contains("2. Lanche"));
        assert!(texto.contains("Total: R$ 450,00"));
        assert!(texto.contains("10/03/2026"));
    }

    #[test]
    fn ordinance_uses_granted_value_when_present() {
        let suprido = perfil(Papel::Suprido);
        let mut s = solicitacao(&suprido, vec![item("Material", "450.00")]);
        s.numero_portaria = Some("88/2026-GP".into());
        s.valor_concedido = Some(dec("400.00"));
        let texto = renderizar_conteudo(TipoDocumento::Portaria, &s, &suprido, None, hoje());
        assert!(texto.contains("PORTARIA Nº 88/2026-GP"));
        assert!(texto.contains("R$ 400,00"));
    }

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn signed_document_verifies() {
        let assinante = perfil(Papel::Sefin);
        let mut doc = minuta("Conteúdo da portaria");
        assert!(!conferir(SECRET, &doc));

        assinar_em_memoria(&mut doc, &assinante);
        assert!(conferir(SECRET, &doc));
        assert!(linha_assinatura(&doc).unwrap().starts_with("ASSINADO ELETRONICAMENTE por"));
        assert!(codigo_verificacao(&doc).unwrap().contains(&doc.id.to_string()));
    }

    #[test]
    fn tampered_content_or_seal_fails_verification() {
        let assinante = perfil(Papel::Sefin);
        let mut doc = minuta("Conteúdo original");
        assinar_em_memoria(&mut doc, &assinante);

        let mut alterado = doc.clone();
        alterado.conteudo.push_str(" com acréscimo");
        assert!(!conferir(SECRET, &alterado));

        let mut outro_assinante = doc.clone();
        outro_assinante.assinado_por = Some(Uuid::new_v4());
        assert!(!conferir(SECRET, &outro_assinante));

        assert!(!conferir("outro-segredo", &doc));
    }

    #[test]
    fn seal_survives_microsecond_round_trip() {
        let em = Utc::now().trunc_subsecs(6);
        let id = Uuid::new_v4();
        let assinante = Uuid::new_v4();
        let a = selo(SECRET, id, assinante, "h", em).unwrap();
        let relido: DateTime<Utc> = em.to_rfc3339().parse().unwrap();
        assert_eq!(a, selo(SECRET, id, assinante, "h", relido).unwrap());
    }
}
