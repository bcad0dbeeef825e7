// src/services/servidor_service.rs

use std::collections::HashMap;

use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    common::{db_utils::begin_audited, error::AppError},
    db::{ProfileRepository, ServidorRepository},
    middleware::auth::AuthenticatedUser,
    models::servidor::{ImportacaoServidores, LinhaServidor, SincronizacaoPerfis},
};

// Registro cru da planilha de RH, antes de validar
#[derive(Debug, Deserialize)]
struct RegistroBruto {
    #[serde(default)]
    matricula: Option<String>,
    #[serde(default)]
    nome: Option<String>,
    #[serde(default)]
    cpf: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    cargo: Option<String>,
    #[serde(default)]
    lotacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinhaRejeitada {
    /// Número da linha no arquivo (o cabeçalho é a linha 1).
    pub linha: usize,
    pub motivo: String,
}

#[derive(Debug, Default)]
pub struct PlanilhaServidores {
    pub validas: Vec<LinhaServidor>,
    pub rejeitadas: Vec<LinhaRejeitada>,
}

/// `;` ou `,`, o que aparecer mais no cabeçalho.
pub fn detectar_delimitador(texto: &str) -> u8 {
    let cabecalho = texto.lines().next().unwrap_or_default();
    if cabecalho.matches(';').count() > cabecalho.matches(',').count() {
        b';'
    } else {
        b','
    }
}

fn preenchido(valor: Option<String>) -> Option<String> {
    valor.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn parse_planilha(texto: &str) -> Result<PlanilhaServidores, AppError> {
    let texto = texto.trim_start_matches('\u{feff}');
    if texto.trim().is_empty() {
        return Err(AppError::CsvInvalido("arquivo vazio".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detectar_delimitador(texto))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(texto.as_bytes());

    // Cabeçalho sem diferenciar maiúsculas
    let cabecalho: csv::StringRecord = reader
        .headers()
        .map_err(|e| AppError::CsvInvalido(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    for obrigatoria in ["matricula", "nome"] {
        if !cabecalho.iter().any(|h| h == obrigatoria) {
            return Err(AppError::CsvInvalido(format!("coluna '{}' ausente no cabeçalho", obrigatoria)));
        }
    }
    reader.set_headers(cabecalho);

    let mut planilha = PlanilhaServidores::default();
    // e-mail -> (matrícula, linha) da primeira ocorrência no arquivo
    let mut emails_vistos: HashMap<String, (String, usize)> = HashMap::new();
    for (i, registro) in reader.deserialize::<RegistroBruto>().enumerate() {
        let linha = i + 2;
        let bruto = match registro {
            Ok(b) => b,
            Err(e) => {
                planilha.rejeitadas.push(LinhaRejeitada { linha, motivo: e.to_string() });
                continue;
            }
        };

        let (Some(matricula), Some(nome)) = (preenchido(bruto.matricula), preenchido(bruto.nome)) else {
            planilha.rejeitadas.push(LinhaRejeitada {
                linha,
                motivo: "matrícula e nome são obrigatórios".into(),
            });
            continue;
        };

        let email = preenchido(bruto.email).map(|e| e.to_lowercase());
        if let Some(email) = &email {
            match emails_vistos.get(email) {
                Some((outra, primeira)) if *outra != matricula => {
                    planilha.rejeitadas.push(LinhaRejeitada {
                        linha,
                        motivo: format!(
                            "e-mail {} já usado pela matrícula {} na linha {}",
                            email, outra, primeira
                        ),
                    });
                    continue;
                }
                Some(_) => {}
                None => {
                    emails_vistos.insert(email.clone(), (matricula.clone(), linha));
                }
            }
        }

        planilha.validas.push(LinhaServidor {
            matricula,
            nome,
            cpf: preenchido(bruto.cpf),
            email,
            cargo: preenchido(bruto.cargo),
            lotacao: preenchido(bruto.lotacao),
        });
    }

    Ok(planilha)
}

#[derive(Clone)]
pub struct ServidorService {
    pool: PgPool,
    servidor_repo: ServidorRepository,
    profile_repo: ProfileRepository,
}

impl ServidorService {
    pub fn new(pool: PgPool, servidor_repo: ServidorRepository, profile_repo: ProfileRepository) -> Self {
        Self { pool, servidor_repo, profile_repo }
    }

    /// Importa a planilha de RH numa única transação, versionada pelo id da execução.
    pub async fn importar(
        &self,
        user: &AuthenticatedUser,
        origem: &str,
        texto: &str,
    ) -> Result<ImportacaoServidores, AppError> {
        let planilha = parse_planilha(texto)?;

        let mut tx = begin_audited(&self.pool, user).await?;
        let importacao = self
            .servidor_repo
            .create_importacao(&mut *tx, origem, user.0.id)
            .await?;

        let mut inseridos = 0;
        let mut atualizados = 0;
        for linha in &planilha.validas {
            if self.servidor_repo.upsert(&mut *tx, linha, importacao.id).await? {
                inseridos += 1;
            } else {
                atualizados += 1;
            }
        }

        let rejeitados = planilha.rejeitadas.len() as i32;
        let total = planilha.validas.len() as i32 + rejeitados;
        let importacao = self
            .servidor_repo
            .finalize_importacao(&mut *tx, importacao.id, total, inseridos, atualizados, rejeitados)
            .await?;

        tx.commit().await?;

        for r in &planilha.rejeitadas {
            tracing::warn!("Importação {}: linha {} rejeitada ({})", importacao.id, r.linha, r.motivo);
        }
        tracing::info!(
            "📥 Importação {} ({}): {} inseridos, {} atualizados, {} rejeitados",
            importacao.id,
            origem,
            inseridos,
            atualizados,
            rejeitados
        );

        Ok(importacao)
    }

    pub async fn listar_importacoes(&self) -> Result<Vec<ImportacaoServidores>, AppError> {
        self.servidor_repo.list_importacoes().await
    }

    /// Job explícito de mesclagem base de RH -> perfis, casando por e-mail.
    pub async fn sincronizar_perfis(&self, user: &AuthenticatedUser) -> Result<SincronizacaoPerfis, AppError> {
        let mut tx = begin_audited(&self.pool, user).await?;
        let emails_ambiguos = self.servidor_repo.list_emails_ambiguos(&mut *tx).await?;
        let perfis_atualizados = self.profile_repo.merge_from_servidores(&mut *tx).await?;
        tx.commit().await?;

        for email in &emails_ambiguos {
            tracing::warn!("Sincronização: {} aparece em mais de um registro de RH, perfil ignorado", email);
        }
        tracing::info!("🔄 Sincronização de perfis: {} atualizados", perfis_atualizados);
        Ok(SincronizacaoPerfis {
            perfis_atualizados,
            emails_ambiguos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_from_header() {
        assert_eq!(detectar_delimitador("matricula;nome;email\n1,2;x;y"), b';');
        assert_eq!(detectar_delimitador("matricula,nome,email"), b',');
    }

    #[test]
    fn parses_semicolon_sheet_with_optional_columns() {
        let texto = "\u{feff}Matricula;Nome;CPF;Email;Cargo;Lotacao\n\
                     123456;Maria Souza;111.222.333-44;Maria.Souza@TJPA.jus.br;Analista;Vara Única\n\
                     654321;João Lima;;;;\n";
        let p = parse_planilha(texto).unwrap();
        assert!(p.rejeitadas.is_empty());
        assert_eq!(p.validas.len(), 2);
        assert_eq!(p.validas[0].email.as_deref(), Some("maria.souza@tjpa.jus.br"));
        assert_eq!(p.validas[0].lotacao.as_deref(), Some("Vara Única"));
        assert_eq!(p.validas[1].cpf, None);
        assert_eq!(p.validas[1].cargo, None);
    }

    #[test]
    fn rows_without_registration_or_name_are_rejected() {
        let texto = "matricula,nome,email\n\
                     100,Ana,ana@tjpa.jus.br\n\
                     ,Sem Matricula,x@tjpa.jus.br\n\
                     200,  ,y@tjpa.jus.br\n";
        let p = parse_planilha(texto).unwrap();
        assert_eq!(p.validas.len(), 1);
        assert_eq!(
            p.rejeitadas.iter().map(|r| r.linha).collect::<Vec<_>>(),
            vec![3, 4]
        );
    }

    #[test]
    fn header_must_name_required_columns() {
        assert!(matches!(
            parse_planilha("codigo,nome\n1,Ana"),
            Err(AppError::CsvInvalido(_))
        ));
        assert!(matches!(parse_planilha("  \n"), Err(AppError::CsvInvalido(_))));
    }

    #[test]
    fn missing_optional_columns_are_fine() {
        let p = parse_planilha("nome,matricula\nCarlos,777\n").unwrap();
        assert_eq!(p.validas[0].matricula, "777");
        assert_eq!(p.validas[0].nome, "Carlos");
        assert!(p.validas[0].email.is_none());
    }

    #[test]
    fn email_shared_by_two_registrations_keeps_the_first() {
        let texto = "matricula;nome;email\n\
                     100;Ana Paula;ana@tjpa.jus.br\n\
                     200;Ana Lúcia;ANA@tjpa.jus.br\n\
                     100;Ana Paula Reis;ana@tjpa.jus.br\n";
        let p = parse_planilha(texto).unwrap();
        assert_eq!(
            p.validas.iter().map(|l| l.matricula.as_str()).collect::<Vec<_>>(),
            vec!["100", "100"]
        );
        assert_eq!(p.rejeitadas.len(), 1);
        assert_eq!(p.rejeitadas[0].linha, 3);
        assert!(p.rejeitadas[0].motivo.contains("matrícula 100"));
    }
}
