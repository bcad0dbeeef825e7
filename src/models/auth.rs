// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::tramitacao::Papel;

// Representa um perfil (identidade única do sistema) vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    #[schema(example = "fulano@tjpa.jus.br")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Fulano de Tal")]
    pub nome: String,
    #[schema(example = "123456")]
    pub matricula: Option<String>,
    #[schema(example = "Analista Judiciário")]
    pub cargo: Option<String>,
    pub papel: Papel,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub signature_pin_hash: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PIN de assinatura: 4 a 6 dígitos.
pub fn pin_formato_valido(pin: &str) -> bool {
    (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
}

fn validar_pin(pin: &str) -> Result<(), ValidationError> {
    if pin_formato_valido(pin) {
        Ok(())
    } else {
        Err(ValidationError::new("pin").with_message("validation.pin_formato".into()))
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(email(message = "validation.email"))]
    #[schema(example = "fulano@tjpa.jus.br")]
    pub email: String,
    #[validate(length(min = 6, message = "validation.senha_curta"))]
    pub password: String,
    #[validate(length(min = 1, message = "validation.obrigatorio"))]
    #[schema(example = "Fulano de Tal")]
    pub nome: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
    #[validate(length(min = 6, message = "validation.senha_curta"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DefinirPinPayload {
    #[validate(custom(function = "validar_pin"))]
    #[schema(example = "4821")]
    pub pin: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AlterarPapelPayload {
    pub papel: Papel,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do perfil)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
