// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Idioma da resposta, lido do Accept-Language ("pt-BR" -> "pt")
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            })
            .map(Locale)
            .unwrap_or_default();

        Ok(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extrair(header: Option<&str>) -> String {
        let mut builder = Request::builder();
        if let Some(h) = header {
            builder = builder.header(header::ACCEPT_LANGUAGE, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Locale::from_request_parts(&mut parts, &()).await.unwrap().0
    }

    #[tokio::test]
    async fn picks_primary_subtag_of_preferred_language() {
        assert_eq!(extrair(Some("en-US,en;q=0.9,pt;q=0.5")).await, "en");
        assert_eq!(extrair(Some("pt-BR")).await, "pt");
    }

    #[tokio::test]
    async fn defaults_to_portuguese_without_header() {
        assert_eq!(extrair(None).await, "pt");
    }
}
