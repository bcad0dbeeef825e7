// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "pt";

// Catálogos embutidos no binário (um JSON plano por idioma)
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo de idioma '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Traduz `key` para `lang`, substituindo `{nome}` pelos argumentos.
    /// Idioma desconhecido cai para o português; chave desconhecida volta como a própria chave.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string());

        args.iter().fold(template, |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_in_portuguese_exists_in_english() {
        let store = I18nStore::load().unwrap();
        let pt = store.catalogs.get("pt").unwrap();
        let en = store.catalogs.get("en").unwrap();
        let missing: Vec<&String> = pt.keys().filter(|k| !en.contains_key(*k)).collect();
        assert!(missing.is_empty(), "chaves sem tradução: {:?}", missing);
    }

    #[test]
    fn translate_replaces_placeholders() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate(
            "pt",
            "error.resource_not_found",
            &[("resource", "Solicitação 42".to_string())],
        );
        assert!(msg.contains("Solicitação 42"));
        assert!(!msg.contains("{resource}"));
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::load().unwrap();
        assert!(!store.catalogs.contains_key("fr"));
        assert_eq!(
            store.translate("fr", "error.invalid_token", &[]),
            store.translate("pt", "error.invalid_token", &[])
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "nao.existe", &[]), "nao.existe");
    }
}
