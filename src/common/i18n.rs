// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

// Idioma padrão da plataforma (as escolas são brasileiras)
pub const DEFAULT_LANG: &str = "pt";

// As mensagens ficam embutidas no binário
const BUNDLES: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Catálogo de mensagens por idioma: idioma -> (chave -> mensagem).
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();

        for (lang, raw) in BUNDLES {
            let bundle: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Arquivo de idioma '{}' inválido", lang))?;
            messages.insert(lang.to_string(), bundle);
        }

        Ok(Self { messages })
    }

    /// Traduz a chave. Cai para o português e, em último caso, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|bundle| bundle.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundles_share_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let pt = &store.messages["pt"];
        let en = &store.messages["en"];

        let mut missing: Vec<_> = pt.keys().filter(|k| !en.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "faltando em en.json: {:?}", missing);
        assert_eq!(pt.len(), en.len());
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::load().unwrap();
        assert_eq!(
            store.translate("fr", "class_full"),
            "A turma atingiu a capacidade máxima."
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }
}
