//! Language registry: single source of truth for the page's languages.
//!
//! Holds the per-language metadata the page runtime needs: the preference
//! code, display names, the markup attribute that carries each language's
//! text, and the id of the control that switches to it.

use super::Language;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub language: Language,

    /// Code stored in the preference (e.g., "bn", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "Bengali")
    pub name: &'static str,

    /// Native name of the language (e.g., "বাংলা")
    pub native_name: &'static str,

    /// Attribute holding this language's variant on bilingual elements
    pub text_attribute: &'static str,

    /// Id of the control that switches the page to this language
    pub switch_control_id: &'static str,

    /// Whether this is the language shown before any preference is applied
    pub is_default: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its preference code. Codes are matched exactly.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn get_by_language(&self, language: Language) -> &LanguageConfig {
        // Every variant has an entry; see `default_languages`.
        self.languages
            .iter()
            .find(|lang| lang.language == language)
            .unwrap_or(&self.languages[0])
    }

    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The language shown before any preference is applied.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one default language.
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self.languages.iter().filter(|l| l.is_default).collect();
        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            language: Language::Bengali,
            code: "bn",
            name: "Bengali",
            native_name: "বাংলা",
            text_attribute: "data-bn",
            switch_control_id: "langBn",
            is_default: true,
        },
        LanguageConfig {
            language: Language::English,
            code: "en",
            name: "English",
            native_name: "English",
            text_attribute: "data-en",
            switch_control_id: "langEn",
            is_default: false,
        },
    ]
}
