//! Language type: the page's two display languages.

use super::{LanguageConfig, LanguageRegistry, LanguageStrings, BENGALI_STRINGS, ENGLISH_STRINGS};
use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// A display language. The page is always in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Bengali,
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Bengali, Language::English];

    /// Create a Language from a preference code.
    ///
    /// Only the exact codes `"bn"` and `"en"` are accepted, after trimming
    /// surrounding whitespace.
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code.trim()) {
            Some(config) => Ok(config.language),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language shown before any preference is applied.
    pub fn default_language() -> Language {
        LanguageRegistry::get().default_language().language
    }

    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get().get_by_language(*self)
    }

    /// Preference code (e.g., "bn", "en").
    pub fn code(&self) -> &'static str {
        self.config().code
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Attribute carrying this language's variant on bilingual elements.
    pub fn text_attribute(&self) -> &'static str {
        self.config().text_attribute
    }

    /// Id of the control that switches the page to this language.
    pub fn switch_control_id(&self) -> &'static str {
        self.config().switch_control_id
    }

    /// The other language.
    pub fn other(&self) -> Language {
        match self {
            Language::Bengali => Language::English,
            Language::English => Language::Bengali,
        }
    }

    /// Localized UI strings for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        match self {
            Language::Bengali => &BENGALI_STRINGS,
            Language::English => &ENGLISH_STRINGS,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::default_language()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_bengali() {
        assert_eq!(Language::from_code("bn").unwrap(), Language::Bengali);
    }

    #[test]
    fn test_from_code_english() {
        assert_eq!(Language::from_code("en").unwrap(), Language::English);
    }

    #[test]
    fn test_from_code_trims_whitespace() {
        assert_eq!(Language::from_code(" en\n").unwrap(), Language::English);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_from_str() {
        let lang: Language = "bn".parse().unwrap();
        assert_eq!(lang, Language::Bengali);
        assert!("english".parse::<Language>().is_err());
    }

    // ==================== Accessor Tests ====================

    #[test]
    fn test_default_is_bengali() {
        assert_eq!(Language::default(), Language::Bengali);
    }

    #[test]
    fn test_codes_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()).unwrap(), language);
        }
    }

    #[test]
    fn test_other() {
        assert_eq!(Language::Bengali.other(), Language::English);
        assert_eq!(Language::English.other(), Language::Bengali);
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::English.to_string(), "en");
        assert_eq!(format!("{}", Language::Bengali), "bn");
    }

    #[test]
    fn test_names() {
        assert_eq!(Language::Bengali.name(), "Bengali");
        assert_eq!(Language::Bengali.native_name(), "বাংলা");
        assert_eq!(Language::English.native_name(), "English");
    }

    #[test]
    fn test_strings_match_language() {
        assert_eq!(Language::English.strings().copy_success, "Copied!");
        assert_eq!(Language::Bengali.strings().copy_success, "কপি হয়েছে!");
    }
}
