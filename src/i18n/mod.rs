//! Internationalization (i18n) for the bilingual page.
//!
//! # Architecture
//!
//! - `registry`: single source of truth for the two languages and their metadata
//! - `language`: the `Language` enum used everywhere else
//! - `strings`: UI strings the runtime writes itself (feedback, toasts, title)
//! - `controller`: current-language state, text refresh and persistence
//! - `validator`: completeness checks for a page's bilingual content
//!
//! # Example
//!
//! ```rust,ignore
//! use practice_site::i18n::{Language, LanguageController};
//!
//! let controller = LanguageController::new(store);
//! controller.switch_language(&mut doc, Language::English);
//! ```

mod controller;
mod language;
mod registry;
mod strings;
mod validator;

pub use controller::{
    render_localized, LanguageController, RenderMode, ACTIVE_CLASS, BILINGUAL_SELECTOR,
    ENGLISH_BODY_CLASS, PREFERENCE_KEY,
};
pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{LanguageStrings, BENGALI_STRINGS, ENGLISH_STRINGS};
pub use validator::{TranslationValidator, ValidationReport};
