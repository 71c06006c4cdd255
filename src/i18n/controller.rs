//! Language controller: owns the current language and applies it to the page.

use super::{Language, LanguageRegistry};
use crate::dom::markup::strip_markup;
use crate::dom::{Document, Element, ElementKind, NodeId};
use crate::feedback;
use crate::storage::PreferenceStore;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Storage key holding the preferred language code.
pub const PREFERENCE_KEY: &str = "preferredLanguage";

/// Marker class for elements carrying `data-bn`/`data-en` variants.
pub const BILINGUAL_SELECTOR: &str = ".bilingual";

/// Class present on `<body>` while the page is in English.
pub const ENGLISH_BODY_CLASS: &str = "english";

/// Class marking the switch control of the current language.
pub const ACTIVE_CLASS: &str = "active";

/// How a localized string is written into an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Input-like controls: the string becomes the placeholder.
    Placeholder,
    /// Buttons and links: the string is a trusted markup fragment (icon labels).
    Markup,
    /// Everything else: markup is stripped and the result written as text.
    PlainText,
}

impl RenderMode {
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Input | ElementKind::TextArea => RenderMode::Placeholder,
            ElementKind::Button | ElementKind::Link => RenderMode::Markup,
            ElementKind::Other => RenderMode::PlainText,
        }
    }
}

/// Write `text` into `node` using the mode its kind calls for. Text and
/// markup replace the element's children; a placeholder leaves them alone.
pub fn render_localized(doc: &mut Document, node: NodeId, text: &str) {
    let Some(kind) = doc.get(node).map(Element::kind) else {
        return;
    };
    match RenderMode::for_kind(kind) {
        RenderMode::Placeholder => {
            if let Some(el) = doc.get_mut(node) {
                el.set_placeholder(text);
            }
        }
        RenderMode::Markup => {
            doc.set_inner_html(node, text);
        }
        RenderMode::PlainText => {
            doc.set_text_content(node, &strip_markup(text));
        }
    }
}

pub struct LanguageController {
    current: RwLock<Language>,
    store: Arc<dyn PreferenceStore>,
}

impl LanguageController {
    /// Create a controller in the default language. Nothing is read from or
    /// written to the store until asked.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            current: RwLock::new(Language::default_language()),
            store,
        }
    }

    pub fn current(&self) -> Language {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Switch the page to `lang`: body class, all bilingual text, persisted
    /// preference, title and phone tooltips.
    pub fn switch_language(&self, doc: &mut Document, lang: Language) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = lang;

        let body = doc.body();
        if let Some(body) = doc.get_mut(body) {
            body.toggle_class(ENGLISH_BODY_CLASS, lang == Language::English);
        }

        self.refresh_text(doc);

        if let Err(e) = self.store.set(PREFERENCE_KEY, lang.code()) {
            warn!("Failed to persist language preference: {:#}", e);
        }

        self.update_meta(doc);
        feedback::localize_phone_tooltips(doc, lang);

        info!("Language switched to {}", lang.name());
    }

    /// Rewrite every bilingual element with the current language's variant.
    ///
    /// A missing variant attribute renders as the empty string. Returns the
    /// number of elements rewritten.
    pub fn refresh_text(&self, doc: &mut Document) -> usize {
        let attribute = self.current().text_attribute();
        let targets = doc.query_selector_all(BILINGUAL_SELECTOR);

        for node in &targets {
            let text = doc
                .get(*node)
                .map(|el| el.attribute(attribute).unwrap_or_default().to_string());
            if let Some(text) = text {
                render_localized(doc, *node, &text);
            }
        }

        debug!("Refreshed {} bilingual elements", targets.len());
        targets.len()
    }

    /// Set the document title for the current language.
    pub fn update_meta(&self, doc: &mut Document) {
        doc.set_title(self.current().strings().page_title);
    }

    /// Restore the stored preference, if any.
    ///
    /// Only the exact codes `bn`/`en` are honoured. An empty, unreadable or
    /// unrecognised entry leaves the current language untouched.
    pub fn load_persisted_language(&self, doc: &mut Document) -> Option<Language> {
        let stored = match self.store.get(PREFERENCE_KEY) {
            Ok(value) => value?,
            Err(e) => {
                warn!("Failed to read language preference: {:#}", e);
                return None;
            }
        };

        let Some(config) = LanguageRegistry::get().get_by_code(&stored) else {
            debug!("Ignoring stored language preference '{}'", stored);
            return None;
        };

        let lang = config.language;
        self.switch_language(doc, lang);
        Self::mark_active(doc, lang);
        Some(lang)
    }

    /// Mark the switch control for `lang` active and the other one inactive.
    /// Missing controls are skipped.
    pub fn mark_active(doc: &mut Document, lang: Language) {
        for (language, active) in [(lang, true), (lang.other(), false)] {
            let Some(node) = doc.get_element_by_id(language.switch_control_id()) else {
                debug!("No switch control #{}", language.switch_control_id());
                continue;
            };
            if let Some(el) = doc.get_mut(node) {
                el.toggle_class(ACTIVE_CLASS, active);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Content;
    use crate::storage::MemoryStore;

    struct Page {
        doc: Document,
        heading: NodeId,
        button: NodeId,
        input: NodeId,
        lang_bn: NodeId,
        lang_en: NodeId,
    }

    fn bilingual(doc: &mut Document, tag: &str, bn: &str, en: &str) -> NodeId {
        let node = doc.create_element(tag);
        let el = doc.get_mut(node).unwrap();
        el.add_class("bilingual");
        el.set_attribute("data-bn", bn);
        el.set_attribute("data-en", en);
        let body = doc.body();
        doc.append_child(body, node);
        node
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let lang_bn = doc.create_element("button");
        let lang_en = doc.create_element("button");
        doc.get_mut(lang_bn).unwrap().set_attribute("id", "langBn");
        doc.get_mut(lang_bn).unwrap().add_class("active");
        doc.get_mut(lang_en).unwrap().set_attribute("id", "langEn");
        let body = doc.body();
        doc.append_child(body, lang_bn);
        doc.append_child(body, lang_en);

        let heading = bilingual(&mut doc, "h2", "<b>সেবাসমূহ</b> &amp; চিকিৎসা", "<b>Services</b> &amp; Treatment");
        let button = bilingual(
            &mut doc,
            "a",
            r#"<i class="fab fa-whatsapp"></i> হোয়াটসঅ্যাপ"#,
            r#"<i class="fab fa-whatsapp"></i> WhatsApp"#,
        );
        let input = bilingual(&mut doc, "input", "আপনার নাম", "Your name");

        Page {
            doc,
            heading,
            button,
            input,
            lang_bn,
            lang_en,
        }
    }

    fn controller() -> (LanguageController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LanguageController::new(store.clone()), store)
    }

    // ==================== RenderMode Tests ====================

    #[test]
    fn test_render_mode_dispatch() {
        assert_eq!(RenderMode::for_kind(ElementKind::Input), RenderMode::Placeholder);
        assert_eq!(RenderMode::for_kind(ElementKind::TextArea), RenderMode::Placeholder);
        assert_eq!(RenderMode::for_kind(ElementKind::Button), RenderMode::Markup);
        assert_eq!(RenderMode::for_kind(ElementKind::Link), RenderMode::Markup);
        assert_eq!(RenderMode::for_kind(ElementKind::Other), RenderMode::PlainText);
    }

    // ==================== switch_language Tests ====================

    #[test]
    fn test_starts_in_bengali() {
        let (controller, store) = controller();
        assert_eq!(controller.current(), Language::Bengali);
        assert_eq!(store.get(PREFERENCE_KEY).unwrap(), None);
    }

    #[test]
    fn test_switch_to_english_rewrites_everything() {
        let mut p = page();
        let (controller, store) = controller();

        controller.switch_language(&mut p.doc, Language::English);

        assert_eq!(controller.current(), Language::English);
        let body = p.doc.get(p.doc.body()).unwrap();
        assert!(body.has_class("english"));
        assert_eq!(p.doc.title(), "Dr. Marjia Hossan Mitu - Homeopathic Specialist");
        assert_eq!(store.get(PREFERENCE_KEY).unwrap().as_deref(), Some("en"));

        assert_eq!(
            p.doc.get(p.heading).unwrap().content(),
            &Content::Text("Services & Treatment".to_string())
        );
        assert_eq!(
            p.doc.inner_html(p.button),
            r#"<i class="fab fa-whatsapp"></i> WhatsApp"#
        );
        assert_eq!(p.doc.get(p.input).unwrap().placeholder(), Some("Your name"));
    }

    #[test]
    fn test_switch_back_leaves_no_residue() {
        let mut p = page();
        let (controller, _store) = controller();

        controller.switch_language(&mut p.doc, Language::English);
        controller.switch_language(&mut p.doc, Language::Bengali);

        assert!(!p.doc.get(p.doc.body()).unwrap().has_class("english"));
        assert_eq!(p.doc.text_content(p.heading), "সেবাসমূহ & চিকিৎসা");
        assert_eq!(p.doc.get(p.input).unwrap().placeholder(), Some("আপনার নাম"));
        assert_eq!(
            p.doc.inner_html(p.button),
            r#"<i class="fab fa-whatsapp"></i> হোয়াটসঅ্যাপ"#
        );
    }

    #[test]
    fn test_switch_is_idempotent() {
        let mut p = page();
        let (controller, store) = controller();

        controller.switch_language(&mut p.doc, Language::English);
        let first = crate::dom::PageSnapshot::capture(&p.doc);
        controller.switch_language(&mut p.doc, Language::English);
        let second = crate::dom::PageSnapshot::capture(&p.doc);

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(store.get(PREFERENCE_KEY).unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_variant_renders_empty() {
        let mut doc = Document::new();
        let node = doc.create_element("p");
        doc.get_mut(node).unwrap().add_class("bilingual");
        doc.get_mut(node).unwrap().set_attribute("data-bn", "শুধু বাংলা");
        doc.set_text_content(node, "শুধু বাংলা");
        let body = doc.body();
        doc.append_child(body, node);

        let (controller, _store) = controller();
        controller.switch_language(&mut doc, Language::English);
        assert_eq!(doc.text_content(node), "");
    }

    #[test]
    fn test_switch_replaces_child_elements() {
        let mut doc = Document::new();
        let p = bilingual(&mut doc, "p", "<strong>ডা. মিতু</strong>", "Dr. Mitu");
        let strong = doc.create_element("strong");
        doc.append_child(p, strong);
        doc.set_text_content(strong, "ডা. মিতু");
        let link = bilingual(
            &mut doc,
            "a",
            r#"<i class="fas fa-phone"></i> কল করুন"#,
            r#"<i class="fas fa-phone"></i> Call"#,
        );
        let icon = doc.create_element("i");
        doc.append_child(link, icon);

        let (controller, _store) = controller();
        controller.switch_language(&mut doc, Language::English);

        assert_eq!(doc.text_content(p), "Dr. Mitu");
        assert!(doc.get(p).unwrap().children().is_empty());
        assert!(doc.get(strong).is_none());
        assert_eq!(doc.inner_html(link), r#"<i class="fas fa-phone"></i> Call"#);
        assert!(doc.get(icon).is_none());
    }

    #[test]
    fn test_placeholder_render_keeps_children() {
        let mut doc = Document::new();
        let area = bilingual(&mut doc, "textarea", "বার্তা", "Message");
        let hint = doc.create_element("span");
        doc.append_child(area, hint);

        render_localized(&mut doc, area, "Message");

        assert_eq!(doc.get(area).unwrap().placeholder(), Some("Message"));
        assert_eq!(doc.get(area).unwrap().children(), &[hint]);
    }

    #[test]
    fn test_refresh_text_counts_elements() {
        let mut p = page();
        let (controller, _store) = controller();
        assert_eq!(controller.refresh_text(&mut p.doc), 3);
    }

    // ==================== load_persisted_language Tests ====================

    #[test]
    fn test_load_restores_english() {
        let mut p = page();
        let (controller, store) = controller();
        store.set(PREFERENCE_KEY, "en").unwrap();

        assert_eq!(
            controller.load_persisted_language(&mut p.doc),
            Some(Language::English)
        );
        assert_eq!(controller.current(), Language::English);
        assert!(p.doc.get(p.lang_en).unwrap().has_class("active"));
        assert!(!p.doc.get(p.lang_bn).unwrap().has_class("active"));
        assert_eq!(p.doc.title(), ENGLISH_TITLE);
    }

    const ENGLISH_TITLE: &str = "Dr. Marjia Hossan Mitu - Homeopathic Specialist";

    #[test]
    fn test_load_with_empty_store_keeps_default() {
        let mut p = page();
        let (controller, store) = controller();

        assert_eq!(controller.load_persisted_language(&mut p.doc), None);
        assert_eq!(controller.current(), Language::Bengali);
        assert_eq!(store.get(PREFERENCE_KEY).unwrap(), None);
        assert!(p.doc.get(p.lang_bn).unwrap().has_class("active"));
    }

    #[test]
    fn test_load_ignores_invalid_values() {
        for stored in ["fr", "EN", " en", ""] {
            let mut p = page();
            let (controller, store) = controller();
            store.set(PREFERENCE_KEY, stored).unwrap();

            assert_eq!(controller.load_persisted_language(&mut p.doc), None, "{:?}", stored);
            assert_eq!(controller.current(), Language::Bengali);
        }
    }

    #[test]
    fn test_load_with_failing_store_keeps_default() {
        struct BrokenStore;
        impl PreferenceStore for BrokenStore {
            fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
                anyhow::bail!("storage disabled")
            }
            fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
                anyhow::bail!("storage disabled")
            }
        }

        let mut p = page();
        let controller = LanguageController::new(Arc::new(BrokenStore));
        assert_eq!(controller.load_persisted_language(&mut p.doc), None);

        // Writes fail soft too.
        controller.switch_language(&mut p.doc, Language::English);
        assert_eq!(controller.current(), Language::English);
    }

    // ==================== mark_active Tests ====================

    #[test]
    fn test_mark_active_toggles_pair() {
        let mut p = page();
        LanguageController::mark_active(&mut p.doc, Language::English);
        assert!(p.doc.get(p.lang_en).unwrap().has_class("active"));
        assert!(!p.doc.get(p.lang_bn).unwrap().has_class("active"));

        LanguageController::mark_active(&mut p.doc, Language::Bengali);
        assert!(p.doc.get(p.lang_bn).unwrap().has_class("active"));
        assert!(!p.doc.get(p.lang_en).unwrap().has_class("active"));
    }

    #[test]
    fn test_mark_active_without_controls_is_noop() {
        let mut doc = Document::new();
        LanguageController::mark_active(&mut doc, Language::English);
    }
}
