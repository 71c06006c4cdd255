//! Bilingual content validation.
//!
//! Checks that every bilingual element in a page carries both language
//! variants and that the variants agree on the parts that must survive
//! translation (icon fragments on buttons and links).

use super::controller::{RenderMode, BILINGUAL_SELECTOR};
use super::Language;
use crate::dom::markup::contains_markup;
use crate::dom::{Document, Element};
use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that leave an element blank or wrong in one language
    pub errors: Vec<String>,

    /// Likely mistakes that still render
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for bilingual page content.
pub struct TranslationValidator;

static ICON_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Validate every bilingual element in `doc`.
    pub fn validate_document(doc: &Document) -> ValidationReport {
        let mut report = ValidationReport::new();
        for node in doc.query_selector_all(BILINGUAL_SELECTOR) {
            if let Some(el) = doc.get(node) {
                Self::validate_element(el, &describe(el), &mut report);
            }
        }
        report
    }

    fn validate_element(el: &Element, label: &str, report: &mut ValidationReport) {
        let mut variants = Vec::new();
        for language in Language::ALL {
            let attribute = language.text_attribute();
            match el.attribute(attribute) {
                None => report
                    .errors
                    .push(format!("{}: missing {} attribute", label, attribute)),
                Some(v) if v.trim().is_empty() => report
                    .errors
                    .push(format!("{}: empty {} attribute", label, attribute)),
                Some(v) => variants.push((language, v)),
            }
        }

        let [(_, bn), (_, en)] = variants.as_slice() else {
            return;
        };

        if bn == en {
            report
                .warnings
                .push(format!("{}: variants are identical (untranslated?)", label));
        }

        match RenderMode::for_kind(el.kind()) {
            RenderMode::Markup => {
                if Self::extract_icons(bn) != Self::extract_icons(en) {
                    report
                        .warnings
                        .push(format!("{}: icon markup differs between languages", label));
                }
            }
            RenderMode::PlainText => {
                for (language, value) in &variants {
                    if Self::has_markup(value) {
                        report.warnings.push(format!(
                            "{}: {} variant contains markup that will be stripped",
                            label,
                            language.code()
                        ));
                    }
                }
            }
            RenderMode::Placeholder => {}
        }
    }

    /// Icon fragments (`<i class="...">`) in a markup string, in order.
    fn extract_icons(text: &str) -> Vec<String> {
        let regex = ICON_REGEX.get_or_init(|| {
            Regex::new(r#"<i\s+class\s*=\s*["']([^"']*)["']"#).expect("valid icon regex")
        });
        regex
            .captures_iter(text)
            .map(|cap| cap[1].split_whitespace().collect::<Vec<_>>().join(" "))
            .collect()
    }

    fn has_markup(text: &str) -> bool {
        contains_markup(text)
    }
}

fn describe(el: &Element) -> String {
    match el.id() {
        Some(id) => format!("<{}#{}>", el.tag(), id),
        None => match el.attribute("data-en") {
            Some(en) if !en.is_empty() => {
                let short: String = en.chars().take(24).collect();
                format!("<{}> \"{}\"", el.tag(), short)
            }
            _ => format!("<{}>", el.tag()),
        },
    }
}
