//! Copy-to-clipboard handlers and their user feedback.
//!
//! Two paths copy a phone number:
//!
//! - copy buttons (`.copy-btn`) copy the configured number and swap their own
//!   label for a success or failure indicator for a fixed window;
//! - phone numbers (`.phone-number`) copy their displayed text and report the
//!   outcome in a floating toast.
//!
//! A failed write is logged and always reported through the same channel a
//! success would use.

use crate::dom::{Content, Document, NodeId};
use crate::i18n::Language;
use crate::site::Site;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::sleep;
use tracing::{debug, error};

pub const COPY_BUTTON_SELECTOR: &str = ".copy-btn";
pub const PHONE_NUMBER_SELECTOR: &str = ".phone-number";
pub const TOAST_SELECTOR: &str = ".toast-message";

pub const SUCCESS_COLOR: &str = "#28a745";
pub const ERROR_COLOR: &str = "#dc3545";
pub const INFO_COLOR: &str = "#17a2b8";

const TOAST_ENTER_ANIMATION: &str = "slideInRight 0.3s ease-in-out";
const TOAST_EXIT_ANIMATION: &str = "slideInRight 0.3s ease-in-out reverse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
            ToastKind::Info => "toast-info",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            ToastKind::Success => SUCCESS_COLOR,
            ToastKind::Error => ERROR_COLOR,
            ToastKind::Info => INFO_COLOR,
        }
    }
}

/// What a copy button looked like before feedback replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSnapshot {
    pub content: Content,
    pub background: Option<String>,
}

/// The pending dismissal of the toast currently shown.
pub(crate) struct ToastTimer {
    handle: AbortHandle,
}

/// Label markup shown on a copy button after a copy attempt.
pub fn copy_feedback_markup(lang: Language, success: bool) -> String {
    let strings = lang.strings();
    if success {
        format!(r#"<i class="fas fa-check"></i> {}"#, strings.copy_success)
    } else {
        format!(r#"<i class="fas fa-times"></i> {}"#, strings.copy_failed)
    }
}

// ==================== Copy Buttons ====================

/// Copy the configured phone number, then show feedback on `button`.
pub fn copy_phone_number(site: &Site, button: NodeId) -> JoinHandle<()> {
    let site = site.clone();
    let number = site.config().phone_number.clone();
    tokio::spawn(async move {
        let result = site.clipboard().write_text(&number).await;
        if let Err(e) = &result {
            error!("Failed to copy: {}", e);
        }
        show_copy_feedback(&site, button, result.is_ok());
    })
}

/// Swap `button`'s label for a success or failure indicator, reverting after
/// the configured window. Re-triggering restarts the window.
///
/// The label replaces everything inside the button, child elements included.
/// The revert puts the earlier content back as markup.
pub fn show_copy_feedback(site: &Site, button: NodeId, success: bool) {
    let document = site.document().clone();
    let markup = copy_feedback_markup(site.current_language(), success);
    let background = if success { SUCCESS_COLOR } else { ERROR_COLOR };

    let capture_from = document.clone();
    let apply_to = document.clone();
    let restore_into = document;
    let armed = site.copy_reverts().arm(
        button,
        site.config().copy_feedback,
        move || {
            let doc = capture_from.lock();
            Some(ButtonSnapshot {
                content: doc.content_snapshot(button)?,
                background: doc.get(button)?.style("background").map(str::to_string),
            })
        },
        move || {
            let mut doc = apply_to.lock();
            doc.set_inner_html(button, &markup);
            if let Some(el) = doc.get_mut(button) {
                el.set_style("background", background);
            }
        },
        move |saved: ButtonSnapshot| {
            let mut doc = restore_into.lock();
            if !doc.replace_content(button, saved.content) {
                return;
            }
            if let Some(el) = doc.get_mut(button) {
                match saved.background {
                    Some(background) => el.set_style("background", &background),
                    None => el.remove_style("background"),
                }
            }
        },
    );

    if armed.is_none() {
        debug!("Copy button {:?} is gone, skipping feedback", button);
    }
}

// ==================== Phone Numbers ====================

/// Make phone numbers look clickable and give them a localized tooltip.
/// Returns how many were prepared.
pub fn prepare_phone_numbers(doc: &mut Document, lang: Language) -> usize {
    let targets = doc.query_selector_all(PHONE_NUMBER_SELECTOR);
    for node in &targets {
        if let Some(el) = doc.get_mut(*node) {
            el.set_style("cursor", "pointer");
            el.set_attribute("title", lang.strings().click_to_copy);
        }
    }
    targets.len()
}

/// Refresh the phone number tooltips for `lang`.
pub fn localize_phone_tooltips(doc: &mut Document, lang: Language) {
    for node in doc.query_selector_all(PHONE_NUMBER_SELECTOR) {
        if let Some(el) = doc.get_mut(node) {
            if el.attribute("title").is_some() {
                el.set_attribute("title", lang.strings().click_to_copy);
            }
        }
    }
}

/// Copy the number `element` currently displays, then toast the outcome.
///
/// The text is read now, at click time, so it follows whatever the element
/// shows in the current language.
pub fn copy_displayed_number(site: &Site, element: NodeId) -> Option<JoinHandle<()>> {
    let number = {
        let doc = site.document().lock();
        doc.get(element)?;
        doc.text_content(element).trim().to_string()
    };

    let site = site.clone();
    Some(tokio::spawn(async move {
        match site.clipboard().write_text(&number).await {
            Ok(()) => {
                let message = site.current_language().strings().phone_copied;
                show_toast(&site, message, ToastKind::Success);
            }
            Err(e) => {
                error!("Failed to copy: {}", e);
                let message = site.current_language().strings().phone_copy_failed;
                show_toast(&site, message, ToastKind::Error);
            }
        }
    }))
}

// ==================== Toast ====================

fn toast_style(kind: ToastKind) -> [(&'static str, &'static str); 11] {
    [
        ("position", "fixed"),
        ("top", "20px"),
        ("right", "20px"),
        ("background", kind.background()),
        ("color", "white"),
        ("padding", "12px 20px"),
        ("border-radius", "8px"),
        ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
        ("z-index", "10000"),
        ("animation", TOAST_ENTER_ANIMATION),
        ("font-weight", "500"),
    ]
}

/// Show a floating notification, replacing any toast already shown.
///
/// After the configured duration the toast plays its exit animation and is
/// removed once that finishes. Returns the toast element.
pub fn show_toast(site: &Site, message: &str, kind: ToastKind) -> Option<NodeId> {
    let mut slot = site.toast_slot().lock().unwrap_or_else(|e| e.into_inner());
    if let Some(previous) = slot.take() {
        previous.handle.abort();
    }

    let document = site.document().clone();
    let node = {
        let mut doc = document.lock();
        if let Some(existing) = doc.query_selector(TOAST_SELECTOR) {
            doc.remove(existing);
        }

        let node = doc.create_element("div");
        let el = doc.get_mut(node)?;
        el.set_class_name(&format!("toast-message {}", kind.class_name()));
        for (property, value) in toast_style(kind) {
            el.set_style(property, value);
        }
        doc.set_text_content(node, message);
        let body = doc.body();
        doc.append_child(body, node);
        node
    };

    let (shown, exit) = (site.config().toast_duration, site.config().toast_exit);
    let task = tokio::spawn(async move {
        sleep(shown).await;
        {
            let mut doc = document.lock();
            match doc.get_mut(node) {
                Some(el) => el.set_style("animation", TOAST_EXIT_ANIMATION),
                None => return,
            }
        }
        sleep(exit).await;
        let mut doc = document.lock();
        if doc.is_attached(node) {
            doc.remove(node);
        }
    });

    *slot = Some(ToastTimer {
        handle: task.abort_handle(),
    });
    Some(node)
}
