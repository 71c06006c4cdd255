//! Small page interactions: in-page navigation, hover lift, the WhatsApp
//! click pulse, load-in animations and the runtime stylesheet.

use crate::dom::{Document, NodeId, ScrollBehavior, ScrollBlock};
use crate::site::Site;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

pub const ANCHOR_SELECTOR: &str = r##"a[href^="#"]"##;
pub const HOVER_SELECTOR: &str = ".btn, .info-item, .treatment-category";
pub const WHATSAPP_SELECTOR: &str = ".whatsapp-btn, .whatsapp-link";
pub const LOAD_IN_SELECTOR: &str = ".info-card, .section-header";

/// Id of the `<style>` element holding [`ADDITIONAL_STYLES`].
pub const STYLE_ELEMENT_ID: &str = "site-runtime-styles";

pub const ADDITIONAL_STYLES: &str = r#"
    .toast-message {
        font-family: inherit;
    }

    @keyframes pulse {
        0% { transform: scale(1); }
        50% { transform: scale(1.05); }
        100% { transform: scale(1); }
    }

    .loading {
        animation: pulse 1.5s ease-in-out infinite;
    }

    .feature-highlight {
        position: relative;
    }

    .feature-highlight::after {
        content: '';
        position: absolute;
        top: -5px;
        left: -5px;
        right: -5px;
        bottom: -5px;
        border: 2px solid var(--accent-color);
        border-radius: inherit;
        opacity: 0;
        animation: highlightPulse 2s ease-in-out;
    }

    @keyframes highlightPulse {
        0%, 100% { opacity: 0; transform: scale(1); }
        50% { opacity: 1; transform: scale(1.02); }
    }
"#;

const HOVER_LIFT: &str = "translateY(-2px)";
const HOVER_REST: &str = "translateY(0)";
const PRESSED: &str = "scale(0.95)";

const LOAD_IN_STAGGER: Duration = Duration::from_millis(100);
const LOAD_IN_TRANSITION: &str = "all 0.6s cubic-bezier(0.4, 0, 0.2, 1)";
const BODY_FADE_DELAY: Duration = Duration::from_millis(100);
const BODY_FADE_TRANSITION: &str = "opacity 0.5s ease-in-out";
const SWITCH_FADE_DELAY: Duration = Duration::from_millis(10);
const SWITCH_FADE_ANIMATION: &str = "fadeIn 0.5s ease-in-out";

// ==================== Navigation ====================

/// Scroll to the element `anchor`'s href points at.
///
/// The href is used as a selector, so `#services` targets the element with
/// id `services`. Returns the target, or `None` when nothing matches (a bare
/// `#` matches nothing).
pub fn smooth_scroll(doc: &mut Document, anchor: NodeId) -> Option<NodeId> {
    let href = doc.get(anchor)?.attribute("href")?.to_string();
    let Some(target) = doc.query_selector(&href) else {
        debug!("No scroll target for '{}'", href);
        return None;
    };
    doc.scroll_into_view(target, ScrollBehavior::Smooth, ScrollBlock::Start);
    Some(target)
}

// ==================== Hover ====================

pub fn hover_enter(doc: &mut Document, node: NodeId) {
    if let Some(el) = doc.get_mut(node) {
        el.set_style("transform", HOVER_LIFT);
    }
}

pub fn hover_leave(doc: &mut Document, node: NodeId) {
    if let Some(el) = doc.get_mut(node) {
        el.set_style("transform", HOVER_REST);
    }
}

// ==================== WhatsApp ====================

/// Log the contact and play a short press animation on `link`.
pub fn whatsapp_clicked(site: &Site, link: NodeId) {
    info!(
        "WhatsApp contact initiated - Language: {}",
        site.current_language()
    );

    let capture_from = site.document().clone();
    let apply_to = site.document().clone();
    let restore_into = site.document().clone();
    site.pulse_reverts().arm(
        link,
        site.config().whatsapp_pulse,
        move || capture_from.lock().get(link).map(|_| ()),
        move || {
            if let Some(el) = apply_to.lock().get_mut(link) {
                el.set_style("transform", PRESSED);
            }
        },
        move |()| {
            if let Some(el) = restore_into.lock().get_mut(link) {
                el.remove_style("transform");
            }
        },
    );
}

// ==================== Load-in ====================

/// Hide the load-in targets, then bring them in one after another.
pub fn animate_on_load(site: &Site) -> Vec<JoinHandle<()>> {
    let targets = {
        let mut doc = site.document().lock();
        let targets = doc.query_selector_all(LOAD_IN_SELECTOR);
        for node in &targets {
            if let Some(el) = doc.get_mut(*node) {
                el.set_style("opacity", "0");
                el.set_style("transform", "translateY(30px)");
            }
        }
        targets
    };

    targets
        .into_iter()
        .enumerate()
        .map(|(index, node)| {
            let document = site.document().clone();
            let delay = LOAD_IN_STAGGER * index as u32;
            tokio::spawn(async move {
                sleep(delay).await;
                if let Some(el) = document.lock().get_mut(node) {
                    el.set_style("transition", LOAD_IN_TRANSITION);
                    el.set_style("opacity", "1");
                    el.set_style("transform", "translateY(0)");
                }
            })
        })
        .collect()
}

/// Fade the whole page in.
pub fn fade_in_body(site: &Site) -> JoinHandle<()> {
    let document = site.document().clone();
    {
        let mut doc = document.lock();
        let body = doc.body();
        if let Some(el) = doc.get_mut(body) {
            el.set_style("opacity", "0");
        }
    }

    tokio::spawn(async move {
        sleep(BODY_FADE_DELAY).await;
        let mut doc = document.lock();
        let body = doc.body();
        if let Some(el) = doc.get_mut(body) {
            el.set_style("transition", BODY_FADE_TRANSITION);
            el.set_style("opacity", "1");
        }
    })
}

/// Replay the fade on `<main>` after a language switch.
pub fn animate_language_switch(site: &Site) -> Option<JoinHandle<()>> {
    let main = {
        let mut doc = site.document().lock();
        let main = doc.query_selector("main")?;
        doc.get_mut(main)?.set_style("animation", "none");
        main
    };

    let document = site.document().clone();
    Some(tokio::spawn(async move {
        sleep(SWITCH_FADE_DELAY).await;
        if let Some(el) = document.lock().get_mut(main) {
            el.set_style("animation", SWITCH_FADE_ANIMATION);
        }
    }))
}

// ==================== Styles ====================

/// Append the runtime stylesheet to `<head>` unless it is already there.
/// Returns whether it was added.
pub fn inject_styles(doc: &mut Document) -> bool {
    if doc.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return false;
    }
    let style = doc.create_element("style");
    if let Some(el) = doc.get_mut(style) {
        el.set_attribute("id", STYLE_ELEMENT_ID);
    }
    doc.set_text_content(style, ADDITIONAL_STYLES);
    let head = doc.head();
    doc.append_child(head, style)
}
