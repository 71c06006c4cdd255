//! The page runtime: shared state, start-up wiring and event dispatch.

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::dom::{Document, NodeId, SharedDocument};
use crate::feedback::{self, ButtonSnapshot, ToastTimer, COPY_BUTTON_SELECTOR, PHONE_NUMBER_SELECTOR};
use crate::i18n::{Language, LanguageController};
use crate::interactions::{self, ANCHOR_SELECTOR, HOVER_SELECTOR, WHATSAPP_SELECTOR};
use crate::reveal::{IntersectionEntry, Rect, RevealObserver, Viewport};
use crate::storage::PreferenceStore;
use crate::timers::PendingReverts;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Bubbles from the target through its ancestors.
    Click,
    PointerEnter,
    PointerLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

impl Event {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
        }
    }

    pub fn pointer_enter(target: NodeId) -> Self {
        Self {
            kind: EventKind::PointerEnter,
            target,
        }
    }

    pub fn pointer_leave(target: NodeId) -> Self {
        Self {
            kind: EventKind::PointerLeave,
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    SwitchLanguage(Language),
    CopyPhoneNumber,
    CopyDisplayedNumber,
    WhatsAppPulse,
    SmoothScroll,
    HoverLift,
    HoverRest,
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    node: NodeId,
    kind: EventKind,
    handler: Handler,
}

/// Outcome of dispatching one event.
///
/// Handlers return immediately; work that waits on the clipboard or a timer
/// is spawned and collected here so the caller can await it.
#[derive(Debug, Default)]
pub struct Dispatch {
    default_prevented: bool,
    handled: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatch {
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Number of listeners that ran.
    pub fn handled(&self) -> usize {
        self.handled
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn spawned(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Wait for every continuation spawned by the event.
    pub async fn settle(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!("Event continuation failed: {}", e);
                }
            }
        }
    }
}

struct SiteInner {
    config: Config,
    document: SharedDocument,
    language: LanguageController,
    clipboard: Arc<dyn Clipboard>,
    reveal: Mutex<RevealObserver>,
    copy_reverts: Arc<PendingReverts<ButtonSnapshot>>,
    pulse_reverts: Arc<PendingReverts<()>>,
    toast: Mutex<Option<ToastTimer>>,
    listeners: Mutex<Vec<Listener>>,
    started: AtomicBool,
}

/// One page with its runtime. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct Site {
    inner: Arc<SiteInner>,
}

impl Site {
    pub fn new(
        config: Config,
        document: Document,
        store: Arc<dyn PreferenceStore>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let reveal = RevealObserver::new(config.reveal);
        Self {
            inner: Arc::new(SiteInner {
                config,
                document: SharedDocument::new(document),
                language: LanguageController::new(store),
                clipboard,
                reveal: Mutex::new(reveal),
                copy_reverts: PendingReverts::new(),
                pulse_reverts: PendingReverts::new(),
                toast: Mutex::new(None),
                listeners: Mutex::new(Vec::new()),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Run the start-up sequence: bind listeners to the elements present
    /// now, render the default language, restore the stored preference,
    /// start observing reveal targets and kick off the load-in animations.
    ///
    /// Only the first call does anything.
    pub fn start(&self) -> Dispatch {
        let mut dispatch = Dispatch::default();
        if self.inner.started.swap(true, Ordering::SeqCst) {
            warn!("Site already started, ignoring");
            return dispatch;
        }

        {
            let mut doc = self.document().lock();
            for lang in Language::ALL {
                match doc.get_element_by_id(lang.switch_control_id()) {
                    Some(node) => self.listen(node, EventKind::Click, Handler::SwitchLanguage(lang)),
                    None => debug!("No switch control #{}", lang.switch_control_id()),
                }
            }
            self.inner.language.refresh_text(&mut doc);
        }

        for task in interactions::animate_on_load(self) {
            dispatch.spawned(task);
        }

        let mut doc = self.document().lock();
        let phones = feedback::prepare_phone_numbers(&mut doc, self.current_language());
        self.listen_all(&doc, PHONE_NUMBER_SELECTOR, EventKind::Click, Handler::CopyDisplayedNumber);
        self.listen_all(&doc, WHATSAPP_SELECTOR, EventKind::Click, Handler::WhatsAppPulse);
        self.listen_all(&doc, ANCHOR_SELECTOR, EventKind::Click, Handler::SmoothScroll);
        self.listen_all(&doc, HOVER_SELECTOR, EventKind::PointerEnter, Handler::HoverLift);
        self.listen_all(&doc, HOVER_SELECTOR, EventKind::PointerLeave, Handler::HoverRest);

        if let Some(lang) = self.inner.language.load_persisted_language(&mut doc) {
            info!("Restored language preference: {}", lang.name());
        }

        let observed = self.reveal().observe_targets(&doc);
        self.listen_all(&doc, COPY_BUTTON_SELECTOR, EventKind::Click, Handler::CopyPhoneNumber);
        interactions::inject_styles(&mut doc);
        drop(doc);

        dispatch.spawned(interactions::fade_in_body(self));

        info!(
            "Site started in {}: {} listeners, {} phone numbers, {} reveal targets",
            self.current_language().name(),
            self.listener_count(),
            phones,
            observed
        );
        dispatch
    }

    /// Deliver `event` to the listeners bound at start-up.
    pub fn dispatch(&self, event: Event) -> Dispatch {
        let path = match event.kind {
            EventKind::Click => self.document().lock().ancestors_inclusive(event.target),
            EventKind::PointerEnter | EventKind::PointerLeave => vec![event.target],
        };

        let mut matched = Vec::new();
        {
            let listeners = self.inner.listeners.lock().unwrap_or_else(|e| e.into_inner());
            for node in &path {
                matched.extend(
                    listeners
                        .iter()
                        .filter(|l| l.node == *node && l.kind == event.kind)
                        .copied(),
                );
            }
        }

        let mut dispatch = Dispatch::default();
        for listener in matched {
            self.run(listener, &mut dispatch);
            dispatch.handled += 1;
        }
        dispatch
    }

    pub fn click(&self, target: NodeId) -> Dispatch {
        self.dispatch(Event::click(target))
    }

    /// The switch control action: switch, mark the control active and
    /// replay the main-content fade.
    pub fn switch_language(&self, lang: Language) -> Dispatch {
        {
            let mut doc = self.document().lock();
            self.inner.language.switch_language(&mut doc, lang);
            LanguageController::mark_active(&mut doc, lang);
        }
        let mut dispatch = Dispatch::default();
        if let Some(task) = interactions::animate_language_switch(self) {
            dispatch.spawned(task);
        }
        dispatch
    }

    /// Apply intersection entries from the host. Returns newly revealed elements.
    pub fn report_intersections(&self, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        let mut doc = self.document().lock();
        self.reveal().handle_entries(&mut doc, entries)
    }

    /// Compute intersection entries from element rectangles and apply them.
    pub fn report_layout(&self, layout: &[(NodeId, Rect)], viewport: Viewport) -> Vec<NodeId> {
        let entries = self.reveal().entries_for(layout, viewport);
        self.report_intersections(&entries)
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.reveal().is_observed(node)
    }

    pub fn document(&self) -> &SharedDocument {
        &self.inner.document
    }

    pub fn language(&self) -> &LanguageController {
        &self.inner.language
    }

    pub fn current_language(&self) -> Language {
        self.inner.language.current()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn clipboard(&self) -> &Arc<dyn Clipboard> {
        &self.inner.clipboard
    }

    /// The switch control for `lang`, if the page has one.
    pub fn switch_control(&self, lang: Language) -> Option<NodeId> {
        self.document().lock().get_element_by_id(lang.switch_control_id())
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub(crate) fn copy_reverts(&self) -> &Arc<PendingReverts<ButtonSnapshot>> {
        &self.inner.copy_reverts
    }

    pub(crate) fn pulse_reverts(&self) -> &Arc<PendingReverts<()>> {
        &self.inner.pulse_reverts
    }

    pub(crate) fn toast_slot(&self) -> &Mutex<Option<ToastTimer>> {
        &self.inner.toast
    }

    fn reveal(&self) -> std::sync::MutexGuard<'_, RevealObserver> {
        self.inner.reveal.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn listen(&self, node: NodeId, kind: EventKind, handler: Handler) {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Listener { node, kind, handler });
    }

    fn listen_all(&self, doc: &Document, selector: &str, kind: EventKind, handler: Handler) {
        for node in doc.query_selector_all(selector) {
            self.listen(node, kind, handler);
        }
    }

    fn run(&self, listener: Listener, dispatch: &mut Dispatch) {
        let node = listener.node;
        match listener.handler {
            Handler::SwitchLanguage(lang) => {
                let Dispatch { tasks, .. } = self.switch_language(lang);
                dispatch.tasks.extend(tasks);
            }
            Handler::CopyPhoneNumber => {
                dispatch.default_prevented = true;
                dispatch.spawned(feedback::copy_phone_number(self, node));
            }
            Handler::CopyDisplayedNumber => {
                if let Some(task) = feedback::copy_displayed_number(self, node) {
                    dispatch.spawned(task);
                }
            }
            Handler::WhatsAppPulse => interactions::whatsapp_clicked(self, node),
            Handler::SmoothScroll => {
                dispatch.default_prevented = true;
                interactions::smooth_scroll(&mut self.document().lock(), node);
            }
            Handler::HoverLift => interactions::hover_enter(&mut self.document().lock(), node),
            Handler::HoverRest => interactions::hover_leave(&mut self.document().lock(), node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::storage::MemoryStore;
    use std::time::Duration;
    use tokio::time::sleep;

    struct Fixture {
        site: Site,
        lang_bn: NodeId,
        lang_en: NodeId,
        heading: NodeId,
        copy_icon: NodeId,
        copy_button: NodeId,
        anchor: NodeId,
        hover: NodeId,
        card: NodeId,
    }

    fn add(doc: &mut Document, parent: NodeId, tag: &str, class: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = doc.create_element(tag);
        let el = doc.get_mut(node).unwrap();
        if !class.is_empty() {
            el.set_class_name(class);
        }
        for (name, value) in attrs {
            el.set_attribute(name, value);
        }
        doc.append_child(parent, node);
        node
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let body = doc.body();

        let lang_bn = add(&mut doc, body, "button", "lang-btn active", &[("id", "langBn")]);
        let lang_en = add(&mut doc, body, "button", "lang-btn", &[("id", "langEn")]);
        let main = add(&mut doc, body, "main", "", &[]);
        let heading = add(
            &mut doc,
            main,
            "h1",
            "bilingual section-header",
            &[("data-bn", "স্বাগতম"), ("data-en", "Welcome")],
        );
        let copy_button = add(&mut doc, main, "button", "copy-btn btn", &[]);
        let copy_icon = add(&mut doc, copy_button, "i", "fas fa-copy", &[]);
        let anchor = add(&mut doc, main, "a", "", &[("href", "#contact")]);
        let hover = add(&mut doc, main, "div", "info-item", &[]);
        let card = add(&mut doc, main, "div", "info-card", &[("id", "contact")]);

        let site = Site::new(
            Config::default(),
            doc,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryClipboard::new()),
        );
        Fixture {
            site,
            lang_bn,
            lang_en,
            heading,
            copy_icon,
            copy_button,
            anchor,
            hover,
            card,
        }
    }

    fn text_of(site: &Site, node: NodeId) -> String {
        site.document().lock().text_content(node)
    }

    // ==================== Start-up Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_start_renders_default_language() {
        let f = fixture();
        f.site.start().settle().await;

        assert_eq!(text_of(&f.site, f.heading), "স্বাগতম");
        assert_eq!(f.site.current_language(), Language::Bengali);
        assert!(f.site.is_observed(f.card));
        assert!(f.site.document().lock().get_element_by_id("site-runtime-styles").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_binds_once() {
        let f = fixture();
        f.site.start().settle().await;
        let count = f.site.listener_count();

        let again = f.site.start();
        assert_eq!(again.pending_tasks(), 0);
        assert_eq!(f.site.listener_count(), count);
    }

    // ==================== Dispatch Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_click_switch_control() {
        let f = fixture();
        f.site.start().settle().await;

        let dispatch = f.site.click(f.lang_en);
        assert_eq!(dispatch.handled(), 1);
        assert!(!dispatch.default_prevented());
        dispatch.settle().await;

        assert_eq!(f.site.current_language(), Language::English);
        assert_eq!(text_of(&f.site, f.heading), "Welcome");
        let doc = f.site.document().lock();
        assert!(doc.get(f.lang_en).unwrap().has_class("active"));
        assert!(!doc.get(f.lang_bn).unwrap().has_class("active"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_bubbles_to_copy_button() {
        let f = fixture();
        f.site.start().settle().await;

        let original = f.site.document().lock().inner_html(f.copy_button);
        assert_eq!(original, r#"<i class="fas fa-copy"></i>"#);

        let dispatch = f.site.click(f.copy_icon);
        assert!(dispatch.default_prevented());
        dispatch.settle().await;

        {
            let doc = f.site.document().lock();
            assert!(doc.inner_html(f.copy_button).contains("fa-check"));
            assert!(doc.get(f.copy_icon).is_none());
        }

        sleep(Duration::from_millis(2010)).await;
        assert_eq!(f.site.document().lock().inner_html(f.copy_button), original);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_anchor_scrolls() {
        let f = fixture();
        f.site.start().settle().await;

        let dispatch = f.site.click(f.anchor);
        assert!(dispatch.default_prevented());
        let doc = f.site.document().lock();
        assert_eq!(doc.scroll_requests().len(), 1);
        assert_eq!(doc.scroll_requests()[0].target, f.card);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_events_do_not_bubble() {
        let f = fixture();
        f.site.start().settle().await;

        assert_eq!(f.site.dispatch(Event::pointer_enter(f.hover)).handled(), 1);
        assert_eq!(
            f.site.document().lock().get(f.hover).unwrap().style("transform"),
            Some("translateY(-2px)")
        );
        // The copy button is a `.btn`, its icon is not.
        assert_eq!(f.site.dispatch(Event::pointer_enter(f.copy_icon)).handled(), 0);
        f.site.dispatch(Event::pointer_leave(f.hover));
        assert_eq!(
            f.site.document().lock().get(f.hover).unwrap().style("transform"),
            Some("translateY(0)")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_before_start_does_nothing() {
        let f = fixture();
        let dispatch = f.site.click(f.lang_en);
        assert_eq!(dispatch.handled(), 0);
        assert_eq!(f.site.current_language(), Language::Bengali);
    }

    // ==================== Reveal Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_report_layout_reveals_once() {
        let f = fixture();
        f.site.start().settle().await;
        let viewport = Viewport::new(1024.0, 768.0);

        let offscreen = [(f.card, Rect::new(0.0, 2000.0, 300.0, 200.0))];
        assert!(f.site.report_layout(&offscreen, viewport).is_empty());

        let visible = [(f.card, Rect::new(0.0, 100.0, 300.0, 200.0))];
        assert_eq!(f.site.report_layout(&visible, viewport), vec![f.card]);
        assert!(!f.site.is_observed(f.card));
        assert!(f.site.report_layout(&visible, viewport).is_empty());
    }
}
