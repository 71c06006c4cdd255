//! Scroll-reveal: a one-shot transition for elements entering the viewport.
//!
//! [`RevealObserver`] mirrors an intersection observer: elements are observed,
//! intersection entries are reported for them, and the first intersecting
//! entry reveals the element and stops observing it. The geometry helpers
//! compute entries from element rectangles so hosts without a native
//! observer can drive it from layout.

use crate::dom::{Document, NodeId};
use std::collections::BTreeSet;
use tracing::debug;

/// Elements that reveal on first sight.
pub const REVEAL_SELECTOR: &str = ".info-card, .section-header, .treatment-category";

/// Class added to revealed elements.
pub const REVEALED_CLASS: &str = "fade-in";

/// Extra animation applied to revealed info cards.
pub const INFO_CARD_ANIMATION: &str = "fadeIn 0.8s ease-in-out";

/// Root margin in pixels; negative values shrink the root.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    /// Minimum visible fraction of the element, in `0.0..=1.0`
    pub threshold: f64,
    pub root_margin: Margin,
}

impl Default for RevealOptions {
    /// Threshold 0.1, root margin `0px 0px -50px 0px`.
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: Margin {
                bottom: -50.0,
                ..Margin::default()
            },
        }
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles, if they touch or overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// The viewport adjusted by the root margin.
pub fn root_bounds(viewport: Viewport, margin: Margin) -> Rect {
    Rect::new(
        -margin.left,
        -margin.top,
        viewport.width + margin.left + margin.right,
        viewport.height + margin.top + margin.bottom,
    )
}

/// Fraction of `target` inside `root`.
///
/// A zero-area target that touches the root counts as fully visible.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    match target.intersection(root) {
        None => 0.0,
        Some(_) if target.area() == 0.0 => 1.0,
        Some(overlap) => (overlap.area() / target.area()).clamp(0.0, 1.0),
    }
}

/// Whether `rect` lies entirely inside the viewport.
pub fn is_in_viewport(rect: &Rect, viewport: Viewport) -> bool {
    rect.y >= 0.0 && rect.x >= 0.0 && rect.bottom() <= viewport.height && rect.right() <= viewport.width
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Compute the entry for `target` laid out at `rect`.
    pub fn compute(target: NodeId, rect: &Rect, viewport: Viewport, options: &RevealOptions) -> Self {
        let root = root_bounds(viewport, options.root_margin);
        let ratio = intersection_ratio(rect, &root);
        let touches = rect.intersection(&root).is_some();
        Self {
            target,
            ratio,
            is_intersecting: touches && ratio >= options.threshold,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevealObserver {
    options: RevealOptions,
    observed: BTreeSet<NodeId>,
}

impl RevealObserver {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            options,
            observed: BTreeSet::new(),
        }
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    pub fn observe(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    /// Observe every element matching [`REVEAL_SELECTOR`]. Returns how many
    /// elements are now observed.
    pub fn observe_targets(&mut self, doc: &Document) -> usize {
        for node in doc.query_selector_all(REVEAL_SELECTOR) {
            self.observe(node);
        }
        self.observed.len()
    }

    pub fn unobserve(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Entries for the observed elements among `layout`.
    pub fn entries_for(&self, layout: &[(NodeId, Rect)], viewport: Viewport) -> Vec<IntersectionEntry> {
        layout
            .iter()
            .filter(|(node, _)| self.is_observed(*node))
            .map(|(node, rect)| IntersectionEntry::compute(*node, rect, viewport, &self.options))
            .collect()
    }

    /// Apply intersection entries. Each observed element that intersects is
    /// revealed and unobserved; entries for unobserved elements are ignored.
    /// Returns the newly revealed elements.
    pub fn handle_entries(&mut self, doc: &mut Document, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        let mut revealed = Vec::new();
        for entry in entries {
            if !entry.is_intersecting || !self.is_observed(entry.target) {
                continue;
            }
            if let Some(el) = doc.get_mut(entry.target) {
                el.add_class(REVEALED_CLASS);
                if el.has_class("info-card") {
                    el.set_style("animation", INFO_CARD_ANIMATION);
                }
            }
            self.unobserve(entry.target);
            revealed.push(entry.target);
        }
        if !revealed.is_empty() {
            debug!(
                "Revealed {} elements, {} still observed",
                revealed.len(),
                self.observed.len()
            );
        }
        revealed
    }
}
