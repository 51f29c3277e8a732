//! Accordion.
//!
//! Each item has a root element (gets `is-open`), a trigger (gets
//! `aria-expanded`) and a panel whose height is tweened between 0 and its
//! content height.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{Animation, Easing};
use crate::dom::{class, CommandBuffer, ElementId};

/// Accordion behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccordionSettings {
    /// Opening one item closes the others.
    pub exclusive: bool,
    /// Panel height tween (ms).
    pub duration_ms: f32,
    /// Tween curve.
    pub easing: Easing,
}

impl Default for AccordionSettings {
    fn default() -> Self {
        Self {
            exclusive: false,
            duration_ms: 350.0,
            easing: Easing::ExponentialOut,
        }
    }
}

/// Elements making up one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccordionParts {
    /// Item root.
    pub item: ElementId,
    /// Toggle button.
    pub trigger: ElementId,
    /// Collapsible panel.
    pub panel: ElementId,
}

#[derive(Debug, Clone)]
struct Item {
    parts: AccordionParts,
    open: bool,
    content_height: f32,
    height: Animation,
}

/// A group of collapsible items.
#[derive(Debug, Clone, Default)]
pub struct Accordion {
    settings: AccordionSettings,
    items: Vec<Item>,
}

impl Accordion {
    /// Creates an empty accordion.
    #[must_use]
    pub fn new(settings: AccordionSettings) -> Self {
        Self {
            settings,
            items: Vec::new(),
        }
    }

    /// Adds an item and emits its initial state. Returns its index.
    pub fn push(
        &mut self,
        parts: AccordionParts,
        content_height: f32,
        open: bool,
        out: &mut CommandBuffer,
    ) -> usize {
        let content_height = content_height.max(0.0);
        let resting = if open { content_height } else { 0.0 };
        let height =
            Animation::new(resting, self.settings.easing).with_duration(self.settings.duration_ms);
        self.items.push(Item {
            parts,
            open,
            content_height,
            height,
        });
        let index = self.items.len() - 1;
        self.emit_state(index, out);
        out.set_style(parts.panel, "height", resting_height(open));
        index
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether item `index` is open.
    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|i| i.open)
    }

    /// Current panel height of item `index`.
    #[must_use]
    pub fn panel_height(&self, index: usize) -> Option<f32> {
        self.items.get(index).map(|i| i.height.value())
    }

    /// Index of the item whose trigger is `trigger`.
    #[must_use]
    pub fn find_trigger(&self, trigger: ElementId) -> Option<usize> {
        self.items.iter().position(|i| i.parts.trigger == trigger)
    }

    /// Updates the measured content height of item `index`.
    pub fn set_content_height(&mut self, index: usize, height: f32) {
        if let Some(item) = self.items.get_mut(index) {
            item.content_height = height.max(0.0);
            if item.open {
                item.height.set_target(item.content_height);
            }
        }
    }

    /// Flips item `index`. Returns false when there is no such item.
    pub fn toggle(&mut self, index: usize, out: &mut CommandBuffer) -> bool {
        let Some(open) = self.items.get(index).map(|i| !i.open) else {
            return false;
        };
        if open && self.settings.exclusive {
            for other in 0..self.items.len() {
                if other != index && self.items[other].open {
                    self.set_open(other, false, out);
                }
            }
        }
        self.set_open(index, open, out);
        debug!(index, open, "Accordion toggled");
        true
    }

    /// Advances panel tweens by `dt` ms and writes changed heights.
    pub fn update(&mut self, dt: f32, out: &mut CommandBuffer) {
        for item in &mut self.items {
            if item.height.is_complete() {
                continue;
            }
            item.height.update(dt);
            if item.height.is_complete() && item.open {
                // Let content reflow freely once open.
                out.set_style(item.parts.panel, "height", "auto");
            } else {
                out.set_style(item.parts.panel, "height", px(item.height.value()));
            }
        }
    }

    fn set_open(&mut self, index: usize, open: bool, out: &mut CommandBuffer) {
        let item = &mut self.items[index];
        item.open = open;
        item.height.set_target(if open { item.content_height } else { 0.0 });
        if item.height.is_complete() {
            // Nothing to tween, so `update` will skip it.
            out.set_style(item.parts.panel, "height", resting_height(open));
        }
        self.emit_state(index, out);
    }

    fn emit_state(&self, index: usize, out: &mut CommandBuffer) {
        let item = &self.items[index];
        out.toggle_class(item.parts.item, class::IS_OPEN, item.open);
        out.set_attribute(
            item.parts.trigger,
            "aria-expanded",
            if item.open { "true" } else { "false" },
        );
    }
}

fn px(v: f32) -> String {
    format!("{v:.1}px")
}

/// Panel height once no tween is running.
fn resting_height(open: bool) -> String {
    if open {
        "auto".to_owned()
    } else {
        px(0.0)
    }
}
