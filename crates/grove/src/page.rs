//! # Host Page
//!
//! What the effects need from the page they decorate, as a trait, plus an
//! in-memory page used by the CLI and the tests.

use std::collections::BTreeMap;

use grove_rendering::{Canvas, Surface, Viewport};
use grove_shared::Rect;
use grove_ui::{DomCommand, ElementId};

/// Class markers the effects look for.
pub mod selector {
    /// Canvas for the brain cloud.
    pub const CLOUD: &str = "hero__cloud";
    /// Container for the corner vines.
    pub const MARGINALIA: &str = "marginalia";
    /// Canvas for the constellation.
    pub const CONSTELLATION: &str = "constellation";
    /// Accordion root.
    pub const ACCORDION: &str = "accordion";
    /// One accordion item inside the root.
    pub const ACCORDION_ITEM: &str = "accordion__item";
    /// The item's toggle button.
    pub const ACCORDION_TRIGGER: &str = "accordion__trigger";
    /// The item's collapsible panel.
    pub const ACCORDION_PANEL: &str = "accordion__panel";
    /// Glitching text.
    pub const GLITCH: &str = "glitch";
    /// Revealed on scroll.
    pub const FADE_IN: &str = "fade-in";
}

/// Optional host features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Canvas elements can hand out a 2D drawing surface.
    pub canvas_2d: bool,
    /// The host can report element visibility.
    pub intersection_observer: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            canvas_2d: true,
            intersection_observer: true,
        }
    }
}

/// The page the effects run on.
pub trait HostPage {
    /// Features this host supports.
    fn capabilities(&self) -> Capabilities;

    /// Every element carrying `class`, in document order.
    fn query_all(&self, class: &str) -> Vec<ElementId>;

    /// Descendants of `parent` carrying `class`, in document order.
    fn query_within(&self, parent: ElementId, class: &str) -> Vec<ElementId>;

    /// Whether `element` currently carries `class`.
    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Layout box in page coordinates.
    fn bounds(&self, element: ElementId) -> Option<Rect>;

    /// Natural height of the element's content, ignoring any height set on it.
    fn content_height(&self, element: ElementId) -> Option<f32>;

    /// Text content.
    fn text(&self, element: ElementId) -> Option<String>;

    /// True when the element has no child elements, so replacing its text
    /// loses nothing.
    fn is_text_only(&self, element: ElementId) -> bool;

    /// Visible part of the page, in page coordinates.
    fn viewport(&self) -> Rect;

    /// Device pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f32;

    /// 2D surface of a canvas element, or `None` when the element cannot
    /// draw.
    fn surface(&mut self, element: ElementId) -> Option<&mut dyn Surface>;

    /// Applies one mutation.
    fn apply(&mut self, command: DomCommand);
}

/// One element of a [`MemoryPage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryElement {
    /// Parent element.
    pub parent: Option<ElementId>,
    /// Classes, space-separated on a real page.
    pub classes: Vec<String>,
    /// Attributes.
    pub attributes: BTreeMap<String, String>,
    /// Inline style properties.
    pub styles: BTreeMap<String, String>,
    /// Text content.
    pub text: String,
    /// Generated child markup.
    pub markup: Option<String>,
    /// Layout box.
    pub bounds: Rect,
    /// Natural content height.
    pub content_height: f32,
    /// Backing raster for canvas elements, created on first use.
    pub canvas: Option<Canvas>,
}

/// A page held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    elements: Vec<MemoryElement>,
    viewport: Rect,
    device_pixel_ratio: f32,
    capabilities: Capabilities,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl MemoryPage {
    /// Empty page with a `width`×`height` viewport scrolled to the top.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: Vec::new(),
            viewport: Rect::new(0.0, 0.0, width, height),
            device_pixel_ratio: 1.0,
            capabilities: Capabilities::default(),
        }
    }

    /// Sets the device pixel ratio.
    #[must_use]
    pub fn with_device_pixel_ratio(mut self, dpr: f32) -> Self {
        self.device_pixel_ratio = if dpr > 0.0 { dpr } else { 1.0 };
        self
    }

    /// Overrides the reported capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Adds a top-level element.
    pub fn add(&mut self, classes: &[&str], bounds: Rect) -> ElementId {
        self.insert(None, classes, bounds)
    }

    /// Adds an element under `parent`.
    pub fn add_child(&mut self, parent: ElementId, classes: &[&str], bounds: Rect) -> ElementId {
        self.insert(Some(parent), classes, bounds)
    }

    fn insert(&mut self, parent: Option<ElementId>, classes: &[&str], bounds: Rect) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(MemoryElement {
            parent,
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            bounds,
            content_height: bounds.height,
            ..MemoryElement::default()
        });
        id
    }

    /// Element by id.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&MemoryElement> {
        self.elements.get(id.0 as usize)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut MemoryElement> {
        self.elements.get_mut(id.0 as usize)
    }

    /// Sets an element's text.
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(el) = self.element_mut(id) {
            text.clone_into(&mut el.text);
        }
    }

    /// Sets an element's natural content height.
    pub fn set_content_height(&mut self, id: ElementId, height: f32) {
        if let Some(el) = self.element_mut(id) {
            el.content_height = height;
        }
    }

    /// Moves an element.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(el) = self.element_mut(id) {
            el.bounds = bounds;
        }
    }

    /// Scrolls the viewport to `y`.
    pub fn scroll_to(&mut self, y: f32) {
        self.viewport.y = y;
    }

    /// Resizes the viewport.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    /// Attribute value.
    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)?.attributes.get(name).map(String::as_str)
    }

    /// Inline style value.
    #[must_use]
    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.element(id)?.styles.get(property).map(String::as_str)
    }

    /// Generated markup.
    #[must_use]
    pub fn markup(&self, id: ElementId) -> Option<&str> {
        self.element(id)?.markup.as_deref()
    }

    /// Raster backing a canvas element, once it has been drawn to.
    #[must_use]
    pub fn canvas(&self, id: ElementId) -> Option<&Canvas> {
        self.element(id)?.canvas.as_ref()
    }

    fn is_descendant(&self, mut id: ElementId, ancestor: ElementId) -> bool {
        while let Some(parent) = self.element(id).and_then(|e| e.parent) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    fn ids(&self) -> impl Iterator<Item = ElementId> {
        (0..self.elements.len() as u32).map(ElementId)
    }
}

impl HostPage for MemoryPage {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn query_all(&self, class: &str) -> Vec<ElementId> {
        self.ids().filter(|&id| self.has_class(id, class)).collect()
    }

    fn query_within(&self, parent: ElementId, class: &str) -> Vec<ElementId> {
        self.ids()
            .filter(|&id| self.has_class(id, class) && self.is_descendant(id, parent))
            .collect()
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn bounds(&self, element: ElementId) -> Option<Rect> {
        self.element(element).map(|e| e.bounds)
    }

    fn content_height(&self, element: ElementId) -> Option<f32> {
        self.element(element).map(|e| e.content_height)
    }

    fn text(&self, element: ElementId) -> Option<String> {
        self.element(element).map(|e| e.text.clone())
    }

    fn is_text_only(&self, element: ElementId) -> bool {
        self.element(element).is_some_and(|e| e.markup.is_none())
            && !self.elements.iter().any(|e| e.parent == Some(element))
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn surface(&mut self, element: ElementId) -> Option<&mut dyn Surface> {
        if !self.capabilities.canvas_2d {
            return None;
        }
        let dpr = self.device_pixel_ratio;
        let el = self.element_mut(element)?;
        let bounds = el.bounds;
        let canvas = el
            .canvas
            .get_or_insert_with(|| Canvas::new(Viewport::new(bounds.width, bounds.height, dpr)));
        Some(canvas)
    }

    fn apply(&mut self, command: DomCommand) {
        let Some(el) = self.element_mut(command.element()) else {
            return;
        };
        match command {
            DomCommand::AddClass { class, .. } => {
                if !el.classes.iter().any(|c| c == class) {
                    el.classes.push(class.to_owned());
                }
            }
            DomCommand::RemoveClass { class, .. } => el.classes.retain(|c| c != class),
            DomCommand::SetAttribute { name, value, .. } => {
                el.attributes.insert(name.to_owned(), value);
            }
            DomCommand::SetStyle { property, value, .. } => {
                el.styles.insert(property.to_owned(), value);
            }
            DomCommand::SetText { text, .. } => el.text = text,
            DomCommand::SetMarkup { markup, .. } => el.markup = Some(markup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_ui::class;

    #[test]
    fn test_queries() {
        let mut page = MemoryPage::default();
        let root = page.add(&[selector::ACCORDION], Rect::new(0.0, 0.0, 100.0, 100.0));
        let item = page.add_child(root, &[selector::ACCORDION_ITEM], Rect::ZERO);
        let trigger = page.add_child(item, &[selector::ACCORDION_TRIGGER], Rect::ZERO);
        let other = page.add(&[selector::ACCORDION_TRIGGER], Rect::ZERO);

        assert_eq!(page.query_all(selector::ACCORDION_TRIGGER), vec![trigger, other]);
        assert_eq!(page.query_within(root, selector::ACCORDION_TRIGGER), vec![trigger]);
        assert!(page.query_within(item, selector::ACCORDION).is_empty());

        assert!(!page.is_text_only(item));
        assert!(page.is_text_only(trigger));
        assert!(!page.is_text_only(ElementId(99)));
    }

    #[test]
    fn test_apply_commands() {
        let mut page = MemoryPage::default();
        let el = page.add(&[selector::FADE_IN], Rect::ZERO);
        page.apply(DomCommand::AddClass {
            element: el,
            class: class::VISIBLE,
        });
        page.apply(DomCommand::AddClass {
            element: el,
            class: class::VISIBLE,
        });
        assert_eq!(page.element(el).unwrap().classes.len(), 2);
        assert!(page.has_class(el, class::VISIBLE));

        page.apply(DomCommand::SetStyle {
            element: el,
            property: "height",
            value: "12.0px".to_owned(),
        });
        assert_eq!(page.style(el, "height"), Some("12.0px"));

        // Unknown elements are ignored.
        page.apply(DomCommand::SetText {
            element: ElementId(99),
            text: String::new(),
        });
    }

    #[test]
    fn test_surface_respects_capability() {
        let mut page = MemoryPage::default().with_device_pixel_ratio(2.0);
        let el = page.add(&[selector::CLOUD], Rect::new(0.0, 0.0, 50.0, 40.0));
        assert!(page.surface(el).is_some());
        let canvas = page.canvas(el).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (100, 80));

        let mut bare = MemoryPage::default().with_capabilities(Capabilities {
            canvas_2d: false,
            intersection_observer: true,
        });
        let el = bare.add(&[selector::CLOUD], Rect::new(0.0, 0.0, 50.0, 40.0));
        assert!(bare.surface(el).is_none());
    }
}
