//! # Browser Entry
//!
//! `start()` runs when the wasm module loads. It wraps the live document in
//! a [`HostPage`], attaches every effect through [`Grove::init`], and drives
//! frames from `requestAnimationFrame`.
//!
//! A page without the marked elements, or a browser without a 2D context,
//! simply gets fewer effects.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use grove_rendering::{GlowSprite, Surface, Viewport};
use grove_shared::{Rect, Rgba, Vec2};
use grove_ui::{DomCommand, ElementId};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, ImageData, Window,
};

use crate::app::Grove;
use crate::config::GroveConfig;
use crate::page::{selector, Capabilities, HostPage};

/// 2D canvas context behind the [`Surface`] trait.
struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    document: Document,
    viewport: Viewport,
    /// Sprites uploaded as offscreen canvases, keyed by size and colour.
    sprites: HashMap<(u32, u8, u8, u8), HtmlCanvasElement>,
}

impl WebSurface {
    fn new(document: Document, canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            ctx,
            document,
            viewport: Viewport::default(),
            sprites: HashMap::new(),
        })
    }

    fn uploaded(&mut self, sprite: &GlowSprite) -> Option<HtmlCanvasElement> {
        let color = sprite.color();
        let key = (sprite.size(), color.r, color.g, color.b);
        if let Some(canvas) = self.sprites.get(&key) {
            return Some(canvas.clone());
        }
        let canvas = self
            .document
            .create_element("canvas")
            .ok()?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        canvas.set_width(sprite.size());
        canvas.set_height(sprite.size());
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(sprite.as_bytes()),
            sprite.size(),
            sprite.size(),
        )
        .ok()?;
        ctx.put_image_data(&data, 0.0, 0.0).ok()?;
        self.sprites.insert(key, canvas.clone());
        Some(canvas)
    }
}

impl Surface for WebSurface {
    fn resize(&mut self, viewport: Viewport) {
        let (w, h) = viewport.backing_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let k = f64::from(viewport.device_pixel_ratio);
        // Draw in CSS pixels on a device-pixel backing store.
        let _ = self.ctx.set_transform(k, 0.0, 0.0, k, 0.0, 0.0);
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(self.viewport.width),
            f64::from(self.viewport.height),
        );
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let (x, y, r) = (f64::from(center.x), f64::from(center.y), f64::from(radius));
        let Ok(gradient) = self.ctx.create_radial_gradient(x, y, 0.0, x, y, r) else {
            return;
        };
        let _ = gradient.add_color_stop(0.0, &inner.to_string());
        let _ = gradient.add_color_stop(1.0, &outer.to_string());
        self.ctx.set_fill_style(&gradient);
        self.ctx.fill_rect(x - r, y - r, r * 2.0, r * 2.0);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(from.x), f64::from(from.y));
        self.ctx.line_to(f64::from(to.x), f64::from(to.y));
        self.ctx.set_line_width(f64::from(width));
        self.ctx.set_stroke_style(&JsValue::from_str(&color.to_string()));
        self.ctx.stroke();
    }

    fn sprite(&mut self, sprite: &GlowSprite, center: Vec2, size: f32, alpha: f32) {
        let Some(image) = self.uploaded(sprite) else {
            return;
        };
        let half = f64::from(size) * 0.5;
        self.ctx.set_global_alpha(f64::from(alpha));
        let _ = self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            &image,
            f64::from(center.x) - half,
            f64::from(center.y) - half,
            f64::from(size),
            f64::from(size),
        );
        self.ctx.set_global_alpha(1.0);
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            0.0,
            TAU,
        );
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_string()));
        self.ctx.fill();
    }
}

/// The live document.
struct WebPage {
    window: Window,
    document: Document,
    /// Registry behind [`ElementId`]; queries take `&self` but may register.
    elements: RefCell<Vec<Element>>,
    surfaces: HashMap<ElementId, WebSurface>,
}

impl WebPage {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            elements: RefCell::new(Vec::new()),
            surfaces: HashMap::new(),
        }
    }

    /// Stable id for `element`, registering it on first sight.
    fn id_of(&self, element: Element) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        if let Some(i) = elements.iter().position(|e| *e == element) {
            return ElementId(i as u32);
        }
        elements.push(element);
        ElementId((elements.len() - 1) as u32)
    }

    fn lookup(&self, element: &Element) -> Option<ElementId> {
        self.elements
            .borrow()
            .iter()
            .position(|e| e == element)
            .map(|i| ElementId(i as u32))
    }

    fn get(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0 as usize).cloned()
    }

    fn collect(&self, list: Option<web_sys::NodeList>) -> Vec<ElementId> {
        let Some(list) = list else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i)?.dyn_into::<Element>().ok())
            .map(|el| self.id_of(el))
            .collect()
    }

    fn scroll(&self) -> (f32, f32) {
        (
            self.window.scroll_x().unwrap_or(0.0) as f32,
            self.window.scroll_y().unwrap_or(0.0) as f32,
        )
    }

    fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }
}

impl HostPage for WebPage {
    fn capabilities(&self) -> Capabilities {
        let observer =
            js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
                .unwrap_or(false);
        Capabilities {
            canvas_2d: true,
            intersection_observer: observer,
        }
    }

    fn query_all(&self, class: &str) -> Vec<ElementId> {
        self.collect(self.document.query_selector_all(&format!(".{class}")).ok())
    }

    fn query_within(&self, parent: ElementId, class: &str) -> Vec<ElementId> {
        let Some(parent) = self.get(parent) else {
            return Vec::new();
        };
        self.collect(parent.query_selector_all(&format!(".{class}")).ok())
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.get(element)
            .is_some_and(|el| el.class_list().contains(class))
    }

    fn bounds(&self, element: ElementId) -> Option<Rect> {
        let rect = self.get(element)?.get_bounding_client_rect();
        let (sx, sy) = self.scroll();
        Some(Rect::new(
            rect.x() as f32 + sx,
            rect.y() as f32 + sy,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn content_height(&self, element: ElementId) -> Option<f32> {
        self.get(element).map(|el| el.scroll_height() as f32)
    }

    fn text(&self, element: ElementId) -> Option<String> {
        self.get(element)?.text_content()
    }

    fn is_text_only(&self, element: ElementId) -> bool {
        self.get(element)
            .is_some_and(|el| el.child_element_count() == 0)
    }

    fn viewport(&self) -> Rect {
        let (sx, sy) = self.scroll();
        let size =
            |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        Rect::new(
            sx,
            sy,
            size(self.window.inner_width()),
            size(self.window.inner_height()),
        )
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }

    fn surface(&mut self, element: ElementId) -> Option<&mut dyn Surface> {
        if !self.surfaces.contains_key(&element) {
            let canvas = self.get(element)?.dyn_into::<HtmlCanvasElement>().ok()?;
            let surface = WebSurface::new(self.document.clone(), canvas)?;
            self.surfaces.insert(element, surface);
        }
        self.surfaces
            .get_mut(&element)
            .map(|s| s as &mut dyn Surface)
    }

    fn apply(&mut self, command: DomCommand) {
        let Some(el) = self.get(command.element()) else {
            return;
        };
        let _ = match command {
            DomCommand::AddClass { class, .. } => el.class_list().add_1(class),
            DomCommand::RemoveClass { class, .. } => el.class_list().remove_1(class),
            DomCommand::SetAttribute { name, value, .. } => el.set_attribute(name, &value),
            DomCommand::SetStyle { property, value, .. } => match el.dyn_ref::<HtmlElement>() {
                Some(html) => html.style().set_property(property, &value),
                None => Ok(()),
            },
            DomCommand::SetText { text, .. } => {
                el.set_text_content(Some(&text));
                Ok(())
            }
            DomCommand::SetMarkup { markup, .. } => {
                el.set_inner_html(&markup);
                Ok(())
            }
        };
    }
}

struct App {
    page: WebPage,
    grove: Grove,
}

/// Module entry point.
///
/// # Errors
///
/// Returns the configuration or generation error as a JS string; the page
/// keeps working without decoration.
#[allow(unsafe_code)] // the export wrapper generated by wasm-bindgen is `no_mangle`
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let Some(document) = window.document() else {
        return Ok(());
    };

    let mut page = WebPage::new(window.clone(), document.clone());
    let config = GroveConfig::default();
    let grove = Grove::init(&mut page, &config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !grove.has_cloud() {
        web_sys::console::debug_1(&JsValue::from_str("grove: no brain cloud on this page"));
    }

    let app = Rc::new(RefCell::new(App { page, grove }));

    let resize = {
        let app = Rc::clone(&app);
        Closure::wrap(Box::new(move || {
            let mut app = app.borrow_mut();
            let now = app.page.now();
            let App { page, grove } = &mut *app;
            grove.resize(page, now);
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();

    let click = {
        let app = Rc::clone(&app);
        Closure::wrap(Box::new(move |ev: web_sys::Event| {
            let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let trigger = format!(".{}", selector::ACCORDION_TRIGGER);
            let Ok(Some(trigger)) = target.closest(&trigger) else {
                return;
            };
            let mut app = app.borrow_mut();
            let App { page, grove } = &mut *app;
            if let Some(id) = page.lookup(&trigger) {
                grove.click(page, id);
            }
        }) as Box<dyn FnMut(_)>)
    };
    document.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
    click.forget();

    // The frame closure reschedules itself, so it holds a handle to its own slot.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = Rc::clone(&f);
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        {
            let mut app = app.borrow_mut();
            let now = app.page.now();
            let App { page, grove } = &mut *app;
            grove.frame(page, now);
        }
        if let Some(callback) = f.borrow().as_ref() {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}
