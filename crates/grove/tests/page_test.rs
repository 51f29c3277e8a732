//! # Page Orchestration Tests
//!
//! `Grove` driven against an in-memory page:
//! - every marked element gets its effect
//! - missing capabilities degrade instead of failing
//! - frames are reproducible for a fixed seed

use grove::procedural::BrainShape;
use grove::shared::{GroveSeed, Rect};
use grove::ui::{class, ElementId};
use grove::{selector, Capabilities, Grove, GroveConfig, HostPage, MemoryPage};

struct Site {
    page: MemoryPage,
    cloud: ElementId,
    constellation: ElementId,
    marginalia: ElementId,
    near_fade: ElementId,
    far_fade: ElementId,
    items: Vec<(ElementId, ElementId, ElementId)>,
    glitch: ElementId,
}

fn config() -> GroveConfig {
    let mut config = GroveConfig::default();
    config.cloud.brain.count = 80;
    config
}

fn site(capabilities: Capabilities) -> Site {
    let mut page = MemoryPage::new(1280.0, 800.0).with_capabilities(capabilities);
    let cloud = page.add(&[selector::CLOUD], Rect::new(0.0, 0.0, 640.0, 400.0));
    let marginalia = page.add(&[selector::MARGINALIA], Rect::new(0.0, 0.0, 1280.0, 800.0));
    let near_fade = page.add(&[selector::FADE_IN], Rect::new(0.0, 420.0, 600.0, 200.0));
    let far_fade = page.add(&[selector::FADE_IN], Rect::new(0.0, 2_000.0, 600.0, 200.0));

    let root = page.add(&[selector::ACCORDION], Rect::new(0.0, 1_000.0, 600.0, 400.0));
    let mut items = Vec::new();
    for open in [false, true] {
        let classes: &[&str] = if open {
            &[selector::ACCORDION_ITEM, class::IS_OPEN]
        } else {
            &[selector::ACCORDION_ITEM]
        };
        let item = page.add_child(root, classes, Rect::ZERO);
        let trigger = page.add_child(item, &[selector::ACCORDION_TRIGGER], Rect::ZERO);
        let panel = page.add_child(item, &[selector::ACCORDION_PANEL], Rect::ZERO);
        page.set_content_height(panel, 120.0);
        items.push((item, trigger, panel));
    }

    let glitch = page.add(&[selector::GLITCH], Rect::new(0.0, 40.0, 300.0, 60.0));
    page.set_text(glitch, "THE GROVE");
    let constellation = page.add(&[selector::CONSTELLATION], Rect::new(0.0, 1_600.0, 800.0, 300.0));

    Site {
        page,
        cloud,
        constellation,
        marginalia,
        near_fade,
        far_fade,
        items,
        glitch,
    }
}

/// Test: A fully marked page gets every effect.
#[test]
fn test_init_wires_every_effect() {
    let mut site = site(Capabilities::default());
    let mut grove = Grove::init(&mut site.page, &config()).unwrap();

    assert!(grove.has_cloud());
    assert!(grove.has_constellation());
    assert_eq!(grove.marginalia(), &[site.marginalia]);
    assert_eq!(grove.accordion_count(), 1);
    assert_eq!(grove.glitch_count(), 1);

    let markup = site.page.markup(site.marginalia).unwrap();
    assert!(markup.starts_with("<svg"));
    assert!(markup.contains("marginalia__stroke"));

    let report = grove.frame(&mut site.page, 16.0);
    assert_eq!(report.cloud.unwrap().particles, 80);
    assert!(report.constellation.is_some());
    assert!(site.page.canvas(site.cloud).unwrap().painted_pixels() > 0);
    assert!(site.page.canvas(site.constellation).is_some());
}

/// Test: Fade-in elements are revealed once, as they scroll into view.
#[test]
fn test_scroll_reveal() {
    let mut site = site(Capabilities::default());
    let mut grove = Grove::init(&mut site.page, &config()).unwrap();

    assert_eq!(grove.frame(&mut site.page, 0.0).revealed, 1);
    assert!(site.page.has_class(site.near_fade, class::VISIBLE));
    assert!(!site.page.has_class(site.far_fade, class::VISIBLE));
    assert_eq!(grove.pending_reveals(), &[site.far_fade]);

    site.page.scroll_to(1_700.0);
    assert_eq!(grove.frame(&mut site.page, 16.0).revealed, 1);
    assert!(site.page.has_class(site.far_fade, class::VISIBLE));
    assert!(grove.pending_reveals().is_empty());

    site.page.scroll_to(0.0);
    assert_eq!(grove.frame(&mut site.page, 32.0).revealed, 0);
}

/// Test: Without an intersection observer everything is visible at once.
#[test]
fn test_no_observer_reveals_everything() {
    let mut site = site(Capabilities {
        canvas_2d: true,
        intersection_observer: false,
    });
    let grove = Grove::init(&mut site.page, &config()).unwrap();
    assert!(site.page.has_class(site.near_fade, class::VISIBLE));
    assert!(site.page.has_class(site.far_fade, class::VISIBLE));
    assert!(grove.pending_reveals().is_empty());
}

/// Test: Without a 2D context the canvases are left alone; the rest still runs.
#[test]
fn test_no_canvas_degrades() {
    let mut site = site(Capabilities {
        canvas_2d: false,
        intersection_observer: true,
    });
    let mut grove = Grove::init(&mut site.page, &config()).unwrap();
    assert!(!grove.has_cloud());
    assert!(!grove.has_constellation());
    assert_eq!(grove.glitch_count(), 1);

    let report = grove.frame(&mut site.page, 16.0);
    assert_eq!(report.cloud, None);
    assert!(site.page.canvas(site.cloud).is_none());
    assert!(site.page.markup(site.marginalia).is_some());
}

/// Test: Clicking a trigger opens its item and the panel settles at `auto`.
#[test]
fn test_accordion_click() {
    let mut site = site(Capabilities::default());
    let mut grove = Grove::init(&mut site.page, &config()).unwrap();
    let (item, trigger, panel) = site.items[0];
    let (open_item, _, open_panel) = site.items[1];

    assert!(!site.page.has_class(item, class::IS_OPEN));
    assert_eq!(site.page.attribute(trigger, "aria-expanded"), Some("false"));
    assert_eq!(site.page.style(open_panel, "height"), Some("auto"));
    assert!(site.page.has_class(open_item, class::IS_OPEN));

    assert!(grove.click(&mut site.page, trigger));
    assert!(site.page.has_class(item, class::IS_OPEN));
    assert_eq!(site.page.attribute(trigger, "aria-expanded"), Some("true"));
    // Not exclusive by default.
    assert!(site.page.has_class(open_item, class::IS_OPEN));

    let mut t = 0.0;
    while t <= 500.0 {
        grove.frame(&mut site.page, t);
        t += 16.0;
    }
    assert_eq!(site.page.style(panel, "height"), Some("auto"));

    assert!(grove.click(&mut site.page, trigger));
    assert!(!site.page.has_class(item, class::IS_OPEN));
    assert!(!grove.click(&mut site.page, site.glitch));
}

/// Test: Exclusive accordions close the other items.
#[test]
fn test_exclusive_accordion() {
    let mut site = site(Capabilities::default());
    let mut config = config();
    config.accordion.exclusive = true;
    let mut grove = Grove::init(&mut site.page, &config).unwrap();
    let (item, trigger, _) = site.items[0];
    let (open_item, open_trigger, _) = site.items[1];

    grove.click(&mut site.page, trigger);
    assert!(site.page.has_class(item, class::IS_OPEN));
    assert!(!site.page.has_class(open_item, class::IS_OPEN));
    assert_eq!(site.page.attribute(open_trigger, "aria-expanded"), Some("false"));
}

/// Test: A glitch burst scrambles the text and the original comes back.
#[test]
fn test_glitch_restores_text() {
    let mut site = site(Capabilities {
        canvas_2d: false,
        intersection_observer: true,
    });
    let config = config();
    let mut grove = Grove::init(&mut site.page, &config).unwrap();

    let mut t = 0.0;
    let mut seen_burst = false;
    while t < config.glitch.interval_ms * 2.0 {
        grove.frame(&mut site.page, t);
        seen_burst |= site.page.has_class(site.glitch, class::IS_GLITCHING);
        t += 10.0;
    }
    assert!(seen_burst);

    while site.page.has_class(site.glitch, class::IS_GLITCHING) {
        t += 10.0;
        grove.frame(&mut site.page, t);
    }
    assert_eq!(site.page.element(site.glitch).unwrap().text, "THE GROVE");
}

/// Test: Same seed, same pixels and vines; another seed, other vines.
#[test]
fn test_reproducible_for_seed() {
    let render = |seed: u64| {
        let mut site = site(Capabilities::default());
        let mut config = config();
        config.seed = GroveSeed::new(seed);
        let mut grove = Grove::init(&mut site.page, &config).unwrap();
        grove.frame(&mut site.page, 750.0);
        let pixels = site.page.canvas(site.cloud).unwrap().as_bytes().to_vec();
        let markup = site.page.markup(site.marginalia).unwrap().to_owned();
        (pixels, markup)
    };

    let (pixels, markup) = render(11);
    let (again_pixels, again_markup) = render(11);
    assert!(pixels == again_pixels);
    assert_eq!(markup, again_markup);

    let (_, other_markup) = render(12);
    assert_ne!(markup, other_markup);
}

/// Test: A zero-sized canvas is attached but never drawn into.
#[test]
fn test_zero_sized_canvas() {
    let mut page = MemoryPage::new(800.0, 600.0);
    let el = page.add(&[selector::CLOUD], Rect::ZERO);
    let mut grove = Grove::init(&mut page, &config()).unwrap();
    let report = grove.frame(&mut page, 100.0);
    assert_eq!(report.cloud.unwrap().particles, 0);
    assert_eq!(page.canvas(el).unwrap().painted_pixels(), 0);
}

/// Test: A brain cloud that cannot be sampled is skipped; the other effects still run.
#[test]
fn test_failed_cloud_leaves_other_effects() {
    let mut site = site(Capabilities::default());
    let mut config = config();
    config.cloud.brain.shape = BrainShape::Implicit;
    config.cloud.brain.sampler.shell = 1e-6;
    config.cloud.brain.sampler.attempts_per_point = 1;

    let mut grove = Grove::init(&mut site.page, &config).unwrap();
    assert!(!grove.has_cloud());
    assert!(grove.has_constellation());
    assert_eq!(grove.accordion_count(), 1);
    assert_eq!(grove.glitch_count(), 1);

    let report = grove.frame(&mut site.page, 0.0);
    assert_eq!(report.cloud, None);
    assert_eq!(report.revealed, 1);
    assert!(site.page.has_class(site.near_fade, class::VISIBLE));
}

/// Test: An invalid configuration is rejected before anything is attached.
#[test]
fn test_invalid_config_rejected() {
    let mut site = site(Capabilities::default());
    let mut config = config();
    config.cloud.brain.count = 0;
    assert!(Grove::init(&mut site.page, &config).is_err());
}

/// Test: Resizes are applied once the debounce period has passed.
#[test]
fn test_resize_is_debounced() {
    let mut site = site(Capabilities::default());
    let config = config();
    let mut grove = Grove::init(&mut site.page, &config).unwrap();
    grove.frame(&mut site.page, 0.0);

    site.page.set_viewport_size(1280.0, 2_400.0);
    site.page.set_bounds(site.cloud, Rect::new(0.0, 0.0, 320.0, 200.0));
    grove.resize(&site.page, 10.0);
    assert!(!grove.frame(&mut site.page, 20.0).resized);

    let settled = 10.0 + config.resize_debounce_ms + 1.0;
    let report = grove.frame(&mut site.page, settled);
    assert!(report.resized);
    assert_eq!(site.page.canvas(site.cloud).unwrap().width(), 320);
    // The taller viewport now reaches the far fade-in element.
    assert!(site.page.has_class(site.far_fade, class::VISIBLE));
}

/// Test: A glitch element with child elements keeps its content.
#[test]
fn test_glitch_keeps_child_markup() {
    let mut page = MemoryPage::new(800.0, 600.0);
    let glitch = page.add(&[selector::GLITCH], Rect::new(0.0, 0.0, 300.0, 60.0));
    page.set_text(glitch, "THE GROVE");
    page.add_child(glitch, &["glitch__accent"], Rect::ZERO);
    let config = config();
    let mut grove = Grove::init(&mut page, &config).unwrap();

    let mut t = 0.0;
    let mut seen_burst = false;
    while t < config.glitch.interval_ms * 2.0 {
        grove.frame(&mut page, t);
        seen_burst |= page.has_class(glitch, class::IS_GLITCHING);
        assert_eq!(page.element(glitch).unwrap().text, "THE GROVE");
        t += 10.0;
    }
    assert!(seen_burst);
}
