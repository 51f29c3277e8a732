//! # Page Orchestration
//!
//! [`Grove`] owns every effect attached to one page. `init` generates the
//! static data and attaches what the page supports; `frame` advances all
//! effects to a point in time and applies their commands.
//!
//! ```text
//! init ──► generate (once) ──► attach per capability
//!                                     │
//! frame(t) ──► resize? ──► reveal ──► accordions ──► glitch ──► canvases
//!                                     │
//!                              CommandBuffer ──► HostPage::apply
//! ```

use grove_procedural::{generate_brain, generate_satellites, generate_stars, Marginalia};
use grove_rendering::{
    render_svg, ConstellationStats, ConstellationView, FrameStats, PointCloud, ResizeDebouncer,
    Viewport,
};
use grove_shared::GroveSeed;
use grove_ui::{
    Accordion, AccordionParts, CommandBuffer, ElementId, GlitchEffect, RevealObserver,
};
use tracing::{debug, trace, warn};

use crate::config::GroveConfig;
use crate::error::GroveResult;
use crate::page::{selector, HostPage};

/// Seed streams, one per generator.
mod stream {
    pub const BRAIN: u64 = 0x0B2A_1000;
    pub const SATELLITES: u64 = 0x5A7E_1000;
    pub const STARS: u64 = 0x57A2_1000;
    pub const MARGINALIA: u64 = 0x3A26_1000;
    pub const GLITCH: u64 = 0x6C17_1000;
}

/// What one call to [`Grove::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Brain cloud statistics, when attached.
    pub cloud: Option<FrameStats>,
    /// Constellation statistics, when attached.
    pub constellation: Option<ConstellationStats>,
    /// Fade-in elements revealed this frame.
    pub revealed: usize,
    /// Page commands applied.
    pub commands: usize,
    /// True when a debounced resize was applied.
    pub resized: bool,
}

#[derive(Debug)]
struct AccordionGroup {
    root: ElementId,
    accordion: Accordion,
    parts: Vec<AccordionParts>,
}

/// Every effect attached to one page.
#[derive(Debug)]
pub struct Grove {
    cloud: Option<(ElementId, PointCloud)>,
    constellation: Option<(ElementId, ConstellationView)>,
    marginalia: Vec<ElementId>,
    reveal: RevealObserver,
    accordions: Vec<AccordionGroup>,
    glitches: Vec<GlitchEffect>,
    debouncer: ResizeDebouncer,
    commands: CommandBuffer,
    last_t: Option<f64>,
}

impl Grove {
    /// Generates the static data and attaches every effect `page` supports.
    ///
    /// Missing elements or capabilities skip the effect, and so does a
    /// generator that fails on an otherwise valid configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` or `Procedural` when `config` fails validation.
    pub fn init<P: HostPage + ?Sized>(page: &mut P, config: &GroveConfig) -> GroveResult<Self> {
        config.validate()?;
        let seed = config.seed;
        let caps = page.capabilities();
        let dpr = page.device_pixel_ratio();
        let mut commands = CommandBuffer::new();

        let cloud = match page.query_all(selector::CLOUD).first().copied() {
            Some(el) => attach_cloud(page, el, dpr, seed, config),
            None => {
                debug!("No cloud element, skipping brain cloud");
                None
            }
        };

        let constellation = page
            .query_all(selector::CONSTELLATION)
            .first()
            .copied()
            .and_then(|el| attach_constellation(page, el, dpr, seed, config));

        let marginalia = attach_marginalia(page, seed, config, &mut commands);

        let mut reveal = RevealObserver::new(config.reveal);
        reveal.observe(
            page.query_all(selector::FADE_IN),
            caps.intersection_observer,
            &mut commands,
        );

        let accordions = page
            .query_all(selector::ACCORDION)
            .into_iter()
            .map(|root| attach_accordion(page, root, config, &mut commands))
            .collect();

        let glitches = page
            .query_all(selector::GLITCH)
            .into_iter()
            .enumerate()
            .map(|(i, el)| {
                let text = page.text(el).unwrap_or_default();
                let seed = seed.derive(stream::GLITCH).derive(i as u64);
                let text_only = page.is_text_only(el);
                if !text_only {
                    debug!(element = el.0, "Glitch element has children, text left in place");
                }
                GlitchEffect::new(el, text, seed, config.glitch.clone()).with_text_swap(text_only)
            })
            .collect();

        let mut grove = Self {
            cloud,
            constellation,
            marginalia,
            reveal,
            accordions,
            glitches,
            debouncer: ResizeDebouncer::new(config.resize_debounce_ms),
            commands,
            last_t: None,
        };
        let applied = grove.flush(page);
        debug!(
            cloud = grove.cloud.is_some(),
            constellation = grove.constellation.is_some(),
            marginalia = grove.marginalia.len(),
            accordions = grove.accordions.len(),
            glitches = grove.glitches.len(),
            applied,
            "Grove initialized"
        );
        Ok(grove)
    }

    /// True when the brain cloud is attached.
    #[must_use]
    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    /// True when the constellation is attached.
    #[must_use]
    pub fn has_constellation(&self) -> bool {
        self.constellation.is_some()
    }

    /// Containers that received generated vines.
    #[must_use]
    pub fn marginalia(&self) -> &[ElementId] {
        &self.marginalia
    }

    /// Fade-in elements not yet revealed.
    #[must_use]
    pub fn pending_reveals(&self) -> &[ElementId] {
        self.reveal.observed()
    }

    /// Number of attached accordions.
    #[must_use]
    pub fn accordion_count(&self) -> usize {
        self.accordions.len()
    }

    /// Number of attached glitch effects.
    #[must_use]
    pub fn glitch_count(&self) -> usize {
        self.glitches.len()
    }

    /// Handles a click on `element`. Returns true when it was an accordion
    /// trigger.
    pub fn click<P: HostPage + ?Sized>(&mut self, page: &mut P, element: ElementId) -> bool {
        let mut handled = false;
        for group in &mut self.accordions {
            let Some(index) = group.accordion.find_trigger(element) else {
                continue;
            };
            // Content may have reflowed since the last toggle.
            for (i, parts) in group.parts.iter().enumerate() {
                if let Some(height) = page.content_height(parts.panel) {
                    group.accordion.set_content_height(i, height);
                }
            }
            handled = group.accordion.toggle(index, &mut self.commands);
            trace!(root = group.root.0, index, "Accordion trigger clicked");
            break;
        }
        self.flush(page);
        handled
    }

    /// Records a viewport change at `now` (ms); applied by a later
    /// [`Grove::frame`] once the debounce period has passed.
    pub fn resize<P: HostPage + ?Sized>(&mut self, page: &P, now: f64) {
        let view = page.viewport();
        self.debouncer.notify(
            now,
            Viewport::new(view.width, view.height, page.device_pixel_ratio()),
        );
    }

    /// Advances every effect to time `t` (ms).
    pub fn frame<P: HostPage + ?Sized>(&mut self, page: &mut P, t: f64) -> FrameReport {
        let dt = self.last_t.map_or(0.0, |last| (t - last).max(0.0)) as f32;
        self.last_t = Some(t);
        let mut report = FrameReport::default();

        if let Some(viewport) = self.debouncer.poll(t) {
            self.apply_resize(page, viewport.device_pixel_ratio);
            report.resized = true;
        }

        if !self.reveal.is_done() {
            let view = page.viewport();
            report.revealed = self
                .reveal
                .check(&view, |el| page.bounds(el), &mut self.commands);
        }

        for group in &mut self.accordions {
            group.accordion.update(dt, &mut self.commands);
        }

        for glitch in &mut self.glitches {
            glitch.frame(t, &mut self.commands);
        }

        if let Some((el, cloud)) = &mut self.cloud {
            if let Some(surface) = page.surface(*el) {
                report.cloud = Some(cloud.frame(t, surface));
            }
        }

        if let Some((el, view)) = &mut self.constellation {
            if let Some(surface) = page.surface(*el) {
                report.constellation = Some(view.frame(t, surface));
            }
        }

        report.commands = self.flush(page);
        trace!(
            t,
            revealed = report.revealed,
            commands = report.commands,
            "Grove frame"
        );
        report
    }

    fn apply_resize<P: HostPage + ?Sized>(&mut self, page: &mut P, dpr: f32) {
        if let Some((el, cloud)) = &mut self.cloud {
            let viewport = element_viewport(page, *el, dpr);
            if let Some(surface) = page.surface(*el) {
                cloud.resize(viewport, surface);
            }
        }
        if let Some((el, view)) = &mut self.constellation {
            let viewport = element_viewport(page, *el, dpr);
            if let Some(surface) = page.surface(*el) {
                view.resize(viewport, surface);
            }
        }
    }

    fn flush<P: HostPage + ?Sized>(&mut self, page: &mut P) -> usize {
        let mut applied = 0;
        for command in self.commands.drain() {
            page.apply(command);
            applied += 1;
        }
        applied
    }
}

fn element_viewport<P: HostPage + ?Sized>(page: &P, el: ElementId, dpr: f32) -> Viewport {
    let bounds = page.bounds(el).unwrap_or_default();
    Viewport::new(bounds.width, bounds.height, dpr)
}

fn attach_cloud<P: HostPage + ?Sized>(
    page: &mut P,
    el: ElementId,
    dpr: f32,
    seed: GroveSeed,
    config: &GroveConfig,
) -> Option<(ElementId, PointCloud)> {
    let viewport = element_viewport(page, el, dpr);
    let Some(surface) = page.surface(el) else {
        debug!(element = el.0, "No 2D context, skipping brain cloud");
        return None;
    };
    let mut rng = seed.derive(stream::BRAIN).rng();
    let particles = match generate_brain(&config.cloud.brain, &mut rng) {
        Ok(particles) => particles,
        Err(e) => {
            warn!(element = el.0, error = %e, "Brain cloud skipped");
            return None;
        }
    };
    let satellites = generate_satellites(
        &config.satellites,
        &mut seed.derive(stream::SATELLITES).rng(),
    );
    let mut cloud = PointCloud::new(particles, satellites, config.cloud.render, viewport);
    cloud.resize(viewport, surface);
    Some((el, cloud))
}

fn attach_constellation<P: HostPage + ?Sized>(
    page: &mut P,
    el: ElementId,
    dpr: f32,
    seed: GroveSeed,
    config: &GroveConfig,
) -> Option<(ElementId, ConstellationView)> {
    let viewport = element_viewport(page, el, dpr);
    let Some(surface) = page.surface(el) else {
        debug!(element = el.0, "No 2D context, skipping constellation");
        return None;
    };
    let stars = generate_stars(
        &config.constellation.stars,
        &mut seed.derive(stream::STARS).rng(),
    );
    let mut view = ConstellationView::new(stars, config.constellation.style, viewport);
    view.resize(viewport, surface);
    Some((el, view))
}

fn attach_marginalia<P: HostPage + ?Sized>(
    page: &P,
    seed: GroveSeed,
    config: &GroveConfig,
    out: &mut CommandBuffer,
) -> Vec<ElementId> {
    let fallback = page.viewport();
    page.query_all(selector::MARGINALIA)
        .into_iter()
        .enumerate()
        .filter_map(|(i, el)| {
            let bounds = page.bounds(el).filter(|b| b.area() > 0.0).unwrap_or(fallback);
            let seed = seed.derive(stream::MARGINALIA).derive(i as u64);
            match Marginalia::grow(seed, bounds.width, bounds.height, &config.marginalia.growth) {
                Ok(vines) => {
                    out.set_markup(el, render_svg(&vines, &config.marginalia.svg));
                    Some(el)
                }
                Err(e) => {
                    warn!(element = el.0, error = %e, "Marginalia skipped");
                    None
                }
            }
        })
        .collect()
}

fn attach_accordion<P: HostPage + ?Sized>(
    page: &P,
    root: ElementId,
    config: &GroveConfig,
    out: &mut CommandBuffer,
) -> AccordionGroup {
    let mut accordion = Accordion::new(config.accordion);
    let mut parts = Vec::new();
    for item in page.query_within(root, selector::ACCORDION_ITEM) {
        let trigger = page.query_within(item, selector::ACCORDION_TRIGGER).first().copied();
        let panel = page.query_within(item, selector::ACCORDION_PANEL).first().copied();
        let (Some(trigger), Some(panel)) = (trigger, panel) else {
            warn!(item = item.0, "Accordion item without trigger or panel");
            continue;
        };
        let part = AccordionParts {
            item,
            trigger,
            panel,
        };
        let height = page.content_height(panel).unwrap_or(0.0);
        let open = page.has_class(item, grove_ui::class::IS_OPEN);
        accordion.push(part, height, open, out);
        parts.push(part);
    }
    AccordionGroup {
        root,
        accordion,
        parts,
    }
}
