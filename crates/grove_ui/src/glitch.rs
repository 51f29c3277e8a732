//! # Glitch Effect
//!
//! Every `interval_ms` a short burst fires at a seeded offset inside the
//! cycle. During a burst the element shows horizontal slice offsets, a red
//! and blue channel split, and optionally scrambled glyphs. The burst
//! redraws at `step_ms` so it flickers rather than animates.
//!
//! ## Purity
//!
//! [`GlitchState::at`] derives everything from `(seed, t)`: the cycle
//! number picks a per-cycle stream, the step number inside the burst picks
//! a per-step stream. Nothing carries over between calls.

use grove_shared::GroveSeed;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{class, CommandBuffer, ElementId};

/// Stream id for per-cycle scheduling.
const CYCLE_STREAM: u64 = 0x6C17_C400;
/// Stream id for per-step visuals.
const STEP_STREAM: u64 = 0x6C17_C500;

/// Glitch tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchSettings {
    /// Cycle length (ms).
    pub interval_ms: f64,
    /// Burst length (ms).
    pub burst_ms: f64,
    /// Redraw period inside a burst (ms).
    pub step_ms: f64,
    /// Number of displaced slices.
    pub slices: usize,
    /// Largest horizontal slice offset (px).
    pub max_offset_px: f32,
    /// Largest channel split (px).
    pub max_split_px: f32,
    /// Replace some characters during bursts.
    pub scramble: bool,
    /// Probability each visible character is replaced.
    pub scramble_chance: f32,
    /// Replacement glyphs.
    pub glyphs: String,
}

impl Default for GlitchSettings {
    fn default() -> Self {
        Self {
            interval_ms: 4_200.0,
            burst_ms: 280.0,
            step_ms: 60.0,
            slices: 4,
            max_offset_px: 8.0,
            max_split_px: 3.0,
            scramble: true,
            scramble_chance: 0.22,
            glyphs: "!<>-_\\/[]{}=+*^?#".to_owned(),
        }
    }
}

/// One displaced horizontal band, in fractions of the element height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    /// Top edge, `[0, 1)`.
    pub top: f32,
    /// Height, `(0, 1 - top]`.
    pub height: f32,
    /// Horizontal offset (px, signed).
    pub offset: f32,
}

/// The look of the element at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchState {
    /// True during a burst.
    pub active: bool,
    /// Displaced slices (empty when idle).
    pub slices: Vec<Slice>,
    /// Red channel shift (px); blue shifts the opposite way.
    pub split: f32,
    /// Scrambled text, when scrambling is on and a burst is running.
    pub text: Option<String>,
}

impl GlitchState {
    /// Idle state.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            active: false,
            slices: Vec::new(),
            split: 0.0,
            text: None,
        }
    }

    /// State at time `t` (ms) for `text`.
    #[must_use]
    pub fn at(seed: GroveSeed, t: f64, text: &str, settings: &GlitchSettings) -> Self {
        let interval = settings.interval_ms;
        let burst = settings.burst_ms.clamp(0.0, interval.max(0.0));
        if !(interval > 0.0 && burst > 0.0 && t >= 0.0) {
            return Self::idle();
        }

        let cycle = (t / interval).floor();
        let cycle_id = cycle as u64;
        let mut rng = seed.derive(CYCLE_STREAM ^ cycle_id).rng();
        let start = rng.gen::<f64>() * (interval - burst);
        let elapsed = t - cycle * interval - start;
        if !(0.0..burst).contains(&elapsed) {
            return Self::idle();
        }

        let step = (elapsed / settings.step_ms.max(1.0)).floor() as u64;
        let mut rng = seed
            .derive(STEP_STREAM ^ cycle_id)
            .derive(step)
            .rng();

        let mut slices = Vec::with_capacity(settings.slices);
        for _ in 0..settings.slices {
            let top = rng.gen::<f32>() * 0.9;
            let height = (0.04 + rng.gen::<f32>() * 0.2).min(1.0 - top);
            let offset = (rng.gen::<f32>() * 2.0 - 1.0) * settings.max_offset_px;
            slices.push(Slice { top, height, offset });
        }
        let split = (0.3 + rng.gen::<f32>() * 0.7) * settings.max_split_px;

        let text = settings
            .scramble
            .then(|| scramble(text, &settings.glyphs, settings.scramble_chance, &mut rng));

        Self {
            active: true,
            slices,
            split,
            text,
        }
    }
}

/// Replaces some non-whitespace characters with random glyphs.
fn scramble<R: Rng + ?Sized>(text: &str, glyphs: &str, chance: f32, rng: &mut R) -> String {
    let pool: Vec<char> = glyphs.chars().collect();
    if pool.is_empty() {
        return text.to_owned();
    }
    text.chars()
        .map(|c| {
            if !c.is_whitespace() && rng.gen::<f32>() < chance {
                pool[rng.gen_range(0..pool.len())]
            } else {
                c
            }
        })
        .collect()
}

/// Drives one `.glitch` element.
#[derive(Debug, Clone)]
pub struct GlitchEffect {
    element: ElementId,
    seed: GroveSeed,
    settings: GlitchSettings,
    original: String,
    swap_text: bool,
    last: GlitchState,
}

impl GlitchEffect {
    /// Creates the effect for `element`, whose text is `original`.
    #[must_use]
    pub fn new(
        element: ElementId,
        original: String,
        seed: GroveSeed,
        settings: GlitchSettings,
    ) -> Self {
        debug!(element = element.0, seed = seed.value(), "Glitch effect attached");
        Self {
            element,
            seed,
            settings,
            original,
            swap_text: true,
            last: GlitchState::idle(),
        }
    }

    /// Whether scrambled text replaces the element's content. Turn off for
    /// elements with child markup; `data-text` still carries the scramble.
    #[must_use]
    pub fn with_text_swap(mut self, swap: bool) -> Self {
        self.swap_text = swap;
        self
    }

    /// Element being driven.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// State at time `t`; see [`GlitchState::at`].
    #[must_use]
    pub fn state(&self, t: f64) -> GlitchState {
        GlitchState::at(self.seed, t, &self.original, &self.settings)
    }

    /// Advances to time `t`, emitting only what changed.
    pub fn frame(&mut self, t: f64, out: &mut CommandBuffer) {
        let state = self.state(t);
        if state == self.last {
            return;
        }
        let el = self.element;

        if state.active != self.last.active {
            out.toggle_class(el, class::IS_GLITCHING, state.active);
        }

        if state.active {
            out.set_style(el, "--glitch-split", format!("{:.2}px", state.split));
            let clip = state
                .slices
                .iter()
                .map(|s| format!("{:.3} {:.3} {:.2}", s.top, s.height, s.offset))
                .collect::<Vec<_>>()
                .join(",");
            out.set_attribute(el, "data-glitch-slices", clip);
            if let Some(text) = &state.text {
                out.set_attribute(el, "data-text", text.clone());
                if self.swap_text {
                    out.set_text(el, text.clone());
                }
            }
        } else {
            out.set_style(el, "--glitch-split", "0px");
            out.set_attribute(el, "data-glitch-slices", "");
            if self.last.text.is_some() {
                out.set_attribute(el, "data-text", self.original.clone());
                if self.swap_text {
                    out.set_text(el, self.original.clone());
                }
            }
        }
        self.last = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_burst(seed: GroveSeed, settings: &GlitchSettings) -> f64 {
        (0..(settings.interval_ms as usize))
            .map(|ms| ms as f64)
            .find(|&t| GlitchState::at(seed, t, "x", settings).active)
            .unwrap()
    }

    #[test]
    fn test_one_burst_per_cycle() {
        let settings = GlitchSettings::default();
        let seed = GroveSeed::new(5);
        let active_ms = (0..settings.interval_ms as usize)
            .filter(|&ms| GlitchState::at(seed, ms as f64, "x", &settings).active)
            .count();
        assert!((279..=281).contains(&active_ms), "active for {active_ms} ms");
    }

    #[test]
    fn test_burst_shape() {
        let settings = GlitchSettings::default();
        let seed = GroveSeed::new(9);
        let t = first_burst(seed, &settings);
        let state = GlitchState::at(seed, t, "The Grove", &settings);
        assert_eq!(state.slices.len(), 4);
        for s in &state.slices {
            assert!(s.top >= 0.0 && s.top + s.height <= 1.0 + 1e-6);
            assert!(s.offset.abs() <= settings.max_offset_px);
        }
        assert!(state.split > 0.0 && state.split <= settings.max_split_px);
        let text = state.text.unwrap();
        assert_eq!(text.chars().count(), 9);
        assert_eq!(text.chars().nth(3), Some(' '));
    }

    #[test]
    fn test_scramble_off() {
        let settings = GlitchSettings {
            scramble: false,
            ..GlitchSettings::default()
        };
        let seed = GroveSeed::new(1);
        let t = first_burst(seed, &settings);
        assert_eq!(GlitchState::at(seed, t, "abc", &settings).text, None);
    }

    #[test]
    fn test_effect_restores_text() {
        let settings = GlitchSettings::default();
        let seed = GroveSeed::new(3);
        let t = first_burst(seed, &settings);
        let after = t + settings.burst_ms + 0.5;
        let mut fx = GlitchEffect::new(ElementId(1), "signal".to_owned(), seed, settings);
        let mut out = CommandBuffer::new();

        fx.frame(t, &mut out);
        assert!(out.commands().iter().any(|c| matches!(
            c,
            crate::dom::DomCommand::AddClass { class: "is-glitching", .. }
        )));
        out.drain();

        fx.frame(after, &mut out);
        assert!(out.commands().iter().any(|c| matches!(
            c,
            crate::dom::DomCommand::SetText { text, .. } if text == "signal"
        )));
    }

    #[test]
    fn test_markup_kept_without_text_swap() {
        let settings = GlitchSettings::default();
        let seed = GroveSeed::new(3);
        let t = first_burst(seed, &settings);
        let after = t + settings.burst_ms + 0.5;
        let mut fx = GlitchEffect::new(ElementId(1), "signal".to_owned(), seed, settings)
            .with_text_swap(false);
        let mut out = CommandBuffer::new();

        fx.frame(t, &mut out);
        fx.frame(after, &mut out);
        let commands = out.commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, crate::dom::DomCommand::SetAttribute { name: "data-text", .. })));
        assert!(!commands
            .iter()
            .any(|c| matches!(c, crate::dom::DomCommand::SetText { .. })));
    }

    #[test]
    fn test_degenerate_settings_idle() {
        let settings = GlitchSettings {
            interval_ms: 0.0,
            ..GlitchSettings::default()
        };
        assert!(!GlitchState::at(GroveSeed::new(1), 10.0, "x", &settings).active);
    }
}
