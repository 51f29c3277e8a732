//! Fade-in on scroll.
//!
//! Elements get the `visible` class the first time enough of them is on
//! screen, then are dropped from observation. CSS does the actual fade.

use grove_shared::Rect;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{class, CommandBuffer, ElementId};

/// Reveal settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Visible fraction at which an element is revealed.
    pub threshold: f32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self { threshold: 0.15 }
    }
}

/// Tracks fade-in elements that have not been revealed yet.
#[derive(Debug, Clone, Default)]
pub struct RevealObserver {
    settings: RevealSettings,
    observed: Vec<ElementId>,
}

impl RevealObserver {
    /// Creates an observer with nothing observed.
    #[must_use]
    pub fn new(settings: RevealSettings) -> Self {
        Self {
            settings,
            observed: Vec::new(),
        }
    }

    /// Starts observing `elements`.
    ///
    /// Without intersection support there is no way to tell what is on
    /// screen, so everything is revealed immediately and nothing is kept.
    pub fn observe(
        &mut self,
        elements: impl IntoIterator<Item = ElementId>,
        intersection_supported: bool,
        out: &mut CommandBuffer,
    ) {
        if intersection_supported {
            self.observed.extend(elements);
            debug!(observed = self.observed.len(), "Fade-in observer started");
        } else {
            let mut revealed = 0;
            for element in elements {
                out.add_class(element, class::VISIBLE);
                revealed += 1;
            }
            debug!(revealed, "No intersection support, revealing all fade-in elements");
        }
    }

    /// Elements still waiting to be revealed.
    #[must_use]
    pub fn observed(&self) -> &[ElementId] {
        &self.observed
    }

    /// True once every element has been revealed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.observed.is_empty()
    }

    /// Reveals every observed element at least `threshold` visible in
    /// `viewport`. Elements with unknown bounds stay observed.
    ///
    /// Returns how many were revealed.
    pub fn check<F>(&mut self, viewport: &Rect, mut bounds: F, out: &mut CommandBuffer) -> usize
    where
        F: FnMut(ElementId) -> Option<Rect>,
    {
        let threshold = self.settings.threshold;
        let before = self.observed.len();
        self.observed.retain(|&element| {
            let visible = bounds(element).is_some_and(|rect| {
                let fraction = rect.visible_fraction(viewport);
                fraction > 0.0 && fraction >= threshold
            });
            if visible {
                out.add_class(element, class::VISIBLE);
            }
            !visible
        });
        before - self.observed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomCommand;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    fn ids(n: u32) -> Vec<ElementId> {
        (0..n).map(ElementId).collect()
    }

    #[test]
    fn test_no_support_reveals_everything() {
        let mut obs = RevealObserver::new(RevealSettings::default());
        let mut out = CommandBuffer::new();
        obs.observe(ids(4), false, &mut out);
        assert_eq!(out.len(), 4);
        assert!(obs.is_done());
    }

    #[test]
    fn test_threshold_and_unobserve() {
        let mut obs = RevealObserver::new(RevealSettings::default());
        let mut out = CommandBuffer::new();
        obs.observe(ids(3), true, &mut out);
        assert!(out.is_empty());

        // 0: fully on screen, 1: 10% on screen, 2: far below.
        let rects = [
            Rect::new(0.0, 100.0, 500.0, 200.0),
            Rect::new(0.0, 780.0, 500.0, 200.0),
            Rect::new(0.0, 5000.0, 500.0, 200.0),
        ];
        let bounds = |id: ElementId| rects.get(id.0 as usize).copied();

        assert_eq!(obs.check(&VIEWPORT, bounds, &mut out), 1);
        assert_eq!(
            out.commands(),
            &[DomCommand::AddClass {
                element: ElementId(0),
                class: class::VISIBLE
            }]
        );
        assert_eq!(obs.observed(), &[ElementId(1), ElementId(2)]);

        // Re-checking does not reveal element 0 again.
        out.drain();
        assert_eq!(obs.check(&VIEWPORT, bounds, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_bounds_stay_observed() {
        let mut obs = RevealObserver::new(RevealSettings::default());
        let mut out = CommandBuffer::new();
        obs.observe(ids(2), true, &mut out);
        assert_eq!(obs.check(&VIEWPORT, |_| None, &mut out), 0);
        assert_eq!(obs.observed().len(), 2);
    }
}
