//! Debounced resize handling.
//!
//! Browsers fire resize events in bursts. The debouncer keeps only the last
//! viewport of a burst and releases it once no new event has arrived for
//! `delay_ms`.

use crate::surface::Viewport;

/// Default quiet period before a resize is applied.
pub const DEFAULT_RESIZE_DELAY_MS: f64 = 200.0;

/// Trailing-edge debouncer driven by the caller's clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDebouncer {
    delay_ms: f64,
    pending: Option<(f64, Viewport)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DELAY_MS)
    }
}

impl ResizeDebouncer {
    /// Creates a debouncer with the given quiet period (negative means 0).
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: None,
        }
    }

    /// Records a resize event at `now` (ms). Restarts the quiet period.
    pub fn notify(&mut self, now: f64, viewport: Viewport) {
        self.pending = Some((now + self.delay_ms, viewport));
    }

    /// True while a resize is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the settled viewport once the quiet period has passed.
    pub fn poll(&mut self, now: f64) -> Option<Viewport> {
        match self.pending {
            Some((deadline, viewport)) if now >= deadline => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_collapses_to_last() {
        let mut d = ResizeDebouncer::default();
        d.notify(0.0, Viewport::new(100.0, 100.0, 1.0));
        d.notify(50.0, Viewport::new(200.0, 100.0, 1.0));
        d.notify(120.0, Viewport::new(300.0, 100.0, 1.0));

        assert_eq!(d.poll(250.0), None);
        let settled = d.poll(320.0).unwrap();
        assert_eq!(settled.width, 300.0);
        assert_eq!(d.poll(1_000.0), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let mut d = ResizeDebouncer::new(-5.0);
        d.notify(10.0, Viewport::default());
        assert!(d.is_pending());
        assert!(d.poll(10.0).is_some());
        assert!(!d.is_pending());
    }
}
