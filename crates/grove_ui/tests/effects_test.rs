//! # Effect Tests
//!
//! Cross-module behaviour of the page effects:
//! - glitch state is a pure function of (seed, t)
//! - reveal never emits the same element twice

use grove_shared::{GroveSeed, Rect};
use grove_ui::{
    class, CommandBuffer, DomCommand, ElementId, GlitchSettings, GlitchState, RevealObserver,
    RevealSettings,
};
use proptest::prelude::*;

proptest! {
    /// Test: Same seed and time, same glitch; evaluation order is irrelevant.
    #[test]
    fn prop_glitch_pure(seed in any::<u64>(), t in 0.0f64..1.0e9, other in 0.0f64..1.0e9) {
        let settings = GlitchSettings::default();
        let seed = GroveSeed::new(seed);
        let first = GlitchState::at(seed, t, "The Grove", &settings);
        let _ = GlitchState::at(seed, other, "The Grove", &settings);
        prop_assert_eq!(first, GlitchState::at(seed, t, "The Grove", &settings));
    }

    /// Test: Slices stay inside the element for any time.
    #[test]
    fn prop_glitch_slices_bounded(seed in any::<u64>(), t in 0.0f64..1.0e7) {
        let settings = GlitchSettings::default();
        let state = GlitchState::at(GroveSeed::new(seed), t, "abc", &settings);
        for s in &state.slices {
            prop_assert!(s.top >= 0.0 && s.height > 0.0 && s.top + s.height <= 1.0 + 1e-6);
        }
        if !state.active {
            prop_assert!(state.slices.is_empty());
        }
    }
}

/// Test: Scrolling down a long page reveals each section exactly once.
#[test]
fn test_scroll_reveals_each_once() {
    let sections: Vec<Rect> = (0..10)
        .map(|i| Rect::new(0.0, i as f32 * 600.0, 800.0, 400.0))
        .collect();
    let mut obs = RevealObserver::new(RevealSettings::default());
    let mut out = CommandBuffer::new();
    obs.observe((0..10).map(ElementId), true, &mut out);

    for scroll in (0..=6000).step_by(100) {
        let viewport = Rect::new(0.0, scroll as f32, 800.0, 700.0);
        obs.check(&viewport, |id| sections.get(id.0 as usize).copied(), &mut out);
    }

    assert!(obs.is_done());
    let mut revealed: Vec<u32> = out
        .commands()
        .iter()
        .map(|c| match c {
            DomCommand::AddClass { element, class: name } => {
                assert_eq!(*name, class::VISIBLE);
                element.0
            }
            other => panic!("unexpected command {other:?}"),
        })
        .collect();
    revealed.sort_unstable();
    assert_eq!(revealed, (0..10).collect::<Vec<_>>());
}
