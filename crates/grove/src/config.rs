//! # Configuration
//!
//! One TOML file, read once at startup. Every section and field has a
//! default equal to the site's look, so a file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 42
//!
//! [cloud.brain]
//! count = 320
//! shape = "implicit"
//!
//! [glitch]
//! interval_ms = 6000.0
//! ```

use std::path::Path;

use grove_procedural::{BrainSettings, ConstellationSettings, MarginaliaSettings, SatelliteSettings};
use grove_rendering::{CloudSettings, ConstellationStyle, SvgStyle, DEFAULT_RESIZE_DELAY_MS};
use grove_shared::GroveSeed;
use grove_ui::{AccordionSettings, GlitchSettings, RevealSettings};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GroveError, GroveResult};

/// Brain cloud: what to generate and how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Particle generation.
    pub brain: BrainSettings,
    /// Per-frame transform and drawing.
    pub render: CloudSettings,
}

/// Constellation: star field and look.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationConfig {
    /// Star generation.
    pub stars: ConstellationSettings,
    /// Links and colours.
    pub style: ConstellationStyle,
}

/// Marginalia: growth rules and SVG output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginaliaConfig {
    /// Tree growth.
    pub growth: MarginaliaSettings,
    /// Colours and reveal timing.
    pub svg: SvgStyle,
}

/// Everything configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    /// Root seed; every effect derives its own stream from it.
    pub seed: GroveSeed,
    /// Brain cloud.
    pub cloud: CloudConfig,
    /// Orbiting satellites.
    pub satellites: SatelliteSettings,
    /// Constellation.
    pub constellation: ConstellationConfig,
    /// Corner vines.
    pub marginalia: MarginaliaConfig,
    /// Fade-in on scroll.
    pub reveal: RevealSettings,
    /// Accordions.
    pub accordion: AccordionSettings,
    /// Glitch text.
    pub glitch: GlitchSettings,
    /// Quiet period before a resize is applied (ms).
    pub resize_debounce_ms: f64,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            seed: GroveSeed::default(),
            cloud: CloudConfig::default(),
            satellites: SatelliteSettings::default(),
            constellation: ConstellationConfig::default(),
            marginalia: MarginaliaConfig::default(),
            reveal: RevealSettings::default(),
            accordion: AccordionSettings::default(),
            glitch: GlitchSettings::default(),
            resize_debounce_ms: DEFAULT_RESIZE_DELAY_MS,
        }
    }
}

impl GroveConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` for malformed TOML, `InvalidConfig` or `Procedural`
    /// for values out of range.
    pub fn from_toml_str(text: &str) -> GroveResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise as
    /// [`GroveConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> GroveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GroveError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), seed = config.seed.value(), "Configuration loaded");
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// `ConfigSerialize` when a value has no TOML form (a seed above
    /// `i64::MAX`, for instance).
    pub fn to_toml_string(&self) -> GroveResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every value the effects rely on.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first bad value, or `Procedural` from the
    /// marginalia settings' own validation.
    pub fn validate(&self) -> GroveResult<()> {
        let brain = &self.cloud.brain;
        ensure(brain.count > 0, "cloud.brain.count must be positive")?;

        let render = &self.cloud.render;
        ensure(render.perspective > 0.0, "cloud.render.perspective must be positive")?;
        ensure(render.scale > 0.0, "cloud.render.scale must be positive")?;
        ensure(render.link_distance >= 0.0, "cloud.render.link_distance must not be negative")?;
        ensure(render.sprite_size > 0, "cloud.render.sprite_size must be positive")?;
        ensure(
            (0.0..=1.0).contains(&render.bright_alpha_max),
            "cloud.render.bright_alpha_max must be within [0, 1]",
        )?;

        let sats = &self.satellites;
        ensure(sats.radius_min <= sats.radius_max, "satellites.radius_min exceeds radius_max")?;
        ensure(sats.scale_min <= sats.scale_max, "satellites.scale_min exceeds scale_max")?;
        ensure(sats.speed_min <= sats.speed_max, "satellites.speed_min exceeds speed_max")?;

        let stars = &self.constellation.stars;
        ensure(
            stars.radius_min >= 0.0 && stars.radius_min <= stars.radius_max,
            "constellation.stars radius range is empty or negative",
        )?;
        ensure(
            self.constellation.style.link_distance >= 0.0,
            "constellation.style.link_distance must not be negative",
        )?;

        self.marginalia.growth.validate()?;

        ensure(
            self.reveal.threshold > 0.0 && self.reveal.threshold <= 1.0,
            "reveal.threshold must be within (0, 1]",
        )?;
        ensure(self.accordion.duration_ms >= 0.0, "accordion.duration_ms must not be negative")?;

        let glitch = &self.glitch;
        ensure(glitch.interval_ms > 0.0, "glitch.interval_ms must be positive")?;
        ensure(
            glitch.burst_ms > 0.0 && glitch.burst_ms <= glitch.interval_ms,
            "glitch.burst_ms must be within (0, interval_ms]",
        )?;
        ensure(
            (0.0..=1.0).contains(&glitch.scramble_chance),
            "glitch.scramble_chance must be within [0, 1]",
        )?;

        ensure(self.resize_debounce_ms >= 0.0, "resize_debounce_ms must not be negative")?;
        Ok(())
    }
}

fn ensure(condition: bool, message: &str) -> GroveResult<()> {
    if condition {
        Ok(())
    } else {
        Err(GroveError::InvalidConfig(message.to_owned()))
    }
}
