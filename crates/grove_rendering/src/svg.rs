//! # Marginalia SVG
//!
//! Turns a grown [`Marginalia`] into one self-contained `<svg>` element.
//!
//! The tree itself never changes after growth; the animation is CSS only.
//! Each stroke carries its own `--delay` and `--duration` custom properties
//! and a dash pattern as long as the stroke, so the embedded keyframes can
//! "draw" it by sliding the dash offset to zero. Motifs fade in once the
//! branch under them has finished.

use std::f32::consts::TAU;
use std::fmt::{self, Write};

use grove_procedural::{Branch, Filament, Marginalia, Motif, MotifKind, Segment};
use grove_shared::{palette, Rgb, Vec2};
use serde::{Deserialize, Serialize};

/// When each stroke starts drawing and how long it takes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    /// Delay before the trunks start (ms).
    pub base_delay_ms: f32,
    /// Extra delay per tree level.
    pub depth_stagger_ms: f32,
    /// Extra delay per corner, in growth order.
    pub corner_stagger_ms: f32,
    /// Draw speed: milliseconds per pixel of stroke.
    pub ms_per_px: f32,
    /// Shortest stroke animation.
    pub min_duration_ms: f32,
    /// Longest stroke animation.
    pub max_duration_ms: f32,
    /// Motif fade length.
    pub motif_fade_ms: f32,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            base_delay_ms: 300.0,
            depth_stagger_ms: 420.0,
            corner_stagger_ms: 150.0,
            ms_per_px: 9.0,
            min_duration_ms: 400.0,
            max_duration_ms: 2_400.0,
            motif_fade_ms: 900.0,
        }
    }
}

impl RevealTiming {
    /// Start of a stroke at `depth` in the `corner`-th corner.
    #[must_use]
    pub fn delay(&self, depth: u8, corner: usize) -> f32 {
        self.base_delay_ms
            + f32::from(depth) * self.depth_stagger_ms
            + corner as f32 * self.corner_stagger_ms
    }

    /// Draw time for a stroke of `length` pixels.
    #[must_use]
    pub fn duration(&self, length: f32) -> f32 {
        (length * self.ms_per_px).clamp(self.min_duration_ms, self.max_duration_ms)
    }

    /// Time at which the last stroke or motif finishes.
    #[must_use]
    pub fn total_ms(&self, marginalia: &Marginalia) -> f32 {
        let mut end = 0.0_f32;
        for (ci, growth) in marginalia.corners.iter().enumerate() {
            for trunk in &growth.trunks {
                trunk.walk(&mut |b: &Branch| {
                    let done = self.delay(b.depth, ci) + self.duration(b.segment.length());
                    end = end.max(done);
                    if b.motif.is_some() {
                        end = end.max(done + self.motif_fade_ms);
                    }
                });
            }
        }
        end
    }
}

/// Colours and timing for the emitted SVG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgStyle {
    /// Branch stroke colour.
    pub vine: Rgb,
    /// Motif stroke colour.
    pub motif: Rgb,
    /// Filament stroke colour.
    pub filament: Rgb,
    /// Motif stroke width.
    pub motif_width: f32,
    /// Filament stroke width.
    pub filament_width: f32,
    /// Reveal schedule.
    pub timing: RevealTiming,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            vine: palette::VINE,
            motif: palette::OCHRE,
            filament: palette::OLIVE,
            motif_width: 0.7,
            filament_width: 0.5,
            timing: RevealTiming::default(),
        }
    }
}

const KEYFRAMES: &str = "\
.marginalia__stroke{fill:none;stroke-linecap:round;stroke-dashoffset:var(--length);\
animation:grove-draw var(--duration) ease-out var(--delay) forwards}\
.marginalia__motif{fill:none;opacity:0;\
animation:grove-bloom var(--duration) ease-in-out var(--delay) forwards}\
@keyframes grove-draw{to{stroke-dashoffset:0}}\
@keyframes grove-bloom{to{opacity:1}}\
@media (prefers-reduced-motion:reduce){.marginalia__stroke,.marginalia__motif{animation:none;\
stroke-dashoffset:0;opacity:1}}";

/// Renders `marginalia` to an SVG document.
#[must_use]
pub fn render_svg(marginalia: &Marginalia, style: &SvgStyle) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    write_svg(marginalia, style, &mut out).map_or_else(|_| String::new(), |()| out)
}

/// Writes `marginalia` as SVG into any formatter.
///
/// # Errors
///
/// Propagates errors from `out`.
pub fn write_svg<W: Write>(marginalia: &Marginalia, style: &SvgStyle, out: &mut W) -> fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="marginalia__vines" viewBox="0 0 {:.0} {:.0}" width="{:.0}" height="{:.0}" aria-hidden="true" focusable="false">"#,
        marginalia.width, marginalia.height, marginalia.width, marginalia.height
    )?;
    writeln!(out, "<style>{KEYFRAMES}</style>")?;

    for (ci, growth) in marginalia.corners.iter().enumerate() {
        writeln!(out, r#"<g class="marginalia__corner" data-corner="{:?}">"#, growth.corner)?;
        for trunk in &growth.trunks {
            write_branch(trunk, ci, style, out)?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</svg>")
}

fn write_branch<W: Write>(
    branch: &Branch,
    corner: usize,
    style: &SvgStyle,
    out: &mut W,
) -> fmt::Result {
    let timing = &style.timing;
    let seg = &branch.segment;
    let length = seg.length();
    let delay = timing.delay(branch.depth, corner);
    let duration = timing.duration(length);

    let stroke = Stroke {
        color: style.vine,
        width: seg.width,
        length,
        delay,
        duration,
    };
    stroke.write(out, |d| write_segment(d, seg))?;

    for filament in &branch.filaments {
        let length = polyline_length(filament);
        let stroke = Stroke {
            color: style.filament,
            width: style.filament_width,
            length,
            delay: delay + duration,
            duration: timing.duration(length),
        };
        stroke.write(out, |d| write_polyline(d, &filament.points))?;
    }

    if let Some(motif) = &branch.motif {
        write!(out, r#"<path class="marginalia__motif" d=""#)?;
        write_motif(out, motif)?;
        writeln!(
            out,
            r#"" stroke="{}" stroke-width="{:.2}" style="--delay:{:.0}ms;--duration:{:.0}ms"/>"#,
            style.motif.hex(),
            style.motif_width,
            delay + duration,
            timing.motif_fade_ms
        )?;
    }

    for child in &branch.children {
        write_branch(child, corner, style, out)?;
    }
    Ok(())
}

/// One revealed `<path>`.
struct Stroke {
    color: Rgb,
    width: f32,
    length: f32,
    delay: f32,
    duration: f32,
}

impl Stroke {
    fn write<W, F>(&self, out: &mut W, path: F) -> fmt::Result
    where
        W: Write,
        F: FnOnce(&mut W) -> fmt::Result,
    {
        let Self {
            color,
            width,
            length,
            delay,
            duration,
        } = self;
        write!(out, r#"<path class="marginalia__stroke" d=""#)?;
        path(out)?;
        writeln!(
            out,
            r#"" stroke="{}" stroke-width="{width:.2}" stroke-dasharray="{length:.1}" style="--length:{length:.1};--delay:{delay:.0}ms;--duration:{duration:.0}ms"/>"#,
            color.hex()
        )
    }
}

fn write_segment<W: Write>(d: &mut W, s: &Segment) -> fmt::Result {
    write!(
        d,
        "M{:.1} {:.1}C{:.1} {:.1} {:.1} {:.1} {:.1} {:.1}",
        s.from.x, s.from.y, s.c1.x, s.c1.y, s.c2.x, s.c2.y, s.to.x, s.to.y
    )
}

fn write_polyline<W: Write>(d: &mut W, points: &[Vec2]) -> fmt::Result {
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        write!(d, "{cmd}{:.1} {:.1}", p.x, p.y)?;
    }
    Ok(())
}

fn polyline_length(f: &Filament) -> f32 {
    f.points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// A full circle as two arcs.
fn write_circle<W: Write>(d: &mut W, c: Vec2, r: f32) -> fmt::Result {
    write!(
        d,
        "M{:.1} {:.1}a{r:.1} {r:.1} 0 1 0 {:.1} 0a{r:.1} {r:.1} 0 1 0 {:.1} 0",
        c.x - r,
        c.y,
        2.0 * r,
        -2.0 * r
    )
}

fn write_polygon<W: Write>(d: &mut W, points: &[Vec2]) -> fmt::Result {
    write_polyline(d, points)?;
    d.write_char('Z')
}

/// Outline of a motif as one path.
fn write_motif<W: Write>(d: &mut W, m: &Motif) -> fmt::Result {
    let at = |angle: f32, r: f32| m.center + Vec2::from_angle(angle + m.rotation) * r;
    match m.kind {
        MotifKind::SeedOfLife => {
            let r = m.radius * 0.5;
            write_circle(d, m.center, r)?;
            for k in 0..6 {
                write_circle(d, at(k as f32 * TAU / 6.0, r), r)?;
            }
        }
        MotifKind::VesicaPiscis => {
            let r = m.radius * 0.6;
            write_circle(d, at(0.0, r * 0.5), r)?;
            write_circle(d, at(TAU / 2.0, r * 0.5), r)?;
        }
        MotifKind::Hexagram => {
            write_circle(d, m.center, m.radius)?;
            let up: Vec<Vec2> = (0..3).map(|k| at(k as f32 * TAU / 3.0, m.radius)).collect();
            let down: Vec<Vec2> = (0..3)
                .map(|k| at(k as f32 * TAU / 3.0 + TAU / 6.0, m.radius))
                .collect();
            write_polygon(d, &up)?;
            write_polygon(d, &down)?;
        }
        MotifKind::Rosette => {
            for k in 0..6 {
                let angle = k as f32 * TAU / 6.0;
                let tip = at(angle, m.radius);
                let left = at(angle + 0.45, m.radius * 0.55);
                let right = at(angle - 0.45, m.radius * 0.55);
                write!(
                    d,
                    "M{:.1} {:.1}Q{:.1} {:.1} {:.1} {:.1}Q{:.1} {:.1} {:.1} {:.1}",
                    m.center.x,
                    m.center.y,
                    left.x,
                    left.y,
                    tip.x,
                    tip.y,
                    right.x,
                    right.y,
                    m.center.x,
                    m.center.y
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_procedural::MarginaliaSettings;
    use grove_shared::GroveSeed;

    fn grown() -> Marginalia {
        Marginalia::grow(GroveSeed::new(11), 1200.0, 800.0, &MarginaliaSettings::default()).unwrap()
    }

    #[test]
    fn test_one_path_per_branch() {
        let m = grown();
        let svg = render_svg(&m, &SvgStyle::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));

        let filaments: usize = m
            .corners
            .iter()
            .flat_map(|c| c.trunks.iter())
            .map(|t| {
                let mut n = 0;
                t.walk(&mut |b: &Branch| n += b.filaments.len());
                n
            })
            .sum();
        let strokes = svg.matches(r#"class="marginalia__stroke""#).count();
        assert_eq!(strokes, m.branch_count() + filaments);
    }

    #[test]
    fn test_same_seed_same_document() {
        let style = SvgStyle::default();
        assert_eq!(render_svg(&grown(), &style), render_svg(&grown(), &style));
    }

    #[test]
    fn test_timing_staggers_by_depth() {
        let timing = RevealTiming::default();
        assert!(timing.delay(1, 0) > timing.delay(0, 0));
        assert!(timing.delay(0, 2) > timing.delay(0, 1));
        assert_eq!(timing.duration(0.0), timing.min_duration_ms);
        assert_eq!(timing.duration(1.0e6), timing.max_duration_ms);
        assert!(timing.total_ms(&grown()) > timing.base_delay_ms);
    }

    #[test]
    fn test_motif_paths_are_closed_shapes() {
        for kind in [
            MotifKind::SeedOfLife,
            MotifKind::VesicaPiscis,
            MotifKind::Hexagram,
            MotifKind::Rosette,
        ] {
            let mut d = String::new();
            let motif = Motif {
                kind,
                center: Vec2::new(50.0, 50.0),
                radius: 10.0,
                rotation: 0.3,
            };
            write_motif(&mut d, &motif).unwrap();
            assert!(d.starts_with('M'), "{kind:?}: {d}");
            assert!(!d.contains("NaN"));
        }
    }
}
