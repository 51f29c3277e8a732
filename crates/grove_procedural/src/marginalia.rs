//! # Marginalia
//!
//! Vines grown from the page corners: a bounded-depth tree of cubic Bézier
//! segments, with the occasional sacred-geometry motif at a joint and fine
//! curling filaments at the tips.
//!
//! ## Determinism Guarantee
//!
//! Given the same `GroveSeed`, page size and settings, `Marginalia::grow`
//! returns **exactly** the same tree. Every corner draws from its own
//! derived stream, so enabling or disabling one corner leaves the others
//! untouched.

use std::f32::consts::{FRAC_PI_2, PI};

use grove_shared::{GroveSeed, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};

/// Deepest tree the generator accepts.
pub const MAX_DEPTH_LIMIT: u8 = 8;

/// Page corner a vine is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Top-left.
    TopLeft,
    /// Top-right.
    TopRight,
    /// Bottom-right.
    BottomRight,
    /// Bottom-left.
    BottomLeft,
}

impl Corner {
    /// All corners, clockwise from top-left.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Stream id used to derive this corner's seed.
    const fn stream(self) -> u64 {
        match self {
            Self::TopLeft => 0x71,
            Self::TopRight => 0x72,
            Self::BottomRight => 0x73,
            Self::BottomLeft => 0x74,
        }
    }

    /// Anchor point, `inset` pixels in from both edges.
    #[must_use]
    pub fn anchor(self, width: f32, height: f32, inset: f32) -> Vec2 {
        match self {
            Self::TopLeft => Vec2::new(inset, inset),
            Self::TopRight => Vec2::new(width - inset, inset),
            Self::BottomRight => Vec2::new(width - inset, height - inset),
            Self::BottomLeft => Vec2::new(inset, height - inset),
        }
    }

    /// Headings of the two trunks: one along each adjoining edge.
    #[must_use]
    pub fn trunk_headings(self) -> [f32; 2] {
        match self {
            Self::TopLeft => [0.0, FRAC_PI_2],
            Self::TopRight => [PI, FRAC_PI_2],
            Self::BottomRight => [PI, -FRAC_PI_2],
            Self::BottomLeft => [0.0, -FRAC_PI_2],
        }
    }

    /// Which way a trunk must bend to curl into the page.
    fn inward_bend(self, trunk: usize) -> f32 {
        match (self, trunk) {
            (Self::TopLeft | Self::BottomRight, 0) | (Self::TopRight | Self::BottomLeft, 1) => 1.0,
            _ => -1.0,
        }
    }
}

/// Marginalia generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginaliaSettings {
    /// Corners that grow vines.
    pub corners: Vec<Corner>,
    /// Distance of the anchors from the page edges.
    pub inset: f32,
    /// Trunk length as a fraction of the shorter page side.
    pub trunk_fraction: f32,
    /// Maximum branching depth (root is depth 0).
    pub max_depth: u8,
    /// Smallest child/parent length ratio.
    pub decay_min: f32,
    /// Largest child/parent length ratio.
    pub decay_max: f32,
    /// Maximum side branches per joint.
    pub max_side_branches: u8,
    /// Probability of each possible side branch.
    pub branch_chance: f32,
    /// Angular spread of side branches (radians).
    pub spread: f32,
    /// Maximum bend of a segment (radians).
    pub curl: f32,
    /// Probability of a motif at a non-root joint.
    pub motif_chance: f32,
    /// Probability that a tip sprouts filaments.
    pub filament_chance: f32,
    /// Filament length in pixels.
    pub filament_length: f32,
    /// Stroke width of the trunks.
    pub trunk_width: f32,
}

impl Default for MarginaliaSettings {
    fn default() -> Self {
        Self {
            corners: Corner::ALL.to_vec(),
            inset: 14.0,
            trunk_fraction: 0.22,
            max_depth: 5,
            decay_min: 0.58,
            decay_max: 0.78,
            max_side_branches: 2,
            branch_chance: 0.55,
            spread: 0.75,
            curl: 0.45,
            motif_chance: 0.16,
            filament_chance: 0.65,
            filament_length: 16.0,
            trunk_width: 1.6,
        }
    }
}

impl MarginaliaSettings {
    /// Checks that the tree stays bounded and the ratios make sense.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> ProceduralResult<()> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(invalid(
                "max_depth",
                format!("must be in 1..={MAX_DEPTH_LIMIT}, got {}", self.max_depth),
            ));
        }
        if self.max_side_branches > 4 {
            return Err(invalid(
                "max_side_branches",
                format!("at most 4, got {}", self.max_side_branches),
            ));
        }
        if !(self.decay_min > 0.0 && self.decay_min <= self.decay_max && self.decay_max < 1.0) {
            return Err(invalid(
                "decay",
                format!(
                    "need 0 < decay_min <= decay_max < 1, got {}..{}",
                    self.decay_min, self.decay_max
                ),
            ));
        }
        for (name, angle) in [("curl", self.curl), ("spread", self.spread)] {
            if !(0.0..=PI).contains(&angle) {
                return Err(invalid(name, format!("must be in 0..=pi radians, got {angle}")));
            }
        }
        for (name, p) in [
            ("branch_chance", self.branch_chance),
            ("motif_chance", self.motif_chance),
            ("filament_chance", self.filament_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(name, format!("probability out of range: {p}")));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ProceduralError {
    ProceduralError::InvalidParameter { name, reason }
}

/// A cubic Bézier stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub from: Vec2,
    /// First control point.
    pub c1: Vec2,
    /// Second control point.
    pub c2: Vec2,
    /// End point.
    pub to: Vec2,
    /// Stroke width.
    pub width: f32,
}

impl Segment {
    /// Point on the curve at parameter `t`.
    #[must_use]
    pub fn point(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.from * (u * u * u)
            + self.c1 * (3.0 * u * u * t)
            + self.c2 * (3.0 * u * t * t)
            + self.to * (t * t * t)
    }

    /// Arc length, approximated by a 16-piece polyline.
    #[must_use]
    pub fn length(&self) -> f32 {
        let mut total = 0.0;
        let mut prev = self.from;
        for i in 1..=16 {
            let p = self.point(i as f32 / 16.0);
            total += prev.distance(p);
            prev = p;
        }
        total
    }
}

/// Sacred-geometry figures placed at joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifKind {
    /// Seven overlapping circles.
    SeedOfLife,
    /// Two circles through each other's centres.
    VesicaPiscis,
    /// Two interlaced triangles in a circle.
    Hexagram,
    /// Ring of petal arcs.
    Rosette,
}

impl MotifKind {
    const ALL: [Self; 4] = [
        Self::SeedOfLife,
        Self::VesicaPiscis,
        Self::Hexagram,
        Self::Rosette,
    ];
}

/// A motif instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motif {
    /// Figure.
    pub kind: MotifKind,
    /// Centre.
    pub center: Vec2,
    /// Outer radius.
    pub radius: f32,
    /// Rotation (radians).
    pub rotation: f32,
}

/// A fine curling tendril at a tip, as a polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Filament {
    /// Points from the tip outwards.
    pub points: Vec<Vec2>,
}

/// One node of the vine tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Depth from the trunk (trunk = 0).
    pub depth: u8,
    /// The stroke.
    pub segment: Segment,
    /// Sub-branches growing from the end of this one.
    pub children: Vec<Branch>,
    /// Motif at the end joint.
    pub motif: Option<Motif>,
    /// Tendrils at the tip (only on leaves).
    pub filaments: Vec<Filament>,
}

impl Branch {
    /// Number of branches in this subtree, this one included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Branch::count).sum::<usize>()
    }

    /// Deepest depth in this subtree.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.children
            .iter()
            .map(Branch::max_depth)
            .max()
            .unwrap_or(self.depth)
    }

    /// Pre-order walk.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Branch)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Everything grown from one corner.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerGrowth {
    /// The corner.
    pub corner: Corner,
    /// One trunk per adjoining edge.
    pub trunks: Vec<Branch>,
}

/// The complete border decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginalia {
    /// Page width the tree was grown for.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Per-corner growth, in settings order.
    pub corners: Vec<CornerGrowth>,
}

impl Marginalia {
    /// Grows the decoration for a page of the given size.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the settings fail validation or the page has
    /// no area.
    pub fn grow(
        seed: GroveSeed,
        width: f32,
        height: f32,
        settings: &MarginaliaSettings,
    ) -> ProceduralResult<Self> {
        settings.validate()?;
        if !(width > 0.0 && height > 0.0) {
            return Err(invalid(
                "page",
                format!("needs a positive size, got {width}x{height}"),
            ));
        }

        let trunk_length = width.min(height) * settings.trunk_fraction;
        let corners: Vec<CornerGrowth> = settings
            .corners
            .iter()
            .map(|&corner| {
                let mut rng = seed.derive(corner.stream()).rng();
                let anchor = corner.anchor(width, height, settings.inset);
                let trunks = corner
                    .trunk_headings()
                    .iter()
                    .enumerate()
                    .map(|(i, &heading)| {
                        let mut grower = Grower {
                            settings,
                            rng: &mut rng,
                            bend_bias: corner.inward_bend(i),
                        };
                        grower.branch(anchor, heading, trunk_length, 0)
                    })
                    .collect();
                CornerGrowth { corner, trunks }
            })
            .collect();

        let marginalia = Self {
            width,
            height,
            corners,
        };
        tracing::debug!(
            seed = seed.value(),
            branches = marginalia.branch_count(),
            "marginalia grown"
        );
        Ok(marginalia)
    }

    /// Total number of branches across all corners.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.corners
            .iter()
            .flat_map(|c| c.trunks.iter())
            .map(Branch::count)
            .sum()
    }

    /// Deepest branch across all corners.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.corners
            .iter()
            .flat_map(|c| c.trunks.iter())
            .map(Branch::max_depth)
            .max()
            .unwrap_or(0)
    }
}

/// Recursive growth state for one trunk.
struct Grower<'s, 'r, R: Rng + ?Sized> {
    settings: &'s MarginaliaSettings,
    rng: &'r mut R,
    /// +1 or -1: the direction trunks curl towards.
    bend_bias: f32,
}

impl<R: Rng + ?Sized> Grower<'_, '_, R> {
    fn branch(&mut self, start: Vec2, heading: f32, length: f32, depth: u8) -> Branch {
        let s = self.settings;

        // Trunks lean inwards; deeper branches bend freely.
        let bend = if depth == 0 {
            self.bend_bias * self.rng.gen_range(0.1..=s.curl.max(0.1))
        } else {
            self.rng.gen_range(-s.curl..=s.curl)
        };
        let end_heading = heading + bend;
        let chord = Vec2::from_angle(heading + bend * 0.5);
        let to = start + chord * length;

        let wobble = self.rng.gen_range(-0.25..=0.25) * length;
        let normal = Vec2::from_angle(heading + FRAC_PI_2);
        let c1 = start + Vec2::from_angle(heading) * (length * 0.35) + normal * wobble;
        let c2 = to - Vec2::from_angle(end_heading) * (length * 0.35);

        let width = s.trunk_width * 0.72_f32.powi(i32::from(depth));
        let segment = Segment {
            from: start,
            c1,
            c2,
            to,
            width,
        };

        let mut children = Vec::new();
        if depth + 1 < s.max_depth {
            // Main continuation.
            if depth == 0 || self.rng.gen::<f32>() < 0.85 {
                let decay = self.rng.gen_range(s.decay_min..=s.decay_max);
                children.push(self.branch(to, end_heading, length * decay, depth + 1));
            }
            for _ in 0..s.max_side_branches {
                if self.rng.gen::<f32>() < s.branch_chance {
                    let side = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
                    let angle = end_heading + side * self.rng.gen_range(s.spread * 0.5..=s.spread);
                    let decay = self.rng.gen_range(s.decay_min..=s.decay_max) * 0.85;
                    children.push(self.branch(to, angle, length * decay, depth + 1));
                }
            }
        }

        let motif = if depth > 0 && self.rng.gen::<f32>() < s.motif_chance {
            let kind = MotifKind::ALL[self.rng.gen_range(0..MotifKind::ALL.len())];
            Some(Motif {
                kind,
                center: to,
                radius: (length * 0.22).clamp(4.0, 22.0),
                rotation: self.rng.gen::<f32>() * PI,
            })
        } else {
            None
        };

        let mut filaments = Vec::new();
        if children.is_empty() && self.rng.gen::<f32>() < s.filament_chance {
            let strands = self.rng.gen_range(1..=2);
            for _ in 0..strands {
                filaments.push(self.filament(to, end_heading));
            }
        }

        Branch {
            depth,
            segment,
            children,
            motif,
            filaments,
        }
    }

    /// A tightening spiral leaving the tip along `heading`.
    fn filament(&mut self, tip: Vec2, heading: f32) -> Filament {
        const STEPS: usize = 12;
        let turn = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
        let length = self.settings.filament_length * self.rng.gen_range(0.6..=1.0);
        let step = length / STEPS as f32;
        let mut angle = heading + self.rng.gen_range(-0.4..=0.4);
        let mut p = tip;
        let mut points = Vec::with_capacity(STEPS + 1);
        points.push(p);
        for i in 0..STEPS {
            // Curvature grows towards the end.
            angle += turn * 0.12 * (1.0 + i as f32 * 0.25);
            p = p + Vec2::from_angle(angle) * step;
            points.push(p);
        }
        Filament { points }
    }
}
