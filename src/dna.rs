use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::palette::{ALPHA_LEVELS, PALETTE};

/// canvas dimensions shared by the target image, every phenotype, and all
/// geometry sampling
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// how gene colors are sampled at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSampling {
    /// per-channel uniform floats in [0,1]
    Continuous,
    /// snapped to the fixed palette and the discrete alpha set
    Palette,
}

/// a single drawing instruction handed to the renderer. geometry is already
/// resolved to canvas coordinates; the renderer never reads gene state.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Polygon {
        points: Vec<(f32, f32)>,
        rgba: [f32; 4],
    },
    Ellipse {
        center: (f32, f32),
        radii: (f32, f32),
        rgba: [f32; 4],
    },
}

/// a single gene: one filled, alpha-blended primitive.
///
/// the variant set is closed and exhaustively matched everywhere; arity is
/// fixed at creation and never changes under mutation. `Clone` is a full deep
/// copy (vertices are inline arrays), so a cloned gene can never alias its
/// source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Triangle {
        verts: [(i32, i32); 3],
        rgba: [f32; 4],
    },
    /// axis-aligned quadrilateral built from two opposite corners
    Square {
        verts: [(i32, i32); 4],
        rgba: [f32; 4],
    },
    Ellipse {
        center: (i32, i32),
        radii: (i32, i32),
        rgba: [f32; 4],
    },
}

/// which shape variant new genomes are built from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Triangle,
    Square,
    Ellipse,
}

// mutation operator weights, in percent. one weighted draw picks exactly one
// operator per mutate() call: color delta / palette recolor / alpha replace /
// vertex jitter / whole-shape relocation = 30/10/10/30/20.
const W_COLOR_DELTA: u32 = 30;
const W_PALETTE_RECOLOR: u32 = 10;
const W_ALPHA_REPLACE: u32 = 10;
const W_VERTEX_JITTER: u32 = 30;
// remaining 20% relocates the whole shape

/// per-channel bound for the color-delta operator (±20 on a 0-255 scale)
const COLOR_DELTA: f32 = 20.0 / 255.0;
/// base vertex jitter in pixels, scaled by the engine's aggressiveness
const JITTER_BASE: f32 = 10.0;

impl Shape {
    /// sample a random gene inside the canvas.
    ///
    /// triangle vertices snap to a coarse `dimension / 10` grid to cut down on
    /// degenerate slivers; the square is two random opposite corners expanded
    /// to an axis-aligned quad; the ellipse gets radii up to a quarter of each
    /// dimension.
    pub fn random<R: Rng>(
        kind: ShapeKind,
        canvas: CanvasSize,
        sampling: ColorSampling,
        rng: &mut R,
    ) -> Self {
        let rgba = random_color(sampling, rng);
        let w = canvas.width as i32;
        let h = canvas.height as i32;

        match kind {
            ShapeKind::Triangle => {
                let step_x = (w / 10).max(1);
                let step_y = (h / 10).max(1);
                let mut vert = |rng: &mut R| {
                    let x = rng.random_range(0..w) / step_x * step_x;
                    let y = rng.random_range(0..h) / step_y * step_y;
                    (x, y)
                };
                let verts = [vert(rng), vert(rng), vert(rng)];
                Shape::Triangle { verts, rgba }
            }
            ShapeKind::Square => {
                let c0 = (rng.random_range(0..w), rng.random_range(0..h));
                let c1 = (rng.random_range(0..w), rng.random_range(0..h));
                Shape::Square {
                    verts: expand_corners(c0, c1),
                    rgba,
                }
            }
            ShapeKind::Ellipse => {
                let center = (rng.random_range(0..w), rng.random_range(0..h));
                let radii = (
                    rng.random_range(1..=(w / 4).max(1)),
                    rng.random_range(1..=(h / 4).max(1)),
                );
                Shape::Ellipse { center, radii, rgba }
            }
        }
    }

    /// mutate this gene in place. a single weighted draw selects exactly one
    /// operator; geometry stays inside the canvas and arity is preserved.
    pub fn mutate<R: Rng>(&mut self, canvas: CanvasSize, aggressiveness: f32, rng: &mut R) {
        let roll = rng.random_range(0..100u32);
        if roll < W_COLOR_DELTA {
            self.nudge_color(rng);
        } else if roll < W_COLOR_DELTA + W_PALETTE_RECOLOR {
            let entry = PALETTE[rng.random_range(0..PALETTE.len())];
            let rgba = self.rgba_mut();
            rgba[0] = entry.rgb[0];
            rgba[1] = entry.rgb[1];
            rgba[2] = entry.rgb[2];
        } else if roll < W_COLOR_DELTA + W_PALETTE_RECOLOR + W_ALPHA_REPLACE {
            self.rgba_mut()[3] = ALPHA_LEVELS[rng.random_range(0..ALPHA_LEVELS.len())];
        } else if roll < W_COLOR_DELTA + W_PALETTE_RECOLOR + W_ALPHA_REPLACE + W_VERTEX_JITTER {
            self.jitter_vertices(canvas, aggressiveness, rng);
        } else {
            self.relocate(canvas, rng);
        }
    }

    /// bounded per-channel color delta, all four channels
    fn nudge_color<R: Rng>(&mut self, rng: &mut R) {
        let rgba = self.rgba_mut();
        for c in rgba.iter_mut() {
            *c = (*c + rng.random_range(-COLOR_DELTA..=COLOR_DELTA)).clamp(0.0, 1.0);
        }
    }

    /// jitter every vertex by a bounded delta scaled by aggressiveness
    fn jitter_vertices<R: Rng>(&mut self, canvas: CanvasSize, aggressiveness: f32, rng: &mut R) {
        let d = (JITTER_BASE * aggressiveness).max(1.0) as i32;
        match self {
            Shape::Triangle { verts, .. } => {
                for v in verts.iter_mut() {
                    let (dx, dy) = (rng.random_range(-d..=d), rng.random_range(-d..=d));
                    *v = clamp_vertex((v.0 + dx, v.1 + dy), canvas);
                }
            }
            Shape::Square { verts, .. } => {
                // jitter the two defining corners and rebuild so the quad
                // stays axis-aligned
                let (dx0, dy0) = (rng.random_range(-d..=d), rng.random_range(-d..=d));
                let (dx1, dy1) = (rng.random_range(-d..=d), rng.random_range(-d..=d));
                let c0 = clamp_vertex((verts[0].0 + dx0, verts[0].1 + dy0), canvas);
                let c1 = clamp_vertex((verts[2].0 + dx1, verts[2].1 + dy1), canvas);
                *verts = expand_corners(c0, c1);
            }
            Shape::Ellipse { center, radii, .. } => {
                let (dx, dy) = (rng.random_range(-d..=d), rng.random_range(-d..=d));
                *center = clamp_vertex((center.0 + dx, center.1 + dy), canvas);
                radii.0 = (radii.0 + rng.random_range(-d..=d)).max(1);
                radii.1 = (radii.1 + rng.random_range(-d..=d)).max(1);
            }
        }
    }

    /// translate the whole shape by a random offset scaled to canvas size
    fn relocate<R: Rng>(&mut self, canvas: CanvasSize, rng: &mut R) {
        let mx = (canvas.width as i32 / 4).max(1);
        let my = (canvas.height as i32 / 4).max(1);
        let dx = rng.random_range(-mx..=mx);
        let dy = rng.random_range(-my..=my);
        match self {
            Shape::Triangle { verts, .. } => {
                for v in verts.iter_mut() {
                    *v = clamp_vertex((v.0 + dx, v.1 + dy), canvas);
                }
            }
            Shape::Square { verts, .. } => {
                let c0 = clamp_vertex((verts[0].0 + dx, verts[0].1 + dy), canvas);
                let c1 = clamp_vertex((verts[2].0 + dx, verts[2].1 + dy), canvas);
                *verts = expand_corners(c0, c1);
            }
            Shape::Ellipse { center, .. } => {
                *center = clamp_vertex((center.0 + dx, center.1 + dy), canvas);
            }
        }
    }

    /// resolve this gene into the draw command the renderer consumes.
    /// depends on nothing but this gene's own state.
    pub fn draw_cmd(&self) -> DrawCmd {
        match self {
            Shape::Triangle { verts, rgba } => DrawCmd::Polygon {
                points: verts.iter().map(|&(x, y)| (x as f32, y as f32)).collect(),
                rgba: *rgba,
            },
            Shape::Square { verts, rgba } => DrawCmd::Polygon {
                points: verts.iter().map(|&(x, y)| (x as f32, y as f32)).collect(),
                rgba: *rgba,
            },
            Shape::Ellipse { center, radii, rgba } => DrawCmd::Ellipse {
                center: (center.0 as f32, center.1 as f32),
                radii: (radii.0 as f32, radii.1 as f32),
                rgba: *rgba,
            },
        }
    }

    pub fn rgba(&self) -> [f32; 4] {
        match self {
            Shape::Triangle { rgba, .. }
            | Shape::Square { rgba, .. }
            | Shape::Ellipse { rgba, .. } => *rgba,
        }
    }

    pub fn rgba_mut(&mut self) -> &mut [f32; 4] {
        match self {
            Shape::Triangle { rgba, .. }
            | Shape::Square { rgba, .. }
            | Shape::Ellipse { rgba, .. } => rgba,
        }
    }
}

fn random_color<R: Rng>(sampling: ColorSampling, rng: &mut R) -> [f32; 4] {
    match sampling {
        ColorSampling::Continuous => [
            rng.random::<f32>(),
            rng.random::<f32>(),
            rng.random::<f32>(),
            rng.random::<f32>(),
        ],
        ColorSampling::Palette => {
            let entry = PALETTE[rng.random_range(0..PALETTE.len())];
            let alpha = ALPHA_LEVELS[rng.random_range(0..ALPHA_LEVELS.len())];
            [entry.rgb[0], entry.rgb[1], entry.rgb[2], alpha]
        }
    }
}

/// expand two opposite corners into an axis-aligned quadrilateral,
/// wound top-left → top-right → bottom-right → bottom-left
fn expand_corners(c0: (i32, i32), c1: (i32, i32)) -> [(i32, i32); 4] {
    let x_min = c0.0.min(c1.0);
    let x_max = c0.0.max(c1.0);
    let y_min = c0.1.min(c1.1);
    let y_max = c0.1.max(c1.1);
    [(x_min, y_min), (x_max, y_min), (x_max, y_max), (x_min, y_max)]
}

fn clamp_vertex(v: (i32, i32), canvas: CanvasSize) -> (i32, i32) {
    (
        v.0.clamp(0, canvas.width as i32 - 1),
        v.1.clamp(0, canvas.height as i32 - 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn canvas() -> CanvasSize {
        CanvasSize::new(100, 80)
    }

    #[test]
    fn test_random_triangle_inside_canvas_and_snapped() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let shape =
                Shape::random(ShapeKind::Triangle, canvas(), ColorSampling::Continuous, &mut rng);
            let Shape::Triangle { verts, rgba } = shape else {
                panic!("expected a triangle");
            };
            for (x, y) in verts {
                assert!((0..100).contains(&x) && (0..80).contains(&y));
                // grid: 100/10 = 10, 80/10 = 8
                assert_eq!(x % 10, 0);
                assert_eq!(y % 8, 0);
            }
            for c in rgba {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_random_square_is_axis_aligned() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..200 {
            let shape =
                Shape::random(ShapeKind::Square, canvas(), ColorSampling::Continuous, &mut rng);
            let Shape::Square { verts, .. } = shape else {
                panic!("expected a square");
            };
            assert_eq!(verts[0].1, verts[1].1);
            assert_eq!(verts[2].1, verts[3].1);
            assert_eq!(verts[0].0, verts[3].0);
            assert_eq!(verts[1].0, verts[2].0);
        }
    }

    #[test]
    fn test_palette_sampling_snaps_color_and_alpha() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let shape =
                Shape::random(ShapeKind::Triangle, canvas(), ColorSampling::Palette, &mut rng);
            let rgba = shape.rgba();
            assert!(crate::palette::PALETTE
                .iter()
                .any(|e| e.rgb == [rgba[0], rgba[1], rgba[2]]));
            assert!(ALPHA_LEVELS.contains(&rgba[3]));
        }
    }

    #[test]
    fn test_mutate_preserves_arity_and_bounds() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut shape =
            Shape::random(ShapeKind::Square, canvas(), ColorSampling::Continuous, &mut rng);
        for _ in 0..500 {
            shape.mutate(canvas(), 1.0, &mut rng);
            let Shape::Square { verts, rgba } = &shape else {
                panic!("mutation changed the variant");
            };
            for &(x, y) in verts {
                assert!((0..100).contains(&x) && (0..80).contains(&y));
            }
            for &c in rgba {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }

    #[test]
    fn test_clone_is_a_deep_copy() {
        let mut rng = Pcg32::seed_from_u64(5);
        let original =
            Shape::random(ShapeKind::Triangle, canvas(), ColorSampling::Continuous, &mut rng);
        let snapshot = original.clone();
        let mut copy = original.clone();
        copy.rgba_mut()[0] = (copy.rgba()[0] + 0.5) % 1.0;
        if let Shape::Triangle { verts, .. } = &mut copy {
            verts[0] = (99, 79);
        }
        // mutating the clone leaves the source untouched
        assert_eq!(original, snapshot);
    }
}
