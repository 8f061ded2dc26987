use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dna::CanvasSize;
use crate::error::{EvolveError, Result};

/// similarity formula applied for a whole run.
///
/// exactly one formula is active per run; mixing formulas across strategies
/// changes convergence behavior, so the choice is made once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FitnessFormula {
    /// mean absolute per-channel difference d, normalized by 255;
    /// fitness = (1 - d)^exponent. the exponent sharpens selection pressure.
    MeanAbsolute { exponent: u32 },
    /// mean CIE76 delta-E in CIELAB; fitness = clamp(1 - dE/100, 0, 1)
    PerceptualLab,
}

impl Default for FitnessFormula {
    fn default() -> Self {
        FitnessFormula::MeanAbsolute { exponent: 2 }
    }
}

/// scores phenotypes against the immutable target image.
///
/// both buffers are premultiplied RGBA8 at identical dimensions; anything
/// else is an immediate error, never an implicit resize. results land in
/// [0, 1] with 1.0 meaning an exact pixel match.
pub struct Evaluator {
    canvas: CanvasSize,
    target: Vec<u8>,
    formula: FitnessFormula,
}

impl Evaluator {
    pub fn new(target_premul: Vec<u8>, canvas: CanvasSize, formula: FitnessFormula) -> Result<Self> {
        let want = canvas.pixel_count() * 4;
        if target_premul.len() != want {
            return Err(EvolveError::DimensionMismatch {
                got_px: target_premul.len() / 4,
                want_w: canvas.width,
                want_h: canvas.height,
                want_px: canvas.pixel_count(),
            });
        }
        Ok(Self {
            canvas,
            target: target_premul,
            formula,
        })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn formula(&self) -> FitnessFormula {
        self.formula
    }

    /// score a phenotype in [0, 1]
    pub fn score(&self, phenotype: &[u8]) -> Result<f64> {
        profiling::scope!("Evaluator::score");
        if phenotype.len() != self.target.len() {
            return Err(EvolveError::DimensionMismatch {
                got_px: phenotype.len() / 4,
                want_w: self.canvas.width,
                want_h: self.canvas.height,
                want_px: self.canvas.pixel_count(),
            });
        }

        let fitness = match self.formula {
            FitnessFormula::MeanAbsolute { exponent } => {
                let sad = sad_rgba_parallel(&self.target, phenotype);
                let normalized = sad / (self.target.len() as f64 * 255.0);
                (1.0 - normalized).powi(exponent as i32)
            }
            FitnessFormula::PerceptualLab => {
                let delta = mean_lab_delta(&self.target, phenotype);
                (1.0 - delta / 100.0).clamp(0.0, 1.0)
            }
        };
        Ok(fitness)
    }
}

/// sum of absolute per-channel differences over all four channels.
/// coarse-grained rayon chunks keep the per-task overhead down.
fn sad_rgba_parallel(target: &[u8], current: &[u8]) -> f64 {
    profiling::scope!("sad_rgba_parallel");
    debug_assert_eq!(target.len(), current.len());
    const CHUNK: usize = 64 * 1024;
    let total: u64 = target
        .par_chunks(CHUNK)
        .zip(current.par_chunks(CHUNK))
        .map(|(t, c)| {
            t.iter()
                .zip(c)
                .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as u64)
                .sum::<u64>()
        })
        .sum();
    total as f64
}

/// mean CIE76 delta-E between two premultiplied buffers, unpremultiplying
/// per pixel before the Lab conversion
fn mean_lab_delta(target: &[u8], current: &[u8]) -> f64 {
    profiling::scope!("mean_lab_delta");
    debug_assert_eq!(target.len(), current.len());
    let pixels = target.len() / 4;
    if pixels == 0 {
        return 0.0;
    }
    const CHUNK: usize = 16 * 1024;
    let total: f64 = target
        .par_chunks(CHUNK * 4)
        .zip(current.par_chunks(CHUNK * 4))
        .map(|(t, c)| {
            t.chunks_exact(4)
                .zip(c.chunks_exact(4))
                .map(|(tp, cp)| {
                    let a = premul_to_lab(tp);
                    let b = premul_to_lab(cp);
                    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
                })
                .sum::<f64>()
        })
        .sum();
    total / pixels as f64
}

fn premul_to_lab(px: &[u8]) -> [f64; 3] {
    let a = px[3] as f64;
    let (r, g, b) = if a == 0.0 {
        (0.0, 0.0, 0.0)
    } else {
        (
            (px[0] as f64 / a).min(1.0),
            (px[1] as f64 / a).min(1.0),
            (px[2] as f64 / a).min(1.0),
        )
    };
    srgb_to_lab(r, g, b)
}

/// sRGB in [0,1] → CIELAB under D65
fn srgb_to_lab(r: f64, g: f64, b: f64) -> [f64; 3] {
    fn linearize(c: f64) -> f64 {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    let (r, g, b) = (linearize(r), linearize(g), linearize(b));

    // sRGB → XYZ, D65 reference white
    let x = 0.4124 * r + 0.3576 * g + 0.1805 * b;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = 0.0193 * r + 0.1192 * g + 0.9505 * b;

    const XN: f64 = 0.95047;
    const YN: f64 = 1.0;
    const ZN: f64 = 1.08883;

    fn f(t: f64) -> f64 {
        const DELTA: f64 = 6.0 / 29.0;
        if t > DELTA * DELTA * DELTA {
            t.cbrt()
        } else {
            t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
        }
    }

    let (fx, fy, fz) = (f(x / XN), f(y / YN), f(z / ZN));
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}
