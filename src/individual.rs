use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::dna::{CanvasSize, ColorSampling, Shape, ShapeKind};

// creation-order identity source. distinct from genome content on purpose:
// clones can be content-identical yet must remain distinguishable in
// selection multisets and replacement pools.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// one member of the population: an ordered genome of shape genes plus a
/// lazily computed fitness and rendered phenotype.
///
/// the genome order is paint order: later genes paint over earlier ones.
/// the phenotype is a pure function of genome + canvas size; it is cached
/// here only to avoid re-rendering, never mutated independently.
#[derive(Debug)]
pub struct Individual {
    id: u64,
    pub genome: Vec<Shape>,
    /// `None` until the evaluation barrier has scored this individual
    pub fitness: Option<f64>,
    /// premultiplied RGBA8, canvas-sized, cached alongside the fitness
    pub phenotype: Option<Vec<u8>>,
}

impl Individual {
    /// wrap a genome into a fresh, unevaluated individual
    pub fn from_genome(genome: Vec<Shape>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            genome,
            fitness: None,
            phenotype: None,
        }
    }

    /// sample a random individual with `genome_len` genes
    pub fn random<R: Rng>(
        genome_len: usize,
        kind: ShapeKind,
        canvas: CanvasSize,
        sampling: ColorSampling,
        rng: &mut R,
    ) -> Self {
        let genome = (0..genome_len)
            .map(|_| Shape::random(kind, canvas, sampling, rng))
            .collect();
        Self::from_genome(genome)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// drop the cached score and phenotype. callers must invalidate after
    /// any genome change or the stale caches would be trusted.
    pub fn invalidate(&mut self) {
        self.fitness = None;
        self.phenotype = None;
    }

    /// fitness accessor for strategies running after the evaluation barrier.
    /// the engine scores every individual before any strategy runs, so a
    /// missing value here is a sequencing bug, not a recoverable state.
    pub fn fitness_scored(&self) -> f64 {
        self.fitness
            .expect("individual not evaluated before strategy phase")
    }
}

// a clone carries the same genome and caches but gets a fresh creation id,
// so identity never aliases.
impl Clone for Individual {
    fn clone(&self) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            genome: self.genome.clone(),
            fitness: self.fitness,
            phenotype: self.phenotype.clone(),
        }
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Individual {}

impl Hash for Individual {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn canvas() -> CanvasSize {
        CanvasSize::new(32, 32)
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = Individual::from_genome(Vec::new());
        let b = Individual::from_genome(Vec::new());
        assert!(b.id() > a.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_keeps_content_but_not_identity() {
        let mut rng = Pcg32::seed_from_u64(7);
        let original = Individual::random(
            5,
            ShapeKind::Triangle,
            canvas(),
            ColorSampling::Continuous,
            &mut rng,
        );
        let copy = original.clone();
        assert_eq!(original.genome, copy.genome);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_random_genome_has_requested_length() {
        let mut rng = Pcg32::seed_from_u64(8);
        let ind = Individual::random(
            12,
            ShapeKind::Square,
            canvas(),
            ColorSampling::Palette,
            &mut rng,
        );
        assert_eq!(ind.genome.len(), 12);
        assert!(ind.fitness.is_none());
    }

    #[test]
    fn test_invalidate_clears_caches() {
        let mut ind = Individual::from_genome(Vec::new());
        ind.fitness = Some(0.5);
        ind.phenotype = Some(vec![0; 16]);
        ind.invalidate();
        assert!(ind.fitness.is_none());
        assert!(ind.phenotype.is_none());
    }
}
