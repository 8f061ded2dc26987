use rand::Rng;
use rand_pcg::Pcg32;

use crate::individual::Individual;

/// recombination: consume the selection pool pairwise and produce children.
///
/// parents are drawn without replacement through an index cursor over the
/// pool (the pool itself is never reordered or aliased); when fewer than two
/// candidates remain, the odd leftover is dropped. every transplanted gene is
/// a deep clone; children never share gene state with their parents.
pub trait Crossover: Send + Sync {
    fn recombine(&self, pool: &[Individual], rng: &mut Pcg32) -> Vec<Individual>;
}

/// draws pool members without replacement: a live-count partition over an
/// index arena, so consumed entries move behind the cursor instead of being
/// swapped out of the caller's collection.
struct PoolCursor {
    indices: Vec<usize>,
    live: usize,
}

impl PoolCursor {
    fn new(len: usize) -> Self {
        Self {
            indices: (0..len).collect(),
            live: len,
        }
    }

    fn draw(&mut self, rng: &mut Pcg32) -> Option<usize> {
        if self.live == 0 {
            return None;
        }
        let pick = rng.random_range(0..self.live);
        self.indices.swap(pick, self.live - 1);
        self.live -= 1;
        Some(self.indices[self.live])
    }

    fn remaining(&self) -> usize {
        self.live
    }
}

/// two-point crossover: cut indices 0 ≤ l1 ≤ l2 ≤ genome length, children
/// swap the middle segment
pub struct TwoPoint;

impl Crossover for TwoPoint {
    fn recombine(&self, pool: &[Individual], rng: &mut Pcg32) -> Vec<Individual> {
        let mut cursor = PoolCursor::new(pool.len());
        let mut children = Vec::with_capacity(pool.len());
        while cursor.remaining() >= 2 {
            let a = &pool[cursor.draw(rng).expect("two live entries")];
            let b = &pool[cursor.draw(rng).expect("one live entry")];

            let len = a.genome.len().min(b.genome.len());
            let l1 = rng.random_range(0..=len);
            let l2 = rng.random_range(l1..=len);

            let mut child_a = a.genome.clone();
            let mut child_b = b.genome.clone();
            for i in l1..l2 {
                std::mem::swap(&mut child_a[i], &mut child_b[i]);
            }
            children.push(Individual::from_genome(child_a));
            children.push(Individual::from_genome(child_b));
        }
        children
    }
}

/// uniform crossover: each gene position swaps independently with a fixed
/// probability, up to the shorter parent's length
pub struct Uniform {
    pub swap_probability: f64,
}

impl Default for Uniform {
    fn default() -> Self {
        Self {
            swap_probability: 0.5,
        }
    }
}

impl Crossover for Uniform {
    fn recombine(&self, pool: &[Individual], rng: &mut Pcg32) -> Vec<Individual> {
        let mut cursor = PoolCursor::new(pool.len());
        let mut children = Vec::with_capacity(pool.len());
        while cursor.remaining() >= 2 {
            let a = &pool[cursor.draw(rng).expect("two live entries")];
            let b = &pool[cursor.draw(rng).expect("one live entry")];

            let mut child_a = a.genome.clone();
            let mut child_b = b.genome.clone();
            let len = child_a.len().min(child_b.len());
            for i in 0..len {
                if rng.random_bool(self.swap_probability) {
                    std::mem::swap(&mut child_a[i], &mut child_b[i]);
                }
            }
            children.push(Individual::from_genome(child_a));
            children.push(Individual::from_genome(child_b));
        }
        children
    }
}
