use rand_pcg::Pcg32;

use crate::individual::Individual;

/// merges children and the prior generation into the next one.
///
/// the next generation always has exactly `population_size` members; the
/// engine advances its generation counter as the final act of this phase.
pub trait Replacement: Send + Sync {
    fn replace(
        &self,
        parents: Vec<Individual>,
        children: Vec<Individual>,
        population_size: usize,
        rng: &mut Pcg32,
    ) -> Vec<Individual>;
}

/// uniform random subsample of `keep` members, consuming the pool.
/// order of the survivors follows the pool, not the sample.
fn sample_down(pool: Vec<Individual>, keep: usize, rng: &mut Pcg32) -> Vec<Individual> {
    if pool.len() <= keep {
        return pool;
    }
    let mut chosen: Vec<usize> = rand::seq::index::sample(rng, pool.len(), keep).into_vec();
    chosen.sort_unstable();
    let mut chosen = chosen.into_iter().peekable();
    pool.into_iter()
        .enumerate()
        .filter_map(|(i, ind)| {
            if chosen.peek() == Some(&i) {
                chosen.next();
                Some(ind)
            } else {
                None
            }
        })
        .collect()
}

/// no elitism guarantee: parents and children are pooled and uniformly
/// sampled down to the fixed population size
pub struct Traditional;

impl Replacement for Traditional {
    fn replace(
        &self,
        parents: Vec<Individual>,
        children: Vec<Individual>,
        population_size: usize,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let mut pool = parents;
        pool.extend(children);
        sample_down(pool, population_size, rng)
    }
}

/// children-first replacement: the new generation is built from the children,
/// backfilled by uniformly sampled survivors of the prior generation. when
/// children outnumber the population, they are subsampled instead. without
/// external champion tracking the population maximum can regress under this
/// policy (by construction, not a bug).
pub struct YoungBias;

impl Replacement for YoungBias {
    fn replace(
        &self,
        parents: Vec<Individual>,
        children: Vec<Individual>,
        population_size: usize,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        if children.len() >= population_size {
            return sample_down(children, population_size, rng);
        }
        let backfill = population_size - children.len();
        let mut next = children;
        next.extend(sample_down(parents, backfill, rng));
        next
    }
}
