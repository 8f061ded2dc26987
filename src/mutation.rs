use rand::Rng;
use rand_pcg::Pcg32;

use crate::dna::CanvasSize;
use crate::individual::Individual;

/// per-step mutation parameters, produced by the engine's schedules
#[derive(Clone, Copy, Debug)]
pub struct MutationRates {
    /// current scheduled mutation probability
    pub probability: f64,
    /// vertex-jitter multiplier forwarded to the gene operators
    pub aggressiveness: f32,
}

/// child perturbation. implementations must invalidate the individual's
/// cached fitness and phenotype whenever the genome changed.
pub trait Mutation: Send + Sync {
    fn mutate(
        &self,
        individual: &mut Individual,
        rates: MutationRates,
        canvas: CanvasSize,
        rng: &mut Pcg32,
    );
}

#[derive(Clone, Copy)]
enum Reorder {
    ToBack,
    ToFront,
}

/// per-gene mutation: one draw per gene against the scheduled probability,
/// partitioned into mutate-in-place (half the probability mass), move to the
/// back of the paint order (a quarter) and move to the front (a quarter).
///
/// reorders are deferred and applied after the scan so the genome is never
/// restructured mid-iteration.
pub struct Uniform;

impl Mutation for Uniform {
    fn mutate(
        &self,
        individual: &mut Individual,
        rates: MutationRates,
        canvas: CanvasSize,
        rng: &mut Pcg32,
    ) {
        let p = rates.probability;
        let mut deferred: Vec<(usize, Reorder)> = Vec::new();
        let mut changed = false;

        for idx in 0..individual.genome.len() {
            let roll = rng.random::<f64>();
            if roll < p * 0.5 {
                individual.genome[idx].mutate(canvas, rates.aggressiveness, rng);
                changed = true;
            } else if roll < p * 0.75 {
                deferred.push((idx, Reorder::ToBack));
            } else if roll < p {
                deferred.push((idx, Reorder::ToFront));
            }
        }

        if !deferred.is_empty() {
            apply_reorders(&mut individual.genome, &deferred);
            changed = true;
        }
        if changed {
            individual.invalidate();
        }
    }
}

/// removal happens in descending index order so earlier removals never shift
/// the indices still pending; scan order is preserved within each direction.
fn apply_reorders<T>(genome: &mut Vec<T>, ops: &[(usize, Reorder)]) {
    let mut fronts: Vec<T> = Vec::new(); // reverse scan order
    let mut backs: Vec<T> = Vec::new();
    for &(idx, dir) in ops.iter().rev() {
        let gene = genome.remove(idx);
        match dir {
            Reorder::ToFront => fronts.push(gene),
            Reorder::ToBack => backs.push(gene),
        }
    }
    // fronts are in reverse scan order; inserting each at 0 restores scan
    // order at the front of the paint order
    for gene in fronts {
        genome.insert(0, gene);
    }
    genome.extend(backs.into_iter().rev());
}

/// whole-individual mutation: a single probability check; when it passes,
/// every gene is mutated in place unconditionally
pub struct Complete;

impl Mutation for Complete {
    fn mutate(
        &self,
        individual: &mut Individual,
        rates: MutationRates,
        canvas: CanvasSize,
        rng: &mut Pcg32,
    ) {
        if rng.random::<f64>() >= rates.probability {
            return;
        }
        for gene in &mut individual.genome {
            gene.mutate(canvas, rates.aggressiveness, rng);
        }
        if !individual.genome.is_empty() {
            individual.invalidate();
        }
    }
}
