use rand::Rng;
use rand_pcg::Pcg32;

use crate::individual::Individual;
use crate::schedule::DecaySchedule;

/// parent selection: choose `count` individuals from the population, weighted
/// or ranked by fitness. the returned list is a multiset; repetition is
/// expected and intentional.
///
/// every strategy runs after the engine's evaluation barrier, so all fitness
/// values are present, and draws from the shared generator in a fixed order
/// so seeded runs reproduce exactly.
pub trait Selection: Send + Sync {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual>;
}

/// population indices sorted by fitness, best first. ties keep the original
/// order so sorting is stable across runs.
fn ranked_desc(population: &[Individual]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| {
        population[b]
            .fitness_scored()
            .partial_cmp(&population[a].fitness_scored())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// roulette mechanism shared by Roulette, Universal, Ranking and Boltzmann:
/// pick, for each draw in [0,1), the index whose cumulative normalized-weight
/// interval contains it. a zero total weight degenerates to uniform intervals
/// so a flat population still selects.
fn spin_wheel(weights: &[f64], draws: &[f64]) -> Vec<usize> {
    let n = weights.len();
    let total: f64 = weights.iter().sum();
    let cumulative: Vec<f64> = if total > 0.0 {
        let mut acc = 0.0;
        weights
            .iter()
            .map(|w| {
                acc += w / total;
                acc
            })
            .collect()
    } else {
        (1..=n).map(|i| i as f64 / n as f64).collect()
    };

    draws
        .iter()
        .map(|&r| {
            cumulative
                .iter()
                .position(|&c| r < c)
                .unwrap_or(n - 1) // guard against trailing float error
        })
        .collect()
}

/// rank-proportional elitism: slot counts fall by ceiling division down the
/// ranking, so the fittest always takes the most slots and the allocation
/// sums to exactly `count`.
pub struct Elite;

impl Selection for Elite {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        _rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let n = population.len();
        let order = ranked_desc(population);
        let mut selected = Vec::with_capacity(count);
        for (rank, &idx) in order.iter().enumerate() {
            if selected.len() >= count {
                break;
            }
            // ceil((count - rank) / n) slots for this rank
            let slots = (count.saturating_sub(rank) + n - 1) / n;
            for _ in 0..slots.min(count - selected.len()) {
                selected.push(population[idx].clone());
            }
        }
        selected
    }
}

/// fitness-proportional sampling, one independent uniform draw per slot
pub struct Roulette;

impl Selection for Roulette {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let weights: Vec<f64> = population.iter().map(|i| i.fitness_scored()).collect();
        let draws: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
        spin_wheel(&weights, &draws)
            .into_iter()
            .map(|i| population[i].clone())
            .collect()
    }
}

/// stochastic universal sampling: one evenly spaced comb of pointers offset
/// by a single shared random value. lower variance than roulette for the
/// same count.
pub struct Universal;

impl Selection for Universal {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let weights: Vec<f64> = population.iter().map(|i| i.fitness_scored()).collect();
        let offset = rng.random::<f64>();
        let draws: Vec<f64> = (0..count)
            .map(|j| (offset + j as f64) / count as f64)
            .collect();
        spin_wheel(&weights, &draws)
            .into_iter()
            .map(|i| population[i].clone())
            .collect()
    }
}

/// rank-based pseudo-fitness (N − rank)/N fed through the roulette
/// mechanism; decouples pressure from the raw fitness scale
pub struct Ranking;

impl Selection for Ranking {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let n = population.len();
        let order = ranked_desc(population);
        // rank is 1-based: best gets (n-1)/n, worst gets 0
        let weights: Vec<f64> = (0..n).map(|i| (n - (i + 1)) as f64 / n as f64).collect();
        let draws: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
        spin_wheel(&weights, &draws)
            .into_iter()
            .map(|i| population[order[i]].clone())
            .collect()
    }
}

/// Boltzmann selection: pseudo-fitness exp(f/T) normalized by its population
/// mean, with T annealed per generation. high temperature flattens pressure
/// early (exploration); the decay sharpens it later (exploitation).
pub struct Boltzmann {
    pub temperature: DecaySchedule,
}

impl Default for Boltzmann {
    fn default() -> Self {
        Self {
            temperature: DecaySchedule::new(2.0, 0.2, 0.01),
        }
    }
}

impl Selection for Boltzmann {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let t = self.temperature.at(generation);
        let exps: Vec<f64> = population
            .iter()
            .map(|i| (i.fitness_scored() / t).exp())
            .collect();
        let mean = exps.iter().sum::<f64>() / exps.len() as f64;
        let weights: Vec<f64> = exps.iter().map(|e| e / mean).collect();
        let draws: Vec<f64> = (0..count).map(|_| rng.random::<f64>()).collect();
        spin_wheel(&weights, &draws)
            .into_iter()
            .map(|i| population[i].clone())
            .collect()
    }
}

/// deterministic tournament: repeatedly sample M = max(2, count/4)
/// individuals without replacement and keep the fittest
pub struct DeterministicTournament;

impl Selection for DeterministicTournament {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let n = population.len();
        let m = (count / 4).max(2).min(n);
        let mut selected = Vec::with_capacity(count);
        while selected.len() < count {
            let contenders = rand::seq::index::sample(rng, n, m);
            let winner = contenders
                .iter()
                .max_by(|&a, &b| {
                    population[a]
                        .fitness_scored()
                        .partial_cmp(&population[b].fitness_scored())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .expect("tournament sample is non-empty");
            selected.push(population[winner].clone());
        }
        selected
    }
}

/// probabilistic binary tournament: one threshold τ ∈ [0.5, 1) per call;
/// each duel keeps the fitter with probability τ, otherwise the weaker
pub struct ProbabilisticTournament;

impl Selection for ProbabilisticTournament {
    fn select(
        &self,
        population: &[Individual],
        count: usize,
        _generation: u64,
        rng: &mut Pcg32,
    ) -> Vec<Individual> {
        let n = population.len();
        let tau = rng.random_range(0.5..1.0);
        let mut selected = Vec::with_capacity(count);
        while selected.len() < count {
            if n < 2 {
                selected.push(population[0].clone());
                continue;
            }
            let pair = rand::seq::index::sample(rng, n, 2);
            let (a, b) = (pair.index(0), pair.index(1));
            let (fitter, weaker) =
                if population[a].fitness_scored() >= population[b].fitness_scored() {
                    (a, b)
                } else {
                    (b, a)
                };
            let pick = if rng.random::<f64>() < tau { fitter } else { weaker };
            selected.push(population[pick].clone());
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// population with fitness 0.1, 0.2, ... so ranks are unambiguous
    fn scored_population(n: usize) -> Vec<Individual> {
        (0..n)
            .map(|i| {
                let mut ind = Individual::from_genome(Vec::new());
                ind.fitness = Some((i + 1) as f64 / 10.0);
                ind
            })
            .collect()
    }

    fn fitnesses(selected: &[Individual]) -> Vec<f64> {
        selected.iter().map(|i| i.fitness_scored()).collect()
    }

    #[test]
    fn test_elite_full_population_count_includes_fittest() {
        let pop = scored_population(5);
        let mut rng = Pcg32::seed_from_u64(0);
        let selected = Elite.select(&pop, 5, 0, &mut rng);
        assert_eq!(selected.len(), 5);
        assert!(fitnesses(&selected).contains(&0.5));
    }

    #[test]
    fn test_elite_slot_counts_decrease_down_the_ranking() {
        let pop = scored_population(4);
        let mut rng = Pcg32::seed_from_u64(0);
        let selected = Elite.select(&pop, 10, 0, &mut rng);
        assert_eq!(selected.len(), 10);
        let count_of = |f: f64| fitnesses(&selected).iter().filter(|&&x| x == f).count();
        // ceil((10-rank)/4) = 3, 3, 2, 2 for ranks 0..4
        assert_eq!(count_of(0.4), 3);
        assert_eq!(count_of(0.3), 3);
        assert_eq!(count_of(0.2), 2);
        assert_eq!(count_of(0.1), 2);
    }

    #[test]
    fn test_roulette_returns_requested_count() {
        let pop = scored_population(6);
        let mut rng = Pcg32::seed_from_u64(1);
        let selected = Roulette.select(&pop, 9, 0, &mut rng);
        assert_eq!(selected.len(), 9);
    }

    #[test]
    fn test_roulette_survives_all_zero_fitness() {
        let mut pop = scored_population(4);
        for ind in &mut pop {
            ind.fitness = Some(0.0);
        }
        let mut rng = Pcg32::seed_from_u64(2);
        let selected = Roulette.select(&pop, 4, 0, &mut rng);
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_universal_comb_covers_equal_intervals_exactly_once() {
        // the comb mechanism itself: equal weights, 5 pointers, shared offset
        let weights = [1.0; 5];
        let draws: Vec<f64> = (0..5).map(|j| (0.37 + j as f64) / 5.0).collect();
        let picked = spin_wheel(&weights, &draws);
        assert_eq!(picked, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_universal_returns_requested_count() {
        let pop = scored_population(5);
        let mut rng = Pcg32::seed_from_u64(3);
        let selected = Universal.select(&pop, 7, 0, &mut rng);
        assert_eq!(selected.len(), 7);
    }

    #[test]
    fn test_ranking_never_selects_the_worst() {
        let pop = scored_population(5);
        let mut rng = Pcg32::seed_from_u64(4);
        let selected = Ranking.select(&pop, 50, 0, &mut rng);
        assert_eq!(selected.len(), 50);
        // 1-based rank gives the worst individual zero pseudo-fitness
        assert!(!fitnesses(&selected).contains(&0.1));
    }

    #[test]
    fn test_boltzmann_returns_members_of_population() {
        let pop = scored_population(6);
        let mut rng = Pcg32::seed_from_u64(5);
        let selected = Boltzmann::default().select(&pop, 12, 3, &mut rng);
        assert_eq!(selected.len(), 12);
        for ind in &selected {
            assert!(fitnesses(&pop).contains(&ind.fitness_scored()));
        }
    }

    #[test]
    fn test_deterministic_tournament_count_and_bias() {
        let pop = scored_population(8);
        let mut rng = Pcg32::seed_from_u64(6);
        let selected = DeterministicTournament.select(&pop, 20, 0, &mut rng);
        assert_eq!(selected.len(), 20);
        // the overall worst can never win a 2+ tournament
        assert!(!fitnesses(&selected).contains(&0.1));
    }

    #[test]
    fn test_probabilistic_tournament_always_returns_accumulated_list() {
        let pop = scored_population(8);
        let mut rng = Pcg32::seed_from_u64(7);
        let selected = ProbabilisticTournament.select(&pop, 15, 0, &mut rng);
        assert_eq!(selected.len(), 15);
    }
}
