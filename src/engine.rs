use rand::SeedableRng;
use rand_pcg::Pcg32;
use rayon::prelude::*;

use crate::crossover::Crossover;
use crate::dna::{CanvasSize, ColorSampling, DrawCmd, ShapeKind};
use crate::error::{EvolveError, Result};
use crate::fitness::{Evaluator, FitnessFormula};
use crate::individual::Individual;
use crate::mutation::{Mutation, MutationRates};
use crate::render::{premultiply, Renderer};
use crate::replacement::Replacement;
use crate::schedule::DecaySchedule;
use crate::select::Selection;

/// engine construction parameters
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub population_size: usize,
    /// genes per genome; fixed for the whole run
    pub genome_len: usize,
    pub shape_kind: ShapeKind,
    pub color_sampling: ColorSampling,
    pub fitness_formula: FitnessFormula,
    /// annealed mutation probability: high early for broad exploration,
    /// decaying toward a floor for late fine-tuning
    pub mutation_schedule: DecaySchedule,
    /// vertex-jitter multiplier forwarded to gene mutation
    pub aggressiveness: f32,
    /// keep a best-so-far individual independent of the population, which
    /// can regress under young-bias replacement
    pub track_champion: bool,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            genome_len: 30,
            shape_kind: ShapeKind::Triangle,
            color_sampling: ColorSampling::Continuous,
            fitness_formula: FitnessFormula::default(),
            mutation_schedule: DecaySchedule::new(0.5, 0.05, 0.005),
            aggressiveness: 1.0,
            track_champion: true,
            seed: 0xDEAD_BEEF,
        }
    }
}

/// one concrete strategy per role, injected once at construction and never
/// re-resolved during the run
pub struct Strategies {
    pub selection: Box<dyn Selection>,
    pub crossover: Box<dyn Crossover>,
    pub mutation: Box<dyn Mutation>,
    pub replacement: Box<dyn Replacement>,
}

/// the evolution engine: owns the population, the generation counter, the
/// parameter schedules and one strategy per role.
///
/// one generation step = evaluate (barrier) → select → crossover → mutate at
/// the scheduled probability → replace → advance the counter. evaluation is
/// parallel internally but completes before any strategy runs; everything
/// that draws randomness uses the single seeded generator in this fixed
/// order, so a fixed seed reproduces a run exactly.
pub struct Engine<R: Renderer> {
    canvas: CanvasSize,
    config: EngineConfig,
    renderer: R,
    evaluator: Evaluator,
    strategies: Strategies,
    rng: Pcg32,
    population: Vec<Individual>,
    generation: u64,
    champion: Option<Individual>,
}

impl<R: Renderer> Engine<R> {
    /// build an engine over a straight (unpremultiplied) RGBA8 target
    pub fn new(
        target_rgba: Vec<u8>,
        canvas: CanvasSize,
        config: EngineConfig,
        strategies: Strategies,
        renderer: R,
    ) -> Result<Self> {
        if config.population_size == 0 {
            return Err(EvolveError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if config.genome_len == 0 {
            return Err(EvolveError::InvalidConfig(
                "genome_len must be at least 1".into(),
            ));
        }
        // geometry sampling and the rasterizer both need a non-empty canvas
        if canvas.width == 0 || canvas.height == 0 {
            return Err(EvolveError::InvalidConfig(format!(
                "canvas must be at least 1x1, got {}x{}",
                canvas.width, canvas.height
            )));
        }

        // phenotypes come out of the renderer premultiplied; convert the
        // target once so both sides of the diff share an encoding
        let target_premul = premultiply(&target_rgba);
        let evaluator = Evaluator::new(target_premul, canvas, config.fitness_formula)?;

        let mut rng = Pcg32::seed_from_u64(config.seed);
        let population = (0..config.population_size)
            .map(|_| {
                Individual::random(
                    config.genome_len,
                    config.shape_kind,
                    canvas,
                    config.color_sampling,
                    &mut rng,
                )
            })
            .collect();

        Ok(Self {
            canvas,
            config,
            renderer,
            evaluator,
            strategies,
            rng,
            population,
            generation: 0,
            champion: None,
        })
    }

    /// score every individual that still lacks a fitness value.
    ///
    /// runs in parallel across individuals (each reads the shared target and
    /// writes only its own caches) but acts as a barrier: when this returns,
    /// every member is scored and stable for the strategies to consume.
    fn evaluate_all(&mut self) -> Result<()> {
        profiling::scope!("Engine::evaluate_all");
        let renderer = &self.renderer;
        let evaluator = &self.evaluator;
        let canvas = self.canvas;
        self.population
            .par_iter_mut()
            .filter(|ind| ind.fitness.is_none())
            .try_for_each(|ind| {
                let cmds: Vec<DrawCmd> = ind.genome.iter().map(|g| g.draw_cmd()).collect();
                let phenotype = renderer.render(canvas, &cmds);
                ind.fitness = Some(evaluator.score(&phenotype)?);
                ind.phenotype = Some(phenotype);
                Ok::<_, EvolveError>(())
            })
    }

    /// advance exactly one generation.
    ///
    /// `selection_count` parents feed the crossover pool; when `child_count`
    /// is given the child cohort is truncated to it before mutation.
    pub fn step(&mut self, selection_count: usize, child_count: Option<usize>) -> Result<()> {
        profiling::scope!("Engine::step");
        if self.population.is_empty() {
            return Err(EvolveError::EmptyPopulation);
        }
        self.evaluate_all()?;

        let selected = self.strategies.selection.select(
            &self.population,
            selection_count,
            self.generation,
            &mut self.rng,
        );

        let mut children = self.strategies.crossover.recombine(&selected, &mut self.rng);
        if let Some(limit) = child_count {
            children.truncate(limit);
        }

        let rates = MutationRates {
            probability: self.config.mutation_schedule.at(self.generation),
            aggressiveness: self.config.aggressiveness,
        };
        for child in &mut children {
            self.strategies
                .mutation
                .mutate(child, rates, self.canvas, &mut self.rng);
        }

        let parents = std::mem::take(&mut self.population);
        self.population = self.strategies.replacement.replace(
            parents,
            children,
            self.config.population_size,
            &mut self.rng,
        );
        self.generation += 1;

        if self.config.track_champion {
            self.evaluate_all()?;
            let best = self.best_index()?;
            let best_fitness = self.population[best].fitness_scored();
            let improved = self
                .champion
                .as_ref()
                .map_or(true, |c| best_fitness > c.fitness_scored());
            if improved {
                self.champion = Some(self.population[best].clone());
            }
        }
        Ok(())
    }

    fn best_index(&self) -> Result<usize> {
        self.population
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.fitness_scored()
                    .partial_cmp(&b.fitness_scored())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .ok_or(EvolveError::EmptyPopulation)
    }

    /// the current fittest member of the population, evaluating any member
    /// still unscored. note: under young-bias replacement this value can
    /// regress between generations; `champion()` does not.
    pub fn fittest(&mut self) -> Result<&Individual> {
        if self.population.is_empty() {
            return Err(EvolveError::EmptyPopulation);
        }
        self.evaluate_all()?;
        let idx = self.best_index()?;
        Ok(&self.population[idx])
    }

    /// best-so-far individual across all generations, when tracking is on
    pub fn champion(&self) -> Option<&Individual> {
        self.champion.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// read access to the whole population, for external snapshotting or
    /// visualization
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }
}
