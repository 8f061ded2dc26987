use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crossover::{self, Crossover};
use crate::dna::{ColorSampling, ShapeKind};
use crate::engine::{EngineConfig, Strategies};
use crate::error::Result;
use crate::fitness::FitnessFormula;
use crate::mutation::{self, Mutation};
use crate::replacement::{self, Replacement};
use crate::schedule::DecaySchedule;
use crate::select::{self, Selection};

/// selection strategy named in the config file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Elite,
    Roulette,
    Universal,
    Ranking,
    Boltzmann,
    DeterministicTournament,
    ProbabilisticTournament,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    TwoPoint,
    Uniform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Uniform,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementKind {
    Traditional,
    YoungBias,
}

/// one run, as read from a JSON config file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// path to the target image
    pub image: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_shape_count")]
    pub shape_count: usize,
    #[serde(default = "default_shape_type")]
    pub shape_type: ShapeKind,
    #[serde(default = "default_color_sampling")]
    pub color_sampling: ColorSampling,

    #[serde(default = "default_population_amount")]
    pub population_amount: usize,
    #[serde(default = "default_child_amount")]
    pub generated_child_amount: usize,

    pub selection_algorithm: SelectionKind,
    pub crossover_algorithm: CrossoverKind,
    pub mutation_algorithm: MutationKind,
    pub replacement_algorithm: ReplacementKind,

    #[serde(default = "default_max_gen_count")]
    pub max_gen_count: u64,
    #[serde(default = "default_min_fitness_goal")]
    pub min_fitness_goal: f64,

    #[serde(default)]
    pub fitness: FitnessFormula,
    #[serde(default = "default_mutation_schedule")]
    pub mutation_schedule: DecaySchedule,
    #[serde(default = "default_boltzmann_temperature")]
    pub boltzmann_temperature: DecaySchedule,
    #[serde(default = "default_uniform_swap_probability")]
    pub uniform_swap_probability: f64,
    #[serde(default = "default_aggressiveness")]
    pub aggressiveness: f32,
    #[serde(default = "default_track_champion")]
    pub track_champion: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_output_dir() -> String {
    "generated".into()
}
fn default_shape_count() -> usize {
    30
}
fn default_shape_type() -> ShapeKind {
    ShapeKind::Triangle
}
fn default_color_sampling() -> ColorSampling {
    ColorSampling::Continuous
}
fn default_population_amount() -> usize {
    100
}
fn default_child_amount() -> usize {
    50
}
fn default_max_gen_count() -> u64 {
    5000
}
fn default_min_fitness_goal() -> f64 {
    0.95
}
fn default_mutation_schedule() -> DecaySchedule {
    DecaySchedule::new(0.5, 0.05, 0.005)
}
fn default_boltzmann_temperature() -> DecaySchedule {
    DecaySchedule::new(2.0, 0.2, 0.01)
}
fn default_uniform_swap_probability() -> f64 {
    0.5
}
fn default_aggressiveness() -> f32 {
    1.0
}
fn default_track_champion() -> bool {
    true
}
fn default_seed() -> u64 {
    0xDEAD_BEEF
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// resolve the named strategies into concrete values, once, at engine
    /// construction
    pub fn strategies(&self) -> Strategies {
        let selection: Box<dyn Selection> = match self.selection_algorithm {
            SelectionKind::Elite => Box::new(select::Elite),
            SelectionKind::Roulette => Box::new(select::Roulette),
            SelectionKind::Universal => Box::new(select::Universal),
            SelectionKind::Ranking => Box::new(select::Ranking),
            SelectionKind::Boltzmann => Box::new(select::Boltzmann {
                temperature: self.boltzmann_temperature,
            }),
            SelectionKind::DeterministicTournament => Box::new(select::DeterministicTournament),
            SelectionKind::ProbabilisticTournament => Box::new(select::ProbabilisticTournament),
        };
        let crossover: Box<dyn Crossover> = match self.crossover_algorithm {
            CrossoverKind::TwoPoint => Box::new(crossover::TwoPoint),
            CrossoverKind::Uniform => Box::new(crossover::Uniform {
                swap_probability: self.uniform_swap_probability,
            }),
        };
        let mutation: Box<dyn Mutation> = match self.mutation_algorithm {
            MutationKind::Uniform => Box::new(mutation::Uniform),
            MutationKind::Complete => Box::new(mutation::Complete),
        };
        let replacement: Box<dyn Replacement> = match self.replacement_algorithm {
            ReplacementKind::Traditional => Box::new(replacement::Traditional),
            ReplacementKind::YoungBias => Box::new(replacement::YoungBias),
        };
        Strategies {
            selection,
            crossover,
            mutation,
            replacement,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            population_size: self.population_amount,
            genome_len: self.shape_count,
            shape_kind: self.shape_type,
            color_sampling: self.color_sampling,
            fitness_formula: self.fitness,
            mutation_schedule: self.mutation_schedule,
            aggressiveness: self.aggressiveness,
            track_champion: self.track_champion,
            seed: self.seed,
        }
    }
}
