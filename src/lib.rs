pub mod config;
pub mod crossover;
pub mod dna;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod individual;
pub mod mutation;
pub mod palette;
pub mod render;
pub mod replacement;
pub mod schedule;
pub mod select;

pub use config::RunConfig;
pub use dna::{CanvasSize, ColorSampling, Shape, ShapeKind};
pub use engine::{Engine, EngineConfig, Strategies};
pub use error::{EvolveError, Result};
pub use fitness::{Evaluator, FitnessFormula};
pub use individual::Individual;
pub use render::{CpuRenderer, Renderer};
pub use schedule::DecaySchedule;
