use thiserror::Error;

/// Errors surfaced by the engine and the runner.
///
/// All failures are deterministic given fixed non-random inputs; there is
/// nothing to retry. Running out of generation budget is NOT an error; the
/// engine simply hands back whatever is currently fittest.
#[derive(Debug, Error)]
pub enum EvolveError {
    #[error("phenotype holds {got_px} pixels but target is {want_w}x{want_h} ({want_px} pixels); images must match exactly")]
    DimensionMismatch {
        got_px: usize,
        want_w: u32,
        want_h: u32,
        want_px: usize,
    },

    #[error("population is empty")]
    EmptyPopulation,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, EvolveError>;
