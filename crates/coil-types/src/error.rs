use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoilError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error(
        "evaluation point {point_index} coincides with coil quadrature point \
         {quadrature_index} (distance {distance:.3e} m)"
    )]
    SingularEvaluation {
        point_index: usize,
        quadrature_index: usize,
        distance: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoilResult<T> = Result<T, CoilError>;
