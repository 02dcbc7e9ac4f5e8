//! Error types in nca
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("algorithm not converged {0}")]
    NotConverged(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("number of records ({0}) does not match number of targets ({1})")]
    MismatchedShapes(usize, usize),
    #[error("Not enough samples")]
    NotEnoughSamples,
}
