use ndarray::ShapeError;
use thiserror::Error;

use nca_nn::NnError;
use nca_reduction::ReductionError;

pub type Result<T> = std::result::Result<T, NcaError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NcaError {
    /// The flat parameter vector cannot be reshaped into rows of the feature dimension
    #[error("parameter vector of length {0} cannot be reshaped into rows of {1} features")]
    ParameterShape(usize, usize),
    #[error(transparent)]
    NdShape(#[from] ShapeError),
    #[error("same-class mask has shape {0:?}, expected ({1}, {1})")]
    MaskShape((usize, usize), usize),
    #[error("same-class mask must be symmetric with a true diagonal")]
    InvalidMask,
    #[error("at least two samples are needed, got {0}")]
    NotEnoughSamples(usize),
    #[error("tolerance must be a finite, non-negative number")]
    InvalidTolerance,
    #[error("maximum number of iterations must be positive")]
    InvalidMaxIter,
    #[error("history size of the L-BFGS solver must be positive")]
    InvalidHistorySize,
    #[error("number of components must be positive")]
    InvalidComponents,
    #[error("number of components {0} is larger than the number of features {1}")]
    ComponentsTooLarge(usize, usize),
    #[error("initial projection has shape {0:?}, expected {1:?}")]
    InitShape((usize, usize), (usize, usize)),
    #[error("values must be finite and not `Inf`, `-Inf` or `NaN`")]
    InvalidValues,
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
    #[error(transparent)]
    Reduction(#[from] ReductionError),
    #[error(transparent)]
    NearestNeighbour(#[from] NnError),
    #[error(transparent)]
    BaseCrate(#[from] nca::Error),
}
