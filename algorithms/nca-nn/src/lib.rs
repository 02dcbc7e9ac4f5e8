//! `nca-nn` provides the neighbourhood machinery of the workspace: distance functions, the
//! pairwise [`DistanceMatrix`](distance/trait.DistanceMatrix.html) consumed by the NCA
//! objective, a linear-scan nearest neighbour index and the
//! [`KNeighborsClassifier`](struct.KNeighborsClassifier.html) used to score learned
//! projections.
//!
//! ## Example
//!
//! ```rust
//! use nca::prelude::*;
//! use nca_nn::KNeighborsParams;
//! use ndarray::array;
//!
//! let train = Dataset::new(
//!     array![[0., 0.], [0., 1.], [5., 5.], [5., 6.]],
//!     array![0usize, 0, 1, 1],
//! );
//! let model = KNeighborsParams::new(3).fit(&train)?;
//!
//! let predicted = model.predict(&array![[0.2, 0.5], [4.8, 5.1]]);
//! assert_eq!(predicted, array![0, 1]);
//! # Ok::<(), nca_nn::NnError>(())
//! ```
use ndarray::ArrayView1;
use thiserror::Error;

pub mod distance;
mod heap_elem;
mod hyperparams;
mod knn;
mod linear;

pub use hyperparams::{KNeighborsParams, KNeighborsValidParams};
pub use knn::KNeighborsClassifier;
pub use linear::LinearSearchIndex;

pub type Point<'a, F> = ArrayView1<'a, F>;

pub type Result<T> = std::result::Result<T, NnError>;

/// Error returned when building or querying a nearest neighbour index, or when fitting and
/// scoring a k-nearest-neighbour classifier
#[derive(Error, Debug)]
pub enum NnError {
    /// The training set of a classifier contains no points
    #[error("cannot fit a classifier on an empty training set")]
    EmptyIndex,
    /// Points with zero dimensions were passed in
    #[error("points have dimension of 0")]
    ZeroDimension,
    /// The query point has a different dimension than the stored points
    #[error("query has dimension {0}, stored points have dimension {1}")]
    WrongDimension(usize, usize),
    /// The number of neighbours is zero
    #[error("number of neighbours must be positive, got {0}")]
    InvalidK(usize),
    /// More neighbours were requested than training points exist
    #[error("{0} neighbours requested, but the training set has only {1} points")]
    NotEnoughPoints(usize, usize),
    /// The evaluation set contains no points
    #[error("cannot score on an empty evaluation set")]
    EmptyEvaluation,
    #[error(transparent)]
    BaseCrate(#[from] nca::Error),
}

