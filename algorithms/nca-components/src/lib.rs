//! # Neighbourhood Components Analysis (NCA)
//!
//! `nca-components` learns a linear projection of labelled records under which a soft nearest
//! neighbour classifier performs best.
//!
//! Every training point picks a neighbour at random, with probabilities given by the softmax of
//! the negative squared distances in the projected space. NCA maximizes the expected number of
//! points which pick a neighbour of their own class. The objective is smooth in the projection
//! matrix `A`, so its gradient is handed to a quasi-Newton minimizer.
//!
//! ## The Big Picture
//!
//! The crate builds on the dataset and estimator traits of `nca`, the distance matrices and the
//! k-nearest-neighbour classifier of `nca-nn` and the PCA of `nca-reduction`.
//!
//! ## Current state
//!
//! `nca-components` provides
//!
//! - the NCA [objective](objective/index.html) with its analytic gradient
//! - the [`Minimize`] capability with an argmin backed [`Lbfgs`] implementation
//! - the [`Nca`] estimator with identity, PCA, random and custom initialization
//! - a [comparison](fn.compare.html) of 3-NN accuracies on raw, NCA and PCA projected records
//!
//! ## Example
//!
//! ```
//! use nca::traits::{Fit, Transformer};
//! use nca::Dataset;
//! use nca_components::Nca;
//! use ndarray::array;
//!
//! // the second feature carries the class, the first one is noise
//! let dataset = Dataset::new(
//!     array![[3., 0.], [-2., 0.1], [0.5, 1.0], [-1., 0.9], [2., 0.05], [-3., 1.1]],
//!     array![0usize, 0, 1, 1, 0, 1],
//! );
//!
//! let model = Nca::<f64>::params().max_iter(20).fit(&dataset)?;
//! let projected = model.transform(dataset);
//!
//! assert_eq!(projected.records.ncols(), 2);
//! # Ok::<(), nca_components::NcaError>(())
//! ```
mod algorithm;
mod argmin_param;
mod error;
mod evaluation;
mod float;
mod hyperparams;
mod minimize;
pub mod objective;

pub use algorithm::Nca;
pub use error::{NcaError, Result};
pub use evaluation::{compare, Comparison};
pub use float::Float;
pub use hyperparams::{NcaInit, NcaParams, NcaValidParams};
pub use minimize::{DifferentiableObjective, Lbfgs, Minimize, Minimum};
pub use objective::{nca_objective, soft_neighbour_probabilities, NcaObjective, SameClassMask};
