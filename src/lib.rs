//! `nca` provides the shared building blocks of a small metric learning toolkit around
//! Neighbourhood Components Analysis.
//!
//! The crate itself contains no algorithm. It defines the common vocabulary which all crates in
//! this workspace speak:
//!
//! * [`DatasetBase`](dataset/struct.DatasetBase.html), records paired with class labels
//! * the [`Fit`](traits/trait.Fit.html), [`Predict`](traits/trait.Predict.html) and
//! [`Transformer`](traits/trait.Transformer.html) traits
//! * [`ParamGuard`](param_guard/trait.ParamGuard.html) for checked hyperparameters
//! * a confusion matrix to score classifiers
//!
//! The algorithms live in their own crates:
//!
//! | Name | Purpose |
//! | :--- | :--- |
//! | `nca-nn` | pairwise distances, nearest neighbour search and k-NN classification |
//! | `nca-reduction` | principal component analysis |
//! | `nca-components` | the NCA objective, its optimizer and the learned projection |
//! | `nca-datasets` | synthetic labelled data |
//!

pub mod dataset;
pub mod error;
mod metrics_classification;
pub mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float, Label};
pub use error::Error;
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{ConfusionMatrix, ToConfusionMatrix};
}
