//! `nca-reduction` implements Principal Component Analysis, the linear dimensionality
//! reduction which seeds NCA when the target dimension is smaller than the feature dimension
//! and which serves as its baseline during evaluation.

mod error;
mod pca;

pub use error::{ReductionError, Result};
pub use pca::{Pca, PcaParams, PcaValidParams};
