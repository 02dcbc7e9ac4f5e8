//! Principal Component Analysis
//!
//! Principal Component Analysis is a common technique for data and dimensionality reduction. It
//! reduces the dimensionality of the data while retaining most of the variance. This is
//! done by projecting the data onto the leading eigenvectors of its covariance matrix, which are
//! found with the symmetric eigendecomposition of `linfa-linalg`.
//!
//! # Example
//!
//! ```
//! use nca::traits::{Fit, Predict};
//! use nca::DatasetBase;
//! use nca_reduction::Pca;
//! use ndarray::{array, Array2};
//!
//! let records = array![[1., 2.], [2., 4.1], [3., 5.9], [4., 8.]];
//! let dataset = DatasetBase::from(records.clone());
//!
//! // apply PCA projection along a line which maximizes the spread of the data
//! let embedding = Pca::params(1).fit(&dataset)?;
//!
//! // reduce dimensionality of the records
//! let reduced: Array2<f64> = embedding.predict(&records);
//! assert_eq!(reduced.dim(), (4, 1));
//! # Ok::<(), nca_reduction::ReductionError>(())
//! ```
//!
use linfa_linalg::eigh::{EigSort, EighInto};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use nca::{
    dataset::Records,
    traits::{Fit, PredictInplace},
    DatasetBase, Float, ParamGuard,
};

use crate::error::{ReductionError, Result};

/// Checked Principal Component Analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcaValidParams {
    embedding_size: usize,
}

impl PcaValidParams {
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
}

/// Principal Component Analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcaParams(PcaValidParams);

impl ParamGuard for PcaParams {
    type Checked = PcaValidParams;
    type Error = ReductionError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.embedding_size == 0 {
            Err(ReductionError::NonPositiveEmbeddingSize)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fit a PCA model given a dataset
///
/// The Principal Component Analysis takes the records of a dataset and tries to find the best
/// fit in a lower dimensional space such that the maximal variance is retained.
///
/// # Parameters
///
/// * `dataset`: A dataset with records in D dimensions
///
/// # Returns
///
/// A fitted PCA model with origin and hyperplane
impl<T, F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, T, ReductionError> for PcaValidParams {
    type Object = Pca<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Pca<F>> {
        let x = dataset.records();
        let (n, n_features) = x.dim();

        if n < 2 {
            return Err(ReductionError::NotEnoughSamples);
        }
        if self.embedding_size > n_features {
            return Err(ReductionError::DimensionIncrease(
                self.embedding_size,
                n_features,
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ReductionError::InvalidValues);
        }

        // calculate mean of data and subtract it
        let mean = x
            .mean_axis(Axis(0))
            .ok_or(ReductionError::NotEnoughSamples)?;
        let x = x - &mean;

        let cov = x.t().dot(&x) / F::cast(n - 1);
        let (eigvals, eigvecs) = cov.eigh_into()?.sort_eig_desc();

        // round-off can leave tiny negative eigenvalues
        let eigvals = eigvals.mapv(|v| v.max(F::zero()));
        let total_variance = eigvals.sum();

        let explained_variance = eigvals.slice(s![..self.embedding_size]).to_owned();
        let mut embedding = eigvecs
            .slice(s![.., ..self.embedding_size])
            .t()
            .to_owned();

        // orient every axis such that its largest entry is positive
        for mut axis in embedding.axis_iter_mut(Axis(0)) {
            let pivot = axis
                .iter()
                .copied()
                .fold(F::zero(), |acc, v| if v.abs() > acc.abs() { v } else { acc });
            if pivot < F::zero() {
                axis.mapv_inplace(|v| -v);
            }
        }

        Ok(Pca {
            embedding,
            explained_variance,
            total_variance,
            mean,
        })
    }
}

/// Fitted Principal Component Analysis model
///
/// The model contains the mean and hyperplane for the projection of data.
///
/// # Example
///
/// ```
/// use nca::traits::Fit;
/// use nca::DatasetBase;
/// use nca_reduction::Pca;
/// use ndarray::array;
///
/// let dataset = DatasetBase::from(array![[0., 0.], [1., 0.1], [2., 0.], [3., 0.1]]);
/// let pca = Pca::params(1).fit(&dataset)?;
///
/// // the leading axis runs along the first feature
/// assert!(pca.components()[(0, 0)] > 0.99);
/// # Ok::<(), nca_reduction::ReductionError>(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Pca<F> {
    embedding: Array2<F>,
    explained_variance: Array1<F>,
    total_variance: F,
    mean: Array1<F>,
}

impl Pca<f32> {
    /// Create default parameter set
    ///
    /// # Parameters
    ///
    ///  * `embedding_size`: the target dimensionality
    pub fn params(embedding_size: usize) -> PcaParams {
        PcaParams(PcaValidParams { embedding_size })
    }
}

impl<F: Float> Pca<F> {
    /// Principal axes as rows, ordered by decreasing explained variance
    ///
    /// The matrix has shape `(embedding_size, n_features)`.
    pub fn components(&self) -> ArrayView2<F> {
        self.embedding.view()
    }

    /// Return the variance of the data along every principal axis
    pub fn explained_variance(&self) -> Array1<F> {
        self.explained_variance.clone()
    }

    /// Return the fraction of the total variance explained by every principal axis
    pub fn explained_variance_ratio(&self) -> Array1<F> {
        if self.total_variance > F::zero() {
            self.explained_variance.mapv(|v| v / self.total_variance)
        } else {
            Array1::zeros(self.explained_variance.len())
        }
    }

    /// Return the mean of the training records
    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }
}

/// Project a matrix to lower dimensional space
///
/// The projection first centers and then projects the data.
impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array2<F>> for Pca<F> {
    fn predict_inplace(&self, records: &ArrayBase<D, Ix2>, targets: &mut Array2<F>) {
        assert_eq!(
            targets.dim(),
            (records.nsamples(), self.embedding.nrows()),
            "The number of data points must match the number of output targets."
        );

        *targets = (records - &self.mean).dot(&self.embedding.t());
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array2<F> {
        Array2::zeros((x.nrows(), self.embedding.nrows()))
    }
}
