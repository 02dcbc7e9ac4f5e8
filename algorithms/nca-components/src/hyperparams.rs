use ndarray::Array2;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use nca::ParamGuard;

use crate::error::{NcaError, Result};
use crate::float::Float;
use crate::minimize::Lbfgs;

/// Initial projection handed to the optimizer
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum NcaInit<F> {
    /// Principal axes when the dimension is reduced, identity otherwise
    Auto,
    /// Rectangular identity `eye(d, D)`, keeping the first `d` features
    Identity,
    /// The `d` leading principal axes of the training records
    Pca,
    /// Standard normal entries drawn from a generator seeded with `random_state`
    Random,
    /// A user supplied `d x D` matrix
    Custom(Array2<F>),
}

impl<F> Default for NcaInit<F> {
    fn default() -> Self {
        NcaInit::Auto
    }
}

/// A verified hyper-parameter set ready for the estimation of a NCA projection
///
/// See [`NcaParams`](crate::NcaParams) for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct NcaValidParams<F> {
    n_components: Option<usize>,
    init: NcaInit<F>,
    tolerance: F,
    max_iter: u64,
    history_size: usize,
    random_state: u64,
}

impl<F: Float> NcaValidParams<F> {
    /// Output dimension, `None` keeps the input dimension
    pub fn n_components(&self) -> Option<usize> {
        self.n_components
    }

    pub fn init(&self) -> &NcaInit<F> {
        &self.init
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }

    pub fn max_iter(&self) -> u64 {
        self.max_iter
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// The L-BFGS minimizer configured with these parameters
    pub fn lbfgs(&self) -> Lbfgs<F> {
        Lbfgs::new(self.tolerance, self.max_iter, self.history_size)
    }
}

/// A hyper-parameter set for Neighbourhood Components Analysis
///
/// NCA learns a linear projection `A` under which a soft nearest neighbour classifier performs
/// best. The projection is found by L-BFGS, starting from the matrix selected with `init`.
///
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_components](Self::n_components) | `None` | Output dimension, `None` keeps the input dimension | `[1, D]` |
/// | [init](Self::init) | `Auto` | Initial projection | |
/// | [tolerance](Self::tolerance) | `1e-5` | Convergence tolerance of gradient norm and cost change | `[0, inf)` |
/// | [max_iter](Self::max_iter) | `50` | Maximal number of optimizer iterations | `[1, inf)` |
/// | [history_size](Self::history_size) | `10` | Number of L-BFGS correction pairs | `[1, inf)` |
/// | [random_state](Self::random_state) | `42` | Seed of the random initialization | |
///
/// # Errors
///
/// The following errors are returned by `check`, or by `fit` through the automatic check:
///
/// * [`InvalidTolerance`](NcaError::InvalidTolerance) if the tolerance is negative or not finite
/// * [`InvalidMaxIter`](NcaError::InvalidMaxIter) if `max_iter` is zero
/// * [`InvalidHistorySize`](NcaError::InvalidHistorySize) if `history_size` is zero
/// * [`InvalidComponents`](NcaError::InvalidComponents) if `n_components` is zero
///
/// # Example
///
/// ```
/// use nca::ParamGuard;
/// use nca_components::{Nca, NcaInit};
///
/// let params = Nca::<f64>::params()
///     .n_components(2)
///     .init(NcaInit::Pca)
///     .max_iter(100);
///
/// assert!(params.check().is_ok());
/// assert!(Nca::<f64>::params().max_iter(0).check().is_err());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct NcaParams<F>(pub(crate) NcaValidParams<F>);

impl<F: Float> Default for NcaParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> NcaParams<F> {
    pub fn new() -> Self {
        Self(NcaValidParams {
            n_components: None,
            init: NcaInit::Auto,
            tolerance: F::cast(1e-5),
            max_iter: 50,
            history_size: 10,
            random_state: 42,
        })
    }

    /// Set the output dimension `d` of the projection
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.0.n_components = Some(n_components);
        self
    }

    pub fn init(mut self, init: NcaInit<F>) -> Self {
        self.0.init = init;
        self
    }

    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    pub fn max_iter(mut self, max_iter: u64) -> Self {
        self.0.max_iter = max_iter;
        self
    }

    pub fn history_size(mut self, history_size: usize) -> Self {
        self.0.history_size = history_size;
        self
    }

    /// Seed of the generator used by [`NcaInit::Random`]
    pub fn random_state(mut self, random_state: u64) -> Self {
        self.0.random_state = random_state;
        self
    }
}

impl<F: Float> ParamGuard for NcaParams<F> {
    type Checked = NcaValidParams<F>;
    type Error = NcaError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !self.0.tolerance.is_finite() || self.0.tolerance < F::zero() {
            Err(NcaError::InvalidTolerance)
        } else if self.0.max_iter == 0 {
            Err(NcaError::InvalidMaxIter)
        } else if self.0.history_size == 0 {
            Err(NcaError::InvalidHistorySize)
        } else if self.0.n_components == Some(0) {
            Err(NcaError::InvalidComponents)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
