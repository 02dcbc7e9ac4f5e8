use nca::ParamGuard;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::NnError;

/// The set of hyperparameters that can be specified for the fitting of a
/// [k-nearest-neighbour classifier](struct.KNeighborsClassifier.html).
///
/// ### Example
///
/// ```rust
/// use nca::ParamGuard;
/// use nca_nn::KNeighborsParams;
///
/// let params = KNeighborsParams::default().check().unwrap();
/// assert_eq!(params.k(), 3);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KNeighborsValidParams {
    k: usize,
}

impl KNeighborsValidParams {
    /// Number of neighbours which vote on a label
    pub fn k(&self) -> usize {
        self.k
    }
}

/// Unchecked hyperparameters of the k-nearest-neighbour classifier
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KNeighborsParams(KNeighborsValidParams);

impl KNeighborsParams {
    /// Create hyperparameters which vote among the `k` nearest training points
    pub fn new(k: usize) -> Self {
        Self(KNeighborsValidParams { k })
    }

    /// Set the number of voting neighbours
    pub fn k(mut self, k: usize) -> Self {
        self.0.k = k;
        self
    }
}

impl Default for KNeighborsParams {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ParamGuard for KNeighborsParams {
    type Checked = KNeighborsValidParams;
    type Error = NnError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.k == 0 {
            Err(NnError::InvalidK(self.0.k))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
