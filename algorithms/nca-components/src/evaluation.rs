//! Scoring learned projections with a k-nearest-neighbour classifier
use std::fmt;

use ndarray::{Array2, ArrayBase, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use tracing::info;

use nca::{
    dataset::{AsTargets, DatasetBase, Label},
    traits::{Fit, Predict},
    ParamGuard,
};
use nca_nn::{KNeighborsParams, KNeighborsValidParams};
use nca_reduction::Pca;

use crate::error::Result;
use crate::float::Float;
use crate::hyperparams::NcaParams;

/// Held-out accuracies of k-NN on raw, NCA projected and PCA projected records
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Number of voting neighbours
    pub k: usize,
    /// Accuracy on the untransformed records
    pub baseline: f32,
    /// Accuracy after the learned NCA projection
    pub nca: f32,
    /// Accuracy after a PCA projection of the same dimension, only when the dimension is reduced
    pub pca: Option<f32>,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Simple {}NN : {:.3}", self.k, self.baseline)?;
        writeln!(f, "{}NN with NCA transformation : {:.3}", self.k, self.nca)?;
        if let Some(pca) = self.pca {
            writeln!(f, "{}NN with PCA transformation : {:.3}", self.k, pca)?;
        }

        Ok(())
    }
}

fn knn_accuracy<F, L, D1, D2, T1, T2>(
    knn: &KNeighborsValidParams,
    train: &DatasetBase<ArrayBase<D1, Ix2>, T1>,
    test: &DatasetBase<ArrayBase<D2, Ix2>, T2>,
) -> Result<f32>
where
    F: Float,
    L: Label + Default,
    D1: Data<Elem = F>,
    D2: Data<Elem = F>,
    T1: AsTargets<Elem = L>,
    T2: AsTargets<Elem = L>,
{
    let accuracy = knn.fit(train)?.score(test)?;
    Ok(accuracy)
}

/// Compare 3-NN accuracy on `test` before and after learning a projection on `train`
///
/// The NCA projection is fitted with `params`. When `params` reduce the dimension to `d`, a PCA
/// projection to `d` dimensions is scored as well.
///
/// ```
/// use nca::Dataset;
/// use nca_components::{compare, Nca};
/// use ndarray::array;
///
/// let train = Dataset::new(
///     array![[0., 0.], [0., 1.], [0.1, 0.5], [1., 0.], [1., 1.], [0.9, 0.5]],
///     array![0usize, 0, 0, 1, 1, 1],
/// );
/// let test = Dataset::new(array![[0., 0.5], [1., 0.5]], array![0usize, 1]);
///
/// let comparison = compare(&Nca::<f64>::params().max_iter(5), &train, &test)?;
/// assert_eq!(comparison.baseline, 1.0);
/// assert_eq!(comparison.pca, None);
/// # Ok::<(), nca_components::NcaError>(())
/// ```
pub fn compare<F, L, D1, D2, T1, T2>(
    params: &NcaParams<F>,
    train: &DatasetBase<ArrayBase<D1, Ix2>, T1>,
    test: &DatasetBase<ArrayBase<D2, Ix2>, T2>,
) -> Result<Comparison>
where
    F: Float,
    L: Label + Default,
    D1: Data<Elem = F>,
    D2: Data<Elem = F>,
    T1: AsTargets<Elem = L>,
    T2: AsTargets<Elem = L>,
{
    let knn = KNeighborsParams::default().check()?;
    let params = params.check_ref()?;

    let baseline = knn_accuracy(&knn, train, test)?;
    info!(k = knn.k(), accuracy = baseline, "scored raw records");

    let model = params.fit(train)?;
    let nca_train: Array2<F> = model.predict(train.records());
    let nca_test: Array2<F> = model.predict(test.records());
    let nca = knn_accuracy(
        &knn,
        &DatasetBase::new(nca_train, train.as_targets()),
        &DatasetBase::new(nca_test, test.as_targets()),
    )?;
    info!(
        k = knn.k(),
        accuracy = nca,
        n_components = model.n_components(),
        "scored NCA projection"
    );

    let nfeatures = train.records().ncols();
    let pca = match params.n_components() {
        Some(n_components) if n_components < nfeatures => {
            let pca = Pca::params(n_components)
                .check()?
                .fit(&DatasetBase::from(train.records().view()))?;
            let pca_train: Array2<F> = pca.predict(train.records());
            let pca_test: Array2<F> = pca.predict(test.records());
            let accuracy = knn_accuracy(
                &knn,
                &DatasetBase::new(pca_train, train.as_targets()),
                &DatasetBase::new(pca_test, test.as_targets()),
            )?;
            info!(k = knn.k(), accuracy, n_components, "scored PCA projection");

            Some(accuracy)
        }
        _ => None,
    };

    Ok(Comparison {
        k: knn.k(),
        baseline,
        nca,
        pca,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NcaError;
    use nca::Dataset;
    use ndarray::array;

    #[test]
    fn display_rounds_to_three_decimals() {
        let comparison = Comparison {
            k: 3,
            baseline: 0.96666,
            nca: 1.0,
            pca: Some(0.5),
        };

        assert_eq!(
            comparison.to_string(),
            "Simple 3NN : 0.967\n3NN with NCA transformation : 1.000\n3NN with PCA transformation : 0.500\n"
        );

        let without_pca = Comparison {
            pca: None,
            ..comparison
        };
        assert_eq!(
            without_pca.to_string(),
            "Simple 3NN : 0.967\n3NN with NCA transformation : 1.000\n"
        );
    }

    #[test]
    fn reduced_dimension_adds_pca_score() {
        let train = Dataset::new(
            array![
                [0., 0., 0.1],
                [0., 1., -0.1],
                [0.1, 0.5, 0.0],
                [1., 0., 0.2],
                [1., 1., -0.2],
                [0.9, 0.5, 0.1]
            ],
            array![0usize, 0, 0, 1, 1, 1],
        );
        let test = Dataset::new(array![[0., 0.5, 0.], [1., 0.5, 0.]], array![0usize, 1]);

        let comparison = compare(
            &NcaParams::new().n_components(2).max_iter(10),
            &train,
            &test,
        )
        .unwrap();

        assert_eq!(comparison.k, 3);
        assert!(comparison.pca.is_some());
        assert!((0.0..=1.0).contains(&comparison.nca));
    }

    #[test]
    fn errors_are_propagated() {
        let train = Dataset::new(array![[0., 0.], [1., 1.]], array![0usize, 1]);
        let test = Dataset::new(array![[0., 0.]], array![0usize]);

        // fewer training points than voting neighbours
        assert!(matches!(
            compare(&NcaParams::new(), &train, &test),
            Err(NcaError::NearestNeighbour(_))
        ));

        let train = Dataset::new(
            array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]],
            array![0usize, 0, 1, 1],
        );
        assert!(matches!(
            compare(&NcaParams::new().max_iter(0), &train, &test),
            Err(NcaError::InvalidMaxIter)
        ));
    }
}
