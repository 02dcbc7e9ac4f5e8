use nca::{
    dataset::{AsTargets, DatasetBase, Label, Records},
    metrics::ToConfusionMatrix,
    traits::{Fit, PredictInplace},
    Float,
};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::{distance::L2Dist, hyperparams::KNeighborsValidParams, linear::LinearSearchIndex};
use crate::{NnError, Result};

/// A fitted k-nearest-neighbour classifier
///
/// The classifier memorizes its training set. A record is labelled by a majority vote among the
/// `k` training points closest to it in Euclidean distance. When several labels receive the same
/// number of votes, the label of the nearest voter among them wins.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct KNeighborsClassifier<F, L> {
    k: usize,
    records: Array2<F>,
    targets: Array1<L>,
}

impl<F: Float, L: Label, D: Data<Elem = F>, T: AsTargets<Elem = L>>
    Fit<ArrayBase<D, Ix2>, T, NnError> for KNeighborsValidParams
{
    type Object = KNeighborsClassifier<F, L>;

    /// Memorize the training set
    ///
    /// Fails if the training set is empty, has zero features, has a different number of targets
    /// than records or holds fewer points than `k`.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let records = dataset.records();
        let targets = dataset.as_targets();

        if records.nrows() == 0 {
            return Err(NnError::EmptyIndex);
        }
        LinearSearchIndex::new(records, L2Dist)?;
        if targets.len() != records.nrows() {
            return Err(nca::Error::MismatchedShapes(records.nrows(), targets.len()).into());
        }
        if self.k() > records.nrows() {
            return Err(NnError::NotEnoughPoints(self.k(), records.nrows()));
        }

        Ok(KNeighborsClassifier {
            k: self.k(),
            records: records.to_owned(),
            targets: targets.to_owned(),
        })
    }
}

impl<F: Float, L: Label + Default> KNeighborsClassifier<F, L> {
    /// Number of neighbours which vote on a label
    pub fn k(&self) -> usize {
        self.k
    }

    /// Fraction of correctly classified records of `dataset`
    pub fn score<D: Data<Elem = F>, T: AsTargets<Elem = L>>(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    ) -> Result<f32> {
        if dataset.nsamples() == 0 {
            return Err(NnError::EmptyEvaluation);
        }

        let index = LinearSearchIndex::new(&self.records, L2Dist)?;
        let predicted = dataset
            .records()
            .rows()
            .into_iter()
            .map(|row| -> Result<L> {
                let nearest = index.k_nearest(row, self.k)?;
                Ok(self.vote(nearest.into_iter().map(|(_, i)| i)))
            })
            .collect::<Result<Array1<L>>>()?;
        let cm = predicted.confusion_matrix(dataset)?;

        Ok(cm.accuracy())
    }

    fn vote(&self, positions: impl IntoIterator<Item = usize>) -> L {
        // labels in order of their nearest voter
        let mut votes: Vec<(&L, usize)> = Vec::with_capacity(self.k);
        for i in positions {
            let label = &self.targets[i];
            match votes.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => votes.push((label, 1)),
            }
        }

        votes
            .into_iter()
            .fold(None, |best: Option<(&L, usize)>, (label, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((label, n)),
            })
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    }
}

impl<F: Float, L: Label + Default, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<L>>
    for KNeighborsClassifier<F, L>
{
    /// Label every record by a vote of its `k` nearest training points
    ///
    /// Panics if the records have a different number of features than the training set.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<L>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.records.ncols(),
            "The records must have as many features as the training set."
        );

        let index = LinearSearchIndex(self.records.view(), L2Dist);
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.vote(index.nearest_positions(row, self.k));
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<L> {
        Array1::default(x.nrows())
    }
}
