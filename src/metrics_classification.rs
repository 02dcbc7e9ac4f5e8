//! Common metrics for performance evaluation of classifiers
//!
//! Scoring is essential for judging a learned metric. A k-nearest-neighbour classifier is scored
//! by the accuracy read off its confusion matrix.
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::{AsTargets, Label};
use crate::error::{Error, Result};

/// Return tuple of class index for each element of prediction and ground_truth
fn map_prediction_to_idx<L: Label>(
    prediction: ArrayView1<L>,
    ground_truth: ArrayView1<L>,
    classes: &[L],
) -> Vec<Option<(usize, usize)>> {
    // create a map from class label to index
    let set = classes
        .iter()
        .enumerate()
        .map(|(a, b)| (b, a))
        .collect::<HashMap<_, usize>>();

    // indices for every prediction
    prediction
        .iter()
        .zip(ground_truth.iter())
        .map(|(a, b)| set.get(&a).and_then(|x| set.get(&b).map(|y| (*x, *y))))
        .collect::<Vec<Option<_>>>()
}

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to predicted and
/// columns to target. The diagonal entries are correct predictions.
pub struct ConfusionMatrix<A> {
    matrix: Array2<usize>,
    members: Array1<A>,
}

impl<A> ConfusionMatrix<A> {
    /// Return mean accuracy
    ///
    /// The fraction of predictions which agree with the ground truth.
    pub fn accuracy(&self) -> f32 {
        self.matrix.diag().sum() as f32 / self.matrix.sum() as f32
    }

    /// Classes in the order of the matrix rows and columns
    pub fn members(&self) -> ArrayView1<A> {
        self.members.view()
    }
}

/// Print a confusion matrix
impl<A: fmt::Display> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        writeln!(f)?;
        write!(f, "{: <10}", "classes")?;
        for member in self.members.iter() {
            write!(f, " | {: <10}", member)?;
        }
        writeln!(f)?;

        for i in 0..len {
            write!(f, "{: <10}", self.members[i])?;

            for j in 0..len {
                write!(f, " | {: <10}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Classification functions
///
/// Contains only routine for Confusion Matrix, as all other current metrics can be derived from
/// the entries in the matrix.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<L: Label, S: Data<Elem = L>, T: AsTargets<Elem = L>> ToConfusionMatrix<L, T>
    for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<L>> {
        let ground_truth = ground_truth.as_targets();

        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedShapes(self.len(), ground_truth.len()));
        }
        if self.is_empty() {
            return Err(Error::NotEnoughSamples);
        }

        // classes in order of their first appearance
        let mut classes: Vec<L> = Vec::new();
        for label in ground_truth.iter().chain(self.iter()) {
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }

        // find indices to labels
        let indices = map_prediction_to_idx(self.view(), ground_truth, &classes);

        // count each index tuple in the confusion matrix
        let mut confusion_matrix = Array2::zeros((classes.len(), classes.len()));
        for (i1, i2) in indices.into_iter().flatten() {
            confusion_matrix[(i1, i2)] += 1;
        }

        Ok(ConfusionMatrix {
            matrix: confusion_matrix,
            members: Array1::from(classes),
        })
    }
}
