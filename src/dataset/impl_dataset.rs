use super::{AsTargets, Dataset, DatasetBase, DatasetView, Float, Label, Labels, Records};
use crate::traits::{Predict, PredictInplace};
use ndarray::{Array1, ArrayBase, ArrayView1, Axis, Data, Ix1, Ix2};
use rand::{seq::SliceRandom, Rng};

/// Implementation without constraints on records and targets
///
/// This implementation block provides a few common methods for datasets without any trait bounds
/// on records and targets.
impl<R: Records, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase { records, targets }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Updates the records of a dataset
    ///
    /// This function overwrites the records in a dataset. It also invalidates the weights and
    /// feature names.
    pub fn with_records<T2: Records>(self, records: T2) -> DatasetBase<T2, T> {
        DatasetBase {
            records,
            targets: self.targets,
        }
    }
}

impl<L, R: Records, T: AsTargets<Elem = L>> DatasetBase<R, T> {
    /// Map targets with a function `f`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = dataset.map_targets(|x| *x > 10.0);
    /// // dataset.targets() is now a binary array
    /// ```
    ///
    /// # Returns
    ///
    /// A modified dataset with new target type.
    pub fn map_targets<S, G: FnMut(&L) -> S>(self, fnc: G) -> DatasetBase<R, Array1<S>> {
        let DatasetBase {
            records, targets, ..
        } = self;

        let targets = targets.as_targets().map(fnc);

        DatasetBase { records, targets }
    }

    /// Return a view on the targets
    pub fn as_targets(&self) -> ArrayView1<L> {
        self.targets.as_targets()
    }
}

impl<L: Label, R: Records, T: AsTargets<Elem = L>> DatasetBase<R, T> {
    /// Distinct labels of the dataset, in order of their first occurrence
    pub fn labels(&self) -> Vec<L> {
        self.targets.label_set()
    }
}

impl<F: Float, L, D, S> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<S, Ix1>>
where
    D: Data<Elem = F>,
    S: Data<Elem = L>,
{
    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetView<F, L> {
        DatasetBase::new(self.records.view(), self.targets.view())
    }
}

impl<F: Float, L: Clone> Dataset<F, L> {
    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The splitting
    /// threshold is calculated with the `ratio`. For example a ratio of `0.9` allocates 90% to the
    /// first chunks and 10% to the second. This is often used in training, validation splitting
    /// procedures.
    pub fn split_with_ratio(self, ratio: f32) -> (Dataset<F, L>, Dataset<F, L>) {
        let (first, second) = self.view().split_with_ratio(ratio);

        (first.to_owned(), second.to_owned())
    }

    /// Shuffle the observations of a dataset
    ///
    /// Records and targets are permuted with the same random order.
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Dataset<F, L> {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        let records = self.records.select(Axis(0), &indices);
        let targets = self.targets.select(Axis(0), &indices);

        DatasetBase::new(records, targets)
    }
}

impl<'a, F: Float, L: Clone> DatasetView<'a, F, L> {
    /// Split dataset view into two disjoint views
    pub fn split_with_ratio(self, ratio: f32) -> (DatasetView<'a, F, L>, DatasetView<'a, F, L>) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let n = n.min(self.nsamples());

        let (records_first, records_second) = self.records.split_at(Axis(0), n);
        let (targets_first, targets_second) = self.targets.split_at(Axis(0), n);

        (
            DatasetBase::new(records_first, targets_first),
            DatasetBase::new(records_second, targets_second),
        )
    }

    /// Copy the viewed records and targets into an owned dataset
    pub fn to_owned(&self) -> Dataset<F, L> {
        DatasetBase::new(self.records.to_owned(), self.targets.to_owned())
    }
}

impl<R: Records, T> From<(R, T)> for DatasetBase<R, T> {
    fn from(rec_tar: (R, T)) -> Self {
        DatasetBase::new(rec_tar.0, rec_tar.1)
    }
}

impl<F, D: Data<Elem = F>> From<ArrayBase<D, Ix2>> for DatasetBase<ArrayBase<D, Ix2>, ()> {
    fn from(records: ArrayBase<D, Ix2>) -> Self {
        DatasetBase {
            records,
            targets: (),
        }
    }
}

impl<F: Float, D, T, O> Predict<ArrayBase<D, Ix2>, T> for O
where
    D: Data<Elem = F>,
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: ArrayBase<D, Ix2>) -> T {
        let mut targets = self.default_target(&records);
        self.predict_inplace(&records, &mut targets);
        targets
    }
}

impl<'a, F: Float, D, T, O> Predict<&'a ArrayBase<D, Ix2>, T> for O
where
    D: Data<Elem = F>,
    O: PredictInplace<ArrayBase<D, Ix2>, T>,
{
    fn predict(&self, records: &'a ArrayBase<D, Ix2>) -> T {
        let mut targets = self.default_target(records);
        self.predict_inplace(records, &mut targets);
        targets
    }
}

impl<'a, F: Float, R, T, S, O> Predict<&'a DatasetBase<R, T>, S> for O
where
    R: Records<Elem = F>,
    O: PredictInplace<R, S>,
{
    fn predict(&self, ds: &'a DatasetBase<R, T>) -> S {
        let mut targets = self.default_target(&ds.records);
        self.predict_inplace(&ds.records, &mut targets);
        targets
    }
}

impl<L: Label, T: AsTargets<Elem = L>> Labels for T {
    type Elem = L;

    fn label_set(&self) -> Vec<L> {
        let mut labels: Vec<L> = Vec::new();
        for label in self.as_targets().iter() {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }

        labels
    }
}
