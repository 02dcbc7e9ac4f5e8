use super::{AsTargets, DatasetBase, Records};
use ndarray::{ArrayBase, ArrayView1, Data, Ix1};

/// A NdArray can act as targets
impl<L, S: Data<Elem = L>> AsTargets for ArrayBase<S, Ix1> {
    type Elem = L;

    fn as_targets(&self) -> ArrayView1<L> {
        self.view()
    }
}

/// The targets of a dataset
impl<L, R: Records, T: AsTargets<Elem = L>> AsTargets for DatasetBase<R, T> {
    type Elem = L;

    fn as_targets(&self) -> ArrayView1<L> {
        self.targets.as_targets()
    }
}

impl<T: AsTargets> AsTargets for &T {
    type Elem = T::Elem;

    fn as_targets(&self) -> ArrayView1<Self::Elem> {
        (*self).as_targets()
    }
}
