use std::collections::BinaryHeap;

use nca::Float;
use ndarray::{ArrayBase, ArrayView2, Data, Ix2};

use crate::{distance::Distance, heap_elem::HeapElem, NnError, Point, Result};

/// Linear search, the simplest nearest neighbour index. Every query scans through all stored
/// points, so all of them are `O(N)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSearchIndex<'a, F: Float, D: Distance<F>>(
    pub(crate) ArrayView2<'a, F>,
    pub(crate) D,
);

impl<'a, F: Float, D: Distance<F>> LinearSearchIndex<'a, F, D> {
    /// Creates a new `LinearSearchIndex`
    pub fn new<DT: Data<Elem = F>>(batch: &'a ArrayBase<DT, Ix2>, dist_fn: D) -> Result<Self> {
        if batch.ncols() == 0 {
            Err(NnError::ZeroDimension)
        } else {
            Ok(Self(batch.view(), dist_fn))
        }
    }

    /// Positions of the `k` nearest rows, without checking the dimension of `point`
    pub(crate) fn nearest_positions(&self, point: Point<F>, k: usize) -> Vec<usize> {
        // bounded max-heap, the root is the worst of the current candidates
        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (i, pt) in self.0.rows().into_iter().enumerate() {
            heap.push(HeapElem::new(self.1.rdistance(point.reborrow(), pt), i));
            if heap.len() > k {
                heap.pop();
            }
        }

        heap.into_sorted_vec().into_iter().map(|e| e.elem).collect()
    }

    /// Query the `k` nearest points to `point`, together with their row position in the batch.
    /// The points are returned in order of increasing distance, equally distant points in order
    /// of their position. Returns an error if the query has the wrong dimension.
    #[allow(clippy::type_complexity)]
    pub fn k_nearest<'b>(
        &self,
        point: Point<'b, F>,
        k: usize,
    ) -> Result<Vec<(Point<F>, usize)>> {
        if self.0.ncols() != point.len() {
            return Err(NnError::WrongDimension(point.len(), self.0.ncols()));
        }

        Ok(self
            .nearest_positions(point, k)
            .into_iter()
            .map(|i| (self.0.row(i), i))
            .collect())
    }
}
