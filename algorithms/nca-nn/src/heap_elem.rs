use std::cmp::Ordering;

use nca::Float;
use noisy_float::{checkers::NumChecker, NoisyFloat};

/// Candidate of a neighbour query, ordered by distance first and position second
pub(crate) struct HeapElem<F: Float> {
    pub(crate) dist: NoisyFloat<F, NumChecker>,
    pub(crate) elem: usize,
}

impl<F: Float> HeapElem<F> {
    /// NaN distances are ranked behind every other candidate
    pub(crate) fn new(dist: F, elem: usize) -> Self {
        let dist = if dist.is_nan() { F::infinity() } else { dist };

        Self {
            dist: NoisyFloat::new(dist),
            elem,
        }
    }
}

impl<F: Float> PartialEq for HeapElem<F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<F: Float> Eq for HeapElem<F> {}

impl<F: Float> PartialOrd for HeapElem<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Float> Ord for HeapElem<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .cmp(&other.dist)
            .then_with(|| self.elem.cmp(&other.elem))
    }
}
