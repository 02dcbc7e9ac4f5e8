use nca::Float;
use ndarray::{Array2, ArrayView2, Axis, Zip};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::Point;

/// A distance function that can be used in spatial algorithms such as nearest neighbour.
pub trait Distance<F: Float>: Clone + Send + Sync {
    /// Computes the distance between two points. For most spatial algorithms to work correctly,
    /// **this metric must satisfy the Triangle Inequality**.
    ///
    /// Panics if the points have different dimensions.
    fn distance(&self, a: Point<F>, b: Point<F>) -> F;

    /// A faster version of the distance metric that keeps the order of the distance function.
    /// That is, `dist(a, b) > dist(c, d)` implies `rdist(a, b) > rdist(c, d)`.
    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        self.distance(a, b)
    }

    /// Converts the result of `rdistance` to `distance`
    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist
    }

    /// Converts the result of `distance` to `rdistance`
    fn dist_to_rdist(&self, dist: F) -> F {
        dist
    }
}

/// L2 or [Euclidean](https://en.wikipedia.org/wiki/Euclidean_distance) distance. Its reduced
/// distance is the squared Euclidean distance.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct L2Dist;

impl<F: Float> Distance<F> for L2Dist {
    #[inline]
    fn distance(&self, a: Point<F>, b: Point<F>) -> F {
        self.rdistance(a, b).sqrt()
    }

    #[inline]
    fn rdistance(&self, a: Point<F>, b: Point<F>) -> F {
        Zip::from(&a).and(&b).fold(F::zero(), |acc, &a, &b| {
            let diff = a - b;
            acc + diff * diff
        })
    }

    #[inline]
    fn rdist_to_dist(&self, rdist: F) -> F {
        rdist.sqrt()
    }

    #[inline]
    fn dist_to_rdist(&self, dist: F) -> F {
        dist * dist
    }
}

/// Computes the matrix of pairwise distances between all rows of a point set.
///
/// Implementations return an `N x N` matrix with a zero diagonal.
pub trait DistanceMatrix<F: Float> {
    fn distance_matrix(&self, points: ArrayView2<F>) -> Array2<F>;
}

/// Squared Euclidean distances computed from the Gram matrix of the points.
///
/// `‖a - b‖² = ‖a‖² + ‖b‖² - 2 a·b` on the points centred at their mean. Distances do not change
/// under translation, and centring keeps the expansion from cancelling on records far from the
/// origin. Entries which still cancel below zero are clamped.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SqEuclideanMatrix;

impl<F: Float> DistanceMatrix<F> for SqEuclideanMatrix {
    fn distance_matrix(&self, points: ArrayView2<F>) -> Array2<F> {
        let centred = match points.mean_axis(Axis(0)) {
            Some(mean) => &points - &mean,
            None => points.to_owned(),
        };
        let sq_norms = centred.map_axis(Axis(1), |row| row.dot(&row));
        let mut dist = centred.dot(&centred.t());

        Zip::indexed(&mut dist).for_each(|(i, j), d| {
            *d = if i == j {
                F::zero()
            } else {
                (sq_norms[i] + sq_norms[j] - F::cast(2.) * *d).max(F::zero())
            };
        });

        dist
    }
}

/// Pairwise reduced distances of an arbitrary [`Distance`](trait.Distance.html), evaluated
/// point by point.
///
/// With [`L2Dist`](struct.L2Dist.html) this yields squared Euclidean distances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pairwise<D>(pub D);

impl<F: Float, D: Distance<F>> DistanceMatrix<F> for Pairwise<D> {
    fn distance_matrix(&self, points: ArrayView2<F>) -> Array2<F> {
        let n = points.nrows();
        let mut dist = Array2::zeros((n, n));

        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.0.rdistance(points.row(i), points.row(j));
                dist[(i, j)] = d;
                dist[(j, i)] = d;
            }
        }

        dist
    }
}
