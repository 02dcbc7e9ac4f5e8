//! The NCA objective
//!
//! For a projection `A` (`d x D`) and training records `X` (`N x D`) the records are embedded
//! with `Y = X Aᵀ`. Every point picks a neighbour `j` with probability `p_ij`, the softmax of the
//! negative squared distances in the embedding, never choosing itself. The objective is the
//! expected number of points whose neighbour shares their class,
//!
//! ```text
//! loss = Σ_i Σ_j p_ij [label_i == label_j]
//! ```
//!
//! which lies in `[0, N]`. Minimizers receive the negated loss and gradient.
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};
use tracing::trace;

use nca_nn::distance::{DistanceMatrix, SqEuclideanMatrix};

use crate::error::{NcaError, Result};
use crate::float::Float;
use crate::minimize::DifferentiableObjective;

/// Label equality between all pairs of training points
///
/// The mask is square, symmetric and has a true diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct SameClassMask(Array2<bool>);

impl SameClassMask {
    /// Build the mask `mask[i][j] = labels[i] == labels[j]`
    pub fn from_labels<L: PartialEq>(labels: ArrayView1<L>) -> Self {
        let n = labels.len();
        let mask = Array2::from_shape_fn((n, n), |(i, j)| labels[i] == labels[j]);

        SameClassMask(mask)
    }

    /// Use an explicit mask, checking that it is square, symmetric and has a true diagonal
    pub fn from_mask(mask: Array2<bool>) -> Result<Self> {
        let (nrows, ncols) = mask.dim();
        if nrows != ncols {
            return Err(NcaError::MaskShape((nrows, ncols), nrows));
        }
        if mask.diag().iter().any(|x| !x) || mask != mask.t() {
            return Err(NcaError::InvalidMask);
        }

        Ok(SameClassMask(mask))
    }

    /// Number of points covered by the mask
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.0
    }
}

/// Row-wise softmax of the negated distances, with every point excluded from its own row
fn soft_assignments<F: Float>(mut distances: Array2<F>) -> Array2<F> {
    distances.diag_mut().fill(F::infinity());

    for mut row in distances.rows_mut() {
        let max = row
            .iter()
            .fold(F::neg_infinity(), |max, &dist| F::max(max, -dist));
        row.mapv_inplace(|dist| (-dist - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }

    distances
}

/// Soft neighbour probabilities `p_ij` of embedded points
///
/// Each row sums to one and the diagonal is zero. At least two points are needed for the rows to
/// be well defined.
pub fn soft_neighbour_probabilities<F: Float, D: Data<Elem = F>>(
    embedded: &ArrayBase<D, Ix2>,
) -> Array2<F> {
    soft_assignments(SqEuclideanMatrix.distance_matrix(embedded.view()))
}

/// Loss and gradient of NCA for a fixed training set
///
/// The objective borrows the training records and keeps the same-class mask as float weights.
/// Parameters are passed as the flattened, row-major projection matrix.
///
/// ```
/// use nca_components::{NcaObjective, SameClassMask};
/// use ndarray::array;
///
/// let records = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
/// let labels = array![0, 0, 1, 1];
/// let mask = SameClassMask::from_labels(labels.view());
///
/// let objective = NcaObjective::new(records.view(), &mask).unwrap();
/// let (neg_loss, neg_grad) = objective.value_and_gradient(array![1., 0., 0., 1.].view()).unwrap();
///
/// assert!(neg_loss <= 0.0 && neg_loss >= -4.0);
/// assert_eq!(neg_grad.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct NcaObjective<'a, F, M = SqEuclideanMatrix> {
    records: ArrayView2<'a, F>,
    mask: Array2<F>,
    distances: M,
}

impl<'a, F: Float> NcaObjective<'a, F> {
    pub fn new(records: ArrayView2<'a, F>, mask: &SameClassMask) -> Result<Self> {
        Self::with_distances(records, mask, SqEuclideanMatrix)
    }
}

impl<'a, F: Float, M: DistanceMatrix<F>> NcaObjective<'a, F, M> {
    /// Create an objective computing squared distances with `distances`
    pub fn with_distances(
        records: ArrayView2<'a, F>,
        mask: &SameClassMask,
        distances: M,
    ) -> Result<Self> {
        let nsamples = records.nrows();
        if nsamples < 2 {
            return Err(NcaError::NotEnoughSamples(nsamples));
        }
        if mask.len() != nsamples {
            return Err(NcaError::MaskShape(mask.as_array().dim(), nsamples));
        }

        let mask = mask
            .as_array()
            .mapv(|same| if same { F::one() } else { F::zero() });

        Ok(NcaObjective {
            records,
            mask,
            distances,
        })
    }

    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    pub fn nfeatures(&self) -> usize {
        self.records.ncols()
    }

    /// Reshape flat parameters into the `d x D` projection matrix
    pub fn projection(&self, params: ArrayView1<F>) -> Result<Array2<F>> {
        let nfeatures = self.nfeatures();
        let len = params.len();
        if nfeatures == 0 || len == 0 || len % nfeatures != 0 {
            return Err(NcaError::ParameterShape(len, nfeatures));
        }

        let projection = params.to_owned().into_shape((len / nfeatures, nfeatures))?;
        Ok(projection)
    }

    fn probabilities(&self, embedded: ArrayView2<F>) -> Array2<F> {
        soft_assignments(self.distances.distance_matrix(embedded))
    }

    /// Expected number of correctly classified points, in `[0, N]`
    pub fn loss(&self, params: ArrayView1<F>) -> Result<F> {
        let projection = self.projection(params)?;
        let embedded = self.records.dot(&projection.t());
        let p_ij = self.probabilities(embedded.view());

        Ok((&p_ij * &self.mask).sum())
    }

    /// Negated loss and negated gradient with respect to the flat parameters
    pub fn value_and_gradient(&self, params: ArrayView1<F>) -> Result<(F, Array1<F>)> {
        let projection = self.projection(params)?;
        let embedded = self.records.dot(&projection.t());
        let p_ij = self.probabilities(embedded.view());

        let masked = &p_ij * &self.mask;
        let p = masked.sum_axis(Axis(1));
        let loss = p.sum();

        let weighted = &masked - &(&p_ij * &p.insert_axis(Axis(1)));
        let mut sym = &weighted + &weighted.t();
        let col_sums = weighted.sum_axis(Axis(0));
        sym.diag_mut()
            .iter_mut()
            .zip(col_sums.iter())
            .for_each(|(d, s)| *d = -*s);

        let gradient = embedded.t().dot(&sym).dot(&self.records) * F::cast(2.);
        trace!(
            loss = ?loss,
            components = projection.nrows(),
            "evaluated NCA objective"
        );

        Ok((-loss, gradient.iter().map(|x| -*x).collect()))
    }
}

impl<'a, F: Float, M: DistanceMatrix<F>> DifferentiableObjective<F> for NcaObjective<'a, F, M> {
    fn value_and_gradient(&self, params: ArrayView1<F>) -> Result<(F, Array1<F>)> {
        NcaObjective::value_and_gradient(self, params)
    }

    fn value(&self, params: ArrayView1<F>) -> Result<F> {
        self.loss(params).map(|loss| -loss)
    }
}

/// Negated NCA loss and gradient for flat parameters, training records and a same-class mask
pub fn nca_objective<F: Float>(
    params: ArrayView1<F>,
    records: ArrayView2<F>,
    mask: &SameClassMask,
) -> Result<(F, Array1<F>)> {
    NcaObjective::new(records, mask)?.value_and_gradient(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nca_nn::distance::{L2Dist, Pairwise};
    use ndarray::{array, Array};
    use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};
    use rand::rngs::SmallRng;

    fn random_problem(rng: &mut SmallRng) -> (Array1<f64>, Array2<f64>, SameClassMask) {
        let params = Array::random_using(12, Uniform::new(-1., 1.), rng);
        let records = Array::random_using((10, 4), Uniform::new(-1., 1.), rng);
        let labels = Array1::from_shape_fn(10, |i| i % 3);

        (params, records, SameClassMask::from_labels(labels.view()))
    }

    #[test]
    fn loss_is_bounded_by_number_of_points() {
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            let (params, records, mask) = random_problem(&mut rng);
            let objective = NcaObjective::new(records.view(), &mask).unwrap();

            let loss = objective.loss(params.view()).unwrap();
            assert!((0.0..=10.0).contains(&loss));

            let (neg_loss, gradient) = objective.value_and_gradient(params.view()).unwrap();
            assert_abs_diff_eq!(neg_loss, -loss, epsilon = 1e-12);
            assert_eq!(gradient.len(), 12);
        }
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let mut rng = SmallRng::seed_from_u64(42);
        let (params, records, mask) = random_problem(&mut rng);
        let objective = NcaObjective::new(records.view(), &mask).unwrap();

        let (_, gradient) = objective.value_and_gradient(params.view()).unwrap();

        let h = 1e-6;
        let numeric = Array1::from_shape_fn(params.len(), |k| {
            let mut plus = params.clone();
            let mut minus = params.clone();
            plus[k] += h;
            minus[k] -= h;

            let plus = objective.value(plus.view()).unwrap();
            let minus = objective.value(minus.view()).unwrap();
            (plus - minus) / (2. * h)
        });

        let error = (&gradient - &numeric).mapv(|x| x * x).sum().sqrt();
        let norm = numeric.mapv(|x| x * x).sum().sqrt();
        assert!(error / norm < 1e-4, "relative error {}", error / norm);
    }

    #[test]
    fn probabilities_are_row_stochastic() {
        let mut rng = SmallRng::seed_from_u64(3);
        let embedded: Array2<f64> = Array::random_using((8, 3), Uniform::new(-5., 5.), &mut rng);

        let p_ij = soft_neighbour_probabilities(&embedded);

        assert!(p_ij.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(p_ij.diag(), Array1::zeros(8));
        assert_abs_diff_eq!(p_ij.sum_axis(Axis(1)), Array1::ones(8), epsilon = 1e-12);
    }

    #[test]
    fn far_apart_points_do_not_overflow() {
        let embedded = array![[0.0f64, 0.0], [1e3, 0.0], [1e3, 10.0]];
        let p_ij = soft_neighbour_probabilities(&embedded);

        assert!(p_ij.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(p_ij[(0, 1)], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p_ij[(1, 2)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn mask_extremes_bound_the_loss() {
        let mut rng = SmallRng::seed_from_u64(42);
        let (params, records, _) = random_problem(&mut rng);

        let only_self =
            SameClassMask::from_mask(Array2::from_shape_fn((10, 10), |(i, j)| i == j)).unwrap();
        let loss = NcaObjective::new(records.view(), &only_self)
            .unwrap()
            .loss(params.view())
            .unwrap();
        assert_abs_diff_eq!(loss, 0.0);

        let everyone = SameClassMask::from_mask(Array2::from_elem((10, 10), true)).unwrap();
        let loss = NcaObjective::new(records.view(), &everyone)
            .unwrap()
            .loss(params.view())
            .unwrap();
        assert_abs_diff_eq!(loss, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn wrong_parameter_length_is_an_error() {
        let records = array![[0., 0., 1.], [1., 1., 0.], [2., 0., 1.]];
        let mask = SameClassMask::from_labels(array![0, 1, 0].view());
        let objective = NcaObjective::new(records.view(), &mask).unwrap();

        assert!(matches!(
            objective.value_and_gradient(array![1., 0., 0., 1.].view()),
            Err(NcaError::ParameterShape(4, 3))
        ));
        assert!(matches!(
            objective.loss(Array1::zeros(0).view()),
            Err(NcaError::ParameterShape(0, 3))
        ));
        assert_eq!(objective.projection(Array1::zeros(6).view()).unwrap().dim(), (2, 3));
    }

    #[test]
    fn objective_checks_samples_and_mask() {
        let records = array![[0., 1.]];
        let mask = SameClassMask::from_labels(array![0].view());
        assert!(matches!(
            NcaObjective::new(records.view(), &mask),
            Err(NcaError::NotEnoughSamples(1))
        ));

        let records = array![[0., 1.], [1., 0.], [1., 1.]];
        let mask = SameClassMask::from_labels(array![0, 1].view());
        assert!(matches!(
            NcaObjective::new(records.view(), &mask),
            Err(NcaError::MaskShape((2, 2), 3))
        ));
    }

    #[test]
    fn explicit_masks_are_validated() {
        assert!(matches!(
            SameClassMask::from_mask(Array2::from_elem((2, 3), true)),
            Err(NcaError::MaskShape((2, 3), 2))
        ));
        assert!(matches!(
            SameClassMask::from_mask(array![[true, true], [false, true]]),
            Err(NcaError::InvalidMask)
        ));
        assert!(matches!(
            SameClassMask::from_mask(array![[false, true], [true, true]]),
            Err(NcaError::InvalidMask)
        ));

        let mask = SameClassMask::from_labels(array!["a", "b", "a"].view());
        assert_eq!(
            mask.as_array(),
            &array![[true, false, true], [false, true, false], [true, false, true]]
        );
        assert_eq!(SameClassMask::from_mask(mask.as_array().clone()).unwrap(), mask);
    }

    #[test]
    fn distance_implementations_agree() {
        let mut rng = SmallRng::seed_from_u64(7);
        let (params, records, mask) = random_problem(&mut rng);

        let gram = NcaObjective::new(records.view(), &mask).unwrap();
        let pairwise =
            NcaObjective::with_distances(records.view(), &mask, Pairwise(L2Dist)).unwrap();

        let (loss_a, grad_a) = gram.value_and_gradient(params.view()).unwrap();
        let (loss_b, grad_b) = pairwise.value_and_gradient(params.view()).unwrap();

        assert_abs_diff_eq!(loss_a, loss_b, epsilon = 1e-10);
        assert_abs_diff_eq!(grad_a, grad_b, epsilon = 1e-8);
    }

    #[test]
    fn single_precision_loss_ignores_offset() {
        let records = array![
            [0.0f32, 0.0],
            [0.3, 0.8],
            [0.1, 0.4],
            [1.0, 0.1],
            [1.2, 0.9],
            [0.8, 0.5]
        ];
        let mask = SameClassMask::from_labels(array![0usize, 0, 0, 1, 1, 1].view());
        let identity = array![1.0f32, 0., 0., 1.];

        let reference = NcaObjective::new(records.view(), &mask)
            .unwrap()
            .loss(identity.view())
            .unwrap();

        for offset in [1000.0f32, 3000.0] {
            let shifted = records.mapv(|x| x + offset);
            let gram = NcaObjective::new(shifted.view(), &mask).unwrap();
            let pairwise =
                NcaObjective::with_distances(shifted.view(), &mask, Pairwise(L2Dist)).unwrap();

            assert_abs_diff_eq!(gram.loss(identity.view()).unwrap(), reference, epsilon = 1e-2);
            assert_abs_diff_eq!(
                gram.loss(identity.view()).unwrap(),
                pairwise.loss(identity.view()).unwrap(),
                epsilon = 1e-2
            );
        }
    }

    #[test]
    fn free_function_matches_objective() {
        let records = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
        let mask = SameClassMask::from_labels(array![0, 0, 1, 1].view());
        let params = array![1., 0., 0., 1.];

        let (loss, gradient) = nca_objective(params.view(), records.view(), &mask).unwrap();
        let objective = NcaObjective::new(records.view(), &mask).unwrap();

        assert_abs_diff_eq!(loss, -objective.loss(params.view()).unwrap());
        assert_eq!(gradient.len(), 4);
    }
}
