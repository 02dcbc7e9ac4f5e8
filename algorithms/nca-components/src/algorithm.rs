use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};
use ndarray_rand::{rand_distr::StandardNormal, RandomExt};
use rand::{rngs::SmallRng, SeedableRng};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use tracing::{debug, info};

use nca::{
    dataset::{AsTargets, DatasetBase, Label},
    traits::{Fit, Predict, PredictInplace, Transformer},
    ParamGuard,
};
use nca_reduction::Pca;

use crate::error::{NcaError, Result};
use crate::float::Float;
use crate::hyperparams::{NcaInit, NcaParams, NcaValidParams};
use crate::minimize::Minimize;
use crate::objective::{NcaObjective, SameClassMask};

/// A fitted Neighbourhood Components Analysis projection
///
/// The model holds the learned `d x D` matrix `A`. Records are projected with `X Aᵀ`, either
/// through [`Predict`] on arrays or through [`Transformer`] on whole datasets, which keeps the
/// targets next to the projected records.
///
/// # Example
///
/// ```
/// use nca::traits::{Fit, Predict};
/// use nca::Dataset;
/// use nca_components::Nca;
/// use ndarray::{array, Array2};
///
/// let dataset = Dataset::new(
///     array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]],
///     array![0usize, 0, 1, 1],
/// );
///
/// let model = Nca::<f64>::params().max_iter(10).fit(&dataset)?;
/// let projected: Array2<f64> = model.predict(dataset.records());
///
/// assert_eq!(projected.dim(), (4, 2));
/// assert!(model.loss() > 0.0 && model.loss() <= 4.0);
/// # Ok::<(), nca_components::NcaError>(())
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Nca<F> {
    components: Array2<F>,
    loss: F,
    n_iter: u64,
    termination: String,
}

impl<F: Float> Nca<F> {
    /// Create the default set of hyper-parameters
    pub fn params() -> NcaParams<F> {
        NcaParams::new()
    }

    /// The learned projection matrix, one output dimension per row
    pub fn components(&self) -> &Array2<F> {
        &self.components
    }

    /// Expected number of training points whose soft neighbour shares their class
    pub fn loss(&self) -> F {
        self.loss
    }

    pub fn n_iter(&self) -> u64 {
        self.n_iter
    }

    /// Reason reported by the minimizer for stopping
    pub fn termination(&self) -> &str {
        &self.termination
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }
}

impl<F: Float, L: Label, D: Data<Elem = F>, T: AsTargets<Elem = L>>
    Fit<ArrayBase<D, Ix2>, T, NcaError> for NcaValidParams<F>
{
    type Object = Nca<F>;

    /// Learn a projection with the L-BFGS minimizer configured by these parameters
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        self.fit_with_minimizer(dataset, &self.lbfgs())
    }
}

impl<F: Float> NcaValidParams<F> {
    /// Learn a projection, running `minimizer` over the NCA objective
    ///
    /// Fails if the dataset has fewer than two records, a different number of targets than
    /// records, non-finite values or fewer features than requested components.
    pub fn fit_with_minimizer<L, D, T, M>(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
        minimizer: &M,
    ) -> Result<Nca<F>>
    where
        L: Label,
        D: Data<Elem = F>,
        T: AsTargets<Elem = L>,
        M: Minimize<F>,
    {
        let records = dataset.records();
        let targets = dataset.as_targets();
        let (nsamples, nfeatures) = records.dim();

        if targets.len() != nsamples {
            return Err(nca::Error::MismatchedShapes(nsamples, targets.len()).into());
        }
        if nsamples < 2 {
            return Err(NcaError::NotEnoughSamples(nsamples));
        }
        if records.iter().any(|x| !x.is_finite()) {
            return Err(NcaError::InvalidValues);
        }

        let n_components = self.n_components().unwrap_or(nfeatures);
        if n_components == 0 {
            return Err(NcaError::InvalidComponents);
        }
        if n_components > nfeatures {
            return Err(NcaError::ComponentsTooLarge(n_components, nfeatures));
        }

        let initial = self.initial_projection(records.view(), n_components)?;
        let mask = SameClassMask::from_labels(targets);
        let objective = NcaObjective::new(records.view(), &mask)?;

        let x0 = initial.iter().copied().collect::<Array1<F>>();
        let initial_loss = objective.loss(x0.view())?;
        debug!(
            nsamples,
            nfeatures,
            n_components,
            initial_loss = ?initial_loss,
            "fitting NCA projection"
        );

        let minimum = minimizer.minimize(&objective, x0)?;
        let components = objective.projection(minimum.params.view())?;
        if components.nrows() != n_components {
            return Err(NcaError::ParameterShape(minimum.params.len(), nfeatures));
        }
        let loss = objective.loss(minimum.params.view())?;

        info!(
            loss = ?loss,
            iterations = minimum.iterations,
            termination = %minimum.termination,
            "NCA projection fitted"
        );

        Ok(Nca {
            components,
            loss,
            n_iter: minimum.iterations,
            termination: minimum.termination,
        })
    }

    fn initial_projection(
        &self,
        records: ArrayView2<F>,
        n_components: usize,
    ) -> Result<Array2<F>> {
        let nfeatures = records.ncols();

        match self.init() {
            NcaInit::Auto if n_components < nfeatures => principal_axes(records, n_components),
            NcaInit::Auto | NcaInit::Identity => Ok(Array2::from_shape_fn(
                (n_components, nfeatures),
                |(i, j)| if i == j { F::one() } else { F::zero() },
            )),
            NcaInit::Pca => principal_axes(records, n_components),
            NcaInit::Random => {
                let mut rng = SmallRng::seed_from_u64(self.random_state());
                Ok(
                    Array2::<f64>::random_using((n_components, nfeatures), StandardNormal, &mut rng)
                        .mapv(F::cast),
                )
            }
            NcaInit::Custom(init) => {
                if init.dim() != (n_components, nfeatures) {
                    return Err(NcaError::InitShape(init.dim(), (n_components, nfeatures)));
                }
                if init.iter().any(|x| !x.is_finite()) {
                    return Err(NcaError::InvalidValues);
                }
                Ok(init.clone())
            }
        }
    }
}

/// The `n_components` leading principal axes of `records` as rows
fn principal_axes<F: Float>(records: ArrayView2<F>, n_components: usize) -> Result<Array2<F>> {
    let pca = Pca::params(n_components)
        .check()?
        .fit(&DatasetBase::from(records))?;

    Ok(pca.components().to_owned())
}

impl<F: Float> NcaParams<F> {
    /// Check the parameters and learn a projection with `minimizer`
    pub fn fit_with_minimizer<L, D, T, M>(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
        minimizer: &M,
    ) -> Result<Nca<F>>
    where
        L: Label,
        D: Data<Elem = F>,
        T: AsTargets<Elem = L>,
        M: Minimize<F>,
    {
        self.check_ref()?.fit_with_minimizer(dataset, minimizer)
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array2<F>> for Nca<F> {
    /// Project records into the learned space
    fn predict_inplace(&self, records: &ArrayBase<D, Ix2>, projected: &mut Array2<F>) {
        assert_eq!(
            records.ncols(),
            self.components.ncols(),
            "The number of features of the records must match the projection."
        );
        assert_eq!(
            projected.dim(),
            (records.nrows(), self.components.nrows()),
            "The projection target must have one row per record and one column per component."
        );

        *projected = records.dot(&self.components.t());
    }

    fn default_target(&self, records: &ArrayBase<D, Ix2>) -> Array2<F> {
        Array2::zeros((records.nrows(), self.components.nrows()))
    }
}

impl<F: Float, D: Data<Elem = F>, T>
    Transformer<DatasetBase<ArrayBase<D, Ix2>, T>, DatasetBase<Array2<F>, T>> for Nca<F>
{
    /// Replace the records of a dataset with their projection
    fn transform(&self, dataset: DatasetBase<ArrayBase<D, Ix2>, T>) -> DatasetBase<Array2<F>, T> {
        let projected = self.predict(&dataset.records);
        dataset.with_records(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimize::{DifferentiableObjective, Minimum};
    use approx::assert_abs_diff_eq;
    use nca::Dataset;
    use ndarray::{array, ArrayView1};

    fn squares() -> Dataset<f64, usize> {
        Dataset::new(
            array![
                [0., 0., 0.5],
                [0., 1., -0.5],
                [1., 0., 0.3],
                [1., 1., -0.2],
                [0.1, 0.5, 0.1]
            ],
            array![0, 0, 1, 1, 0],
        )
    }

    /// Returns the starting point after a single evaluation
    struct Untouched;

    impl Minimize<f64> for Untouched {
        fn minimize<O: DifferentiableObjective<f64>>(
            &self,
            objective: &O,
            x0: Array1<f64>,
        ) -> Result<Minimum<f64>> {
            let cost = objective.value(x0.view())?;
            Ok(Minimum {
                params: x0,
                cost,
                iterations: 0,
                termination: "untouched".into(),
            })
        }
    }

    /// Ignores the objective and returns a fixed vector
    struct Constant(Array1<f64>);

    impl Minimize<f64> for Constant {
        fn minimize<O: DifferentiableObjective<f64>>(
            &self,
            _objective: &O,
            _x0: Array1<f64>,
        ) -> Result<Minimum<f64>> {
            Ok(Minimum {
                params: self.0.clone(),
                cost: 0.0,
                iterations: 1,
                termination: "constant".into(),
            })
        }
    }

    fn initial(params: NcaParams<f64>, dataset: &Dataset<f64, usize>) -> Array2<f64> {
        params
            .fit_with_minimizer(dataset, &Untouched)
            .unwrap()
            .components()
            .clone()
    }

    #[test]
    fn identity_initialization() {
        let dataset = squares();

        let full = initial(Nca::params().init(NcaInit::Identity), &dataset);
        assert_abs_diff_eq!(full, Array2::eye(3));

        let reduced = initial(
            Nca::params().n_components(2).init(NcaInit::Identity),
            &dataset,
        );
        assert_abs_diff_eq!(reduced, array![[1., 0., 0.], [0., 1., 0.]]);

        let auto = initial(Nca::params(), &dataset);
        assert_abs_diff_eq!(auto, Array2::eye(3));
    }

    #[test]
    fn pca_initialization() {
        let dataset = squares();

        let pca = Pca::params(2).fit(&DatasetBase::from(dataset.records().view())).unwrap();
        let init = initial(Nca::params().n_components(2).init(NcaInit::Pca), &dataset);
        assert_abs_diff_eq!(init, pca.components(), epsilon = 1e-12);

        let auto = initial(Nca::params().n_components(2), &dataset);
        assert_abs_diff_eq!(auto, init, epsilon = 1e-12);
    }

    #[test]
    fn random_initialization_is_seeded() {
        let dataset = squares();
        let params = Nca::params().n_components(2).init(NcaInit::Random);

        let a = initial(params.clone(), &dataset);
        let b = initial(params.clone(), &dataset);
        let c = initial(params.random_state(7), &dataset);

        assert_eq!(a.dim(), (2, 3));
        assert_abs_diff_eq!(a, b);
        assert!(a != c);
    }

    #[test]
    fn custom_initialization() {
        let dataset = squares();
        let custom = array![[0.5, -0.5, 2.0]];

        let init = initial(
            Nca::params()
                .n_components(1)
                .init(NcaInit::Custom(custom.clone())),
            &dataset,
        );
        assert_abs_diff_eq!(init, custom);

        let wrong_shape = Nca::params()
            .init(NcaInit::Custom(custom))
            .fit_with_minimizer(&dataset, &Untouched);
        assert!(matches!(wrong_shape, Err(NcaError::InitShape((1, 3), (3, 3)))));

        let not_finite = Nca::params()
            .n_components(1)
            .init(NcaInit::Custom(array![[f64::NAN, 0., 0.]]))
            .fit_with_minimizer(&dataset, &Untouched);
        assert!(matches!(not_finite, Err(NcaError::InvalidValues)));
    }

    #[test]
    fn substituted_minimizer_is_honoured() {
        let dataset = squares();
        let params = array![2., 0., 0., 0., 0., 0.];

        let model = Nca::params()
            .n_components(2)
            .fit_with_minimizer(&dataset, &Constant(params))
            .unwrap();

        assert_abs_diff_eq!(*model.components(), array![[2., 0., 0.], [0., 0., 0.]]);
        assert_eq!(model.n_iter(), 1);
        assert_eq!(model.termination(), "constant");

        let wrong_rows = Nca::params()
            .n_components(2)
            .fit_with_minimizer(&dataset, &Constant(array![1., 0., 0.]));
        assert!(matches!(wrong_rows, Err(NcaError::ParameterShape(3, 3))));
    }

    #[test]
    fn reported_loss_belongs_to_components() {
        let dataset = squares();
        let model = Nca::params().max_iter(5).fit(&dataset).unwrap();

        let mask = SameClassMask::from_labels(dataset.targets().view());
        let objective = NcaObjective::new(dataset.records().view(), &mask).unwrap();
        let flat = model.components().iter().copied().collect::<Array1<f64>>();

        assert_abs_diff_eq!(model.loss(), objective.loss(flat.view()).unwrap(), epsilon = 1e-12);
        assert!(model.n_iter() <= 5);
    }

    #[test]
    fn invalid_datasets() {
        let single = Dataset::new(array![[0., 1.]], array![0usize]);
        assert!(matches!(
            Nca::params().fit(&single),
            Err(NcaError::NotEnoughSamples(1))
        ));

        let mismatched = DatasetBase::new(array![[0., 1.], [1., 0.]], array![0usize, 1, 1]);
        assert!(matches!(
            Nca::params().fit(&mismatched),
            Err(NcaError::BaseCrate(nca::Error::MismatchedShapes(2, 3)))
        ));

        let infinite = Dataset::new(array![[0., 1.], [f64::INFINITY, 0.]], array![0usize, 1]);
        assert!(matches!(
            Nca::params().fit(&infinite),
            Err(NcaError::InvalidValues)
        ));

        assert!(matches!(
            Nca::params().n_components(4).fit(&squares()),
            Err(NcaError::ComponentsTooLarge(4, 3))
        ));

        assert!(matches!(
            Nca::params().tolerance(-1.).fit(&squares()),
            Err(NcaError::InvalidTolerance)
        ));
    }

    #[test]
    fn projection_and_transform() {
        let model = Nca {
            components: array![[1., 0.], [1., 1.], [0., 2.]],
            loss: 0.0,
            n_iter: 0,
            termination: String::new(),
        };
        let records = array![[1., 2.], [-1., 0.5]];

        let projected: Array2<f64> = model.predict(&records);
        assert_abs_diff_eq!(projected, array![[1., 3., 4.], [-1., -0.5, 1.]]);

        let dataset = model.transform(Dataset::new(records, array!["a", "b"]));
        assert_abs_diff_eq!(dataset.records, projected);
        assert_eq!(dataset.targets, array!["a", "b"]);
    }

    #[test]
    fn value_of_untouched_start_is_the_negated_loss() {
        let dataset = squares();
        let mask = SameClassMask::from_labels(dataset.targets().view());
        let objective = NcaObjective::new(dataset.records().view(), &mask).unwrap();
        let start: ArrayView1<f64> = ArrayView1::from(&[1., 0., 0., 0., 1., 0., 0., 0., 1.]);

        let minimum = Untouched.minimize(&objective, start.to_owned()).unwrap();
        assert_abs_diff_eq!(minimum.cost, -objective.loss(start).unwrap());
    }
}
