//! Gradient-based minimization of differentiable objectives
//!
//! The optimization driver only needs a scalar value and a gradient for a flat parameter vector.
//! This module defines that contract, the [`Minimize`] capability consuming it and an L-BFGS
//! implementation backed by argmin.
use std::marker::PhantomData;

use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use ndarray::{Array1, ArrayView1};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::argmin_param::ArgminParam;
use crate::error::{NcaError, Result};
use crate::float::Float;

type LbfgsSolver<F> = LBFGS<
    MoreThuenteLineSearch<ArgminParam<F>, ArgminParam<F>, F>,
    ArgminParam<F>,
    ArgminParam<F>,
    F,
>;

/// An objective with a gradient over a flat parameter vector
pub trait DifferentiableObjective<F: Float> {
    /// Returns the objective value together with its gradient at `params`
    fn value_and_gradient(&self, params: ArrayView1<F>) -> Result<(F, Array1<F>)>;

    /// Returns only the objective value at `params`
    fn value(&self, params: ArrayView1<F>) -> Result<F> {
        self.value_and_gradient(params).map(|(value, _)| value)
    }
}

/// Result of a minimization run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum<F> {
    /// Best parameters found
    pub params: Array1<F>,
    /// Objective value at `params`
    pub cost: F,
    /// Number of iterations performed
    pub iterations: u64,
    /// Why the minimizer stopped
    pub termination: String,
}

/// A minimizer of differentiable objectives
///
/// The NCA estimator runs any implementation of this trait over its objective, see
/// `Nca::fit_with_minimizer`.
pub trait Minimize<F: Float> {
    fn minimize<O: DifferentiableObjective<F>>(
        &self,
        objective: &O,
        x0: Array1<F>,
    ) -> Result<Minimum<F>>;
}

/// Limited memory BFGS with a More-Thuente line search
///
/// ```
/// use nca_components::Lbfgs;
///
/// let lbfgs = Lbfgs::default().tolerance(1e-6).max_iter(200);
/// assert_eq!(lbfgs.max_iter_count(), 200);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Lbfgs<F> {
    tolerance: F,
    max_iter: u64,
    history_size: usize,
}

impl<F: Float> Default for Lbfgs<F> {
    fn default() -> Self {
        Lbfgs::new(F::cast(1e-5), 50, 10)
    }
}

impl<F: Float> Lbfgs<F> {
    pub fn new(tolerance: F, max_iter: u64, history_size: usize) -> Self {
        Lbfgs {
            tolerance,
            max_iter,
            history_size,
        }
    }

    /// Stop once the gradient norm or the change of the cost falls below `tolerance`
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn max_iter(mut self, max_iter: u64) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Number of correction pairs kept for the inverse Hessian approximation
    pub fn history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    pub fn tolerance_value(&self) -> F {
        self.tolerance
    }

    pub fn max_iter_count(&self) -> u64 {
        self.max_iter
    }

    pub fn history_size_value(&self) -> usize {
        self.history_size
    }

    fn setup_solver(&self) -> Result<LbfgsSolver<F>> {
        if !self.tolerance.is_finite() || self.tolerance < F::zero() {
            return Err(NcaError::InvalidTolerance);
        }
        if self.history_size == 0 {
            return Err(NcaError::InvalidHistorySize);
        }

        let linesearch = MoreThuenteLineSearch::new();
        let solver = LBFGS::new(linesearch, self.history_size)
            .with_tolerance_grad(self.tolerance)?
            .with_tolerance_cost(self.tolerance)?;

        Ok(solver)
    }
}

impl<F: Float> Minimize<F> for Lbfgs<F> {
    fn minimize<O: DifferentiableObjective<F>>(
        &self,
        objective: &O,
        x0: Array1<F>,
    ) -> Result<Minimum<F>> {
        if self.max_iter == 0 {
            return Err(NcaError::InvalidMaxIter);
        }
        let solver = self.setup_solver()?;
        let problem = ArgminProblem {
            objective,
            phantom: PhantomData,
        };

        let result = Executor::new(problem, solver)
            .configure(|state| state.param(ArgminParam(x0)).max_iters(self.max_iter))
            .run()?;

        let state = result.state;
        let params = state.get_best_param().cloned().ok_or_else(|| {
            nca::Error::NotConverged("L-BFGS finished without a parameter vector".into())
        })?;
        let termination = state
            .get_termination_reason()
            .map(|reason| reason.text().to_string())
            .unwrap_or_else(|| "not terminated".to_string());

        Ok(Minimum {
            params: params.0,
            cost: state.get_best_cost(),
            iterations: state.get_iter(),
            termination,
        })
    }
}

/// Hands a differentiable objective to argmin
struct ArgminProblem<'a, F, O> {
    objective: &'a O,
    phantom: PhantomData<F>,
}

impl<'a, F: Float, O: DifferentiableObjective<F>> CostFunction for ArgminProblem<'a, F, O> {
    type Param = ArgminParam<F>;
    type Output = F;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.objective.value(p.view())?)
    }
}

impl<'a, F: Float, O: DifferentiableObjective<F>> Gradient for ArgminProblem<'a, F, O> {
    type Param = ArgminParam<F>;
    type Gradient = ArgminParam<F>;

    fn gradient(
        &self,
        p: &Self::Param,
    ) -> std::result::Result<Self::Gradient, argmin::core::Error> {
        let (_, gradient) = self.objective.value_and_gradient(p.view())?;
        Ok(ArgminParam(gradient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    /// `Σ w_i (x_i - c_i)²`
    struct Quadratic {
        center: Array1<f64>,
        weights: Array1<f64>,
    }

    impl DifferentiableObjective<f64> for Quadratic {
        fn value_and_gradient(&self, params: ArrayView1<f64>) -> Result<(f64, Array1<f64>)> {
            let diff = &params - &self.center;
            let value = (&diff * &diff * &self.weights).sum();
            let gradient = &diff * &self.weights * 2.0;

            Ok((value, gradient))
        }
    }

    #[test]
    fn lbfgs_minimizes_quadratic() {
        let objective = Quadratic {
            center: array![1.0, -2.0, 0.5],
            weights: array![1.0, 10.0, 0.5],
        };

        let minimum = Lbfgs::default()
            .tolerance(1e-10)
            .max_iter(100)
            .minimize(&objective, Array1::zeros(3))
            .unwrap();

        assert_abs_diff_eq!(minimum.params, objective.center, epsilon = 1e-3);
        assert_abs_diff_eq!(minimum.cost, 0.0, epsilon = 1e-6);
        assert!(minimum.iterations <= 100);
    }

    #[test]
    fn lbfgs_respects_iteration_cap() {
        let objective = Quadratic {
            center: array![3.0, 3.0],
            weights: array![1.0, 100.0],
        };

        let minimum = Lbfgs::default()
            .max_iter(1)
            .minimize(&objective, array![0.0, 0.0])
            .unwrap();

        assert!(minimum.iterations <= 1);
        assert!(minimum.cost < 3.0 * 3.0 + 100.0 * 3.0 * 3.0);
    }

    #[test]
    fn lbfgs_rejects_invalid_settings() {
        let objective = Quadratic {
            center: array![0.0],
            weights: array![1.0],
        };

        assert!(matches!(
            Lbfgs::default()
                .tolerance(f64::NAN)
                .minimize(&objective, array![1.0]),
            Err(NcaError::InvalidTolerance)
        ));
        assert!(matches!(
            Lbfgs::default()
                .history_size(0)
                .minimize(&objective, array![1.0]),
            Err(NcaError::InvalidHistorySize)
        ));
        assert!(matches!(
            Lbfgs::default()
                .max_iter(0)
                .minimize(&objective, array![1.0]),
            Err(NcaError::InvalidMaxIter)
        ));
    }
}
