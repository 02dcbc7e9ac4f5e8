//! This module defines a newtype for ndarray's Array1.
//!
//! The flattened projection matrix is handed to argmin as this newtype, so that the optimizer can
//! stay generic over the float type (f32 and f64) without relying on argmin's own ndarray
//! backend. This requires that we implement the vector arithmetic of argmin ourselves.

use crate::float::Float;
use argmin_math::{
    ArgminAdd, ArgminDot, ArgminL1Norm, ArgminL2Norm, ArgminMinMax, ArgminMul, ArgminSignum,
    ArgminSub, ArgminZeroLike,
};
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix1, Zip};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

pub fn elem_dot<F: nca::Float, A1: Data<Elem = F>, A2: Data<Elem = F>>(
    a: &ArrayBase<A1, Ix1>,
    b: &ArrayBase<A2, Ix1>,
) -> F {
    Zip::from(a)
        .and(b)
        .fold(F::zero(), |acc, &a, &b| acc + a * b)
}

fn elementwise<F: Float>(x: &Array1<F>, y: &Array1<F>, pick: impl Fn(F, F) -> F) -> Array1<F> {
    assert_eq!(x.len(), y.len());
    Zip::from(x).and(y).map_collect(|&a, &b| pick(a, b))
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ArgminParam<F>(pub Array1<F>);

impl<F> ArgminParam<F> {
    #[inline]
    pub fn as_array(&self) -> &Array1<F> {
        &self.0
    }

    #[inline]
    pub fn view(&self) -> ArrayView1<F> {
        self.0.view()
    }
}

impl<F: Float> ArgminSub<F, ArgminParam<F>> for ArgminParam<F> {
    fn sub(&self, other: &F) -> ArgminParam<F> {
        ArgminParam(&self.0 - *other)
    }
}

impl<F: Float> ArgminSub<ArgminParam<F>, ArgminParam<F>> for ArgminParam<F> {
    fn sub(&self, other: &ArgminParam<F>) -> ArgminParam<F> {
        ArgminParam(&self.0 - &other.0)
    }
}

impl<F: Float> ArgminAdd<F, ArgminParam<F>> for ArgminParam<F> {
    fn add(&self, other: &F) -> ArgminParam<F> {
        ArgminParam(&self.0 + *other)
    }
}

impl<F: Float> ArgminAdd<ArgminParam<F>, ArgminParam<F>> for ArgminParam<F> {
    fn add(&self, other: &ArgminParam<F>) -> ArgminParam<F> {
        ArgminParam(&self.0 + &other.0)
    }
}

impl<F: Float> ArgminDot<ArgminParam<F>, F> for ArgminParam<F> {
    fn dot(&self, other: &ArgminParam<F>) -> F {
        elem_dot(&self.0, &other.0)
    }
}

impl<F: Float> ArgminL1Norm<F> for ArgminParam<F> {
    fn l1_norm(&self) -> F {
        self.0.iter().fold(F::zero(), |acc, &x| acc + x.abs())
    }
}

impl<F: Float> ArgminL2Norm<F> for ArgminParam<F> {
    fn l2_norm(&self) -> F {
        elem_dot(&self.0, &self.0).sqrt()
    }
}

impl<F: Float> ArgminMul<F, ArgminParam<F>> for ArgminParam<F> {
    fn mul(&self, other: &F) -> ArgminParam<F> {
        ArgminParam(&self.0 * *other)
    }
}

impl<F: Float> ArgminMul<ArgminParam<F>, ArgminParam<F>> for ArgminParam<F> {
    fn mul(&self, other: &ArgminParam<F>) -> ArgminParam<F> {
        ArgminParam(&self.0 * &other.0)
    }
}

// Scaling from the left. argmin-math derives `ArgminScaledAdd` from these, and the orphan rule
// only admits them for concrete float types.
impl ArgminMul<ArgminParam<f64>, ArgminParam<f64>> for f64 {
    fn mul(&self, other: &ArgminParam<f64>) -> ArgminParam<f64> {
        ArgminParam(&other.0 * *self)
    }
}

impl ArgminMul<ArgminParam<f32>, ArgminParam<f32>> for f32 {
    fn mul(&self, other: &ArgminParam<f32>) -> ArgminParam<f32> {
        ArgminParam(&other.0 * *self)
    }
}

impl<F: Float> ArgminSignum for ArgminParam<F> {
    fn signum(mut self) -> ArgminParam<F> {
        self.0.mapv_inplace(|x| x.signum());
        self
    }
}

impl<F: Float> ArgminZeroLike for ArgminParam<F> {
    fn zero_like(&self) -> ArgminParam<F> {
        ArgminParam(Array1::zeros(self.0.len()))
    }
}

impl<F: Float> ArgminMinMax for ArgminParam<F> {
    fn min(x: &Self, y: &Self) -> ArgminParam<F> {
        ArgminParam(elementwise(&x.0, &y.0, |a, b| if a < b { a } else { b }))
    }

    fn max(x: &Self, y: &Self) -> ArgminParam<F> {
        ArgminParam(elementwise(&x.0, &y.0, |a, b| if a > b { a } else { b }))
    }
}
