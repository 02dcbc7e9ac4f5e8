use argmin::core::ArgminFloat;
use argmin_math::ArgminMul;

use crate::argmin_param::ArgminParam;

/// A Float trait that captures the requirements we need for the various
/// places we use floats. These are basically imposed by NdArray and Argmin.
pub trait Float:
    nca::Float + ArgminFloat + ArgminMul<ArgminParam<Self>, ArgminParam<Self>>
{
}

impl Float for f32 {}
impl Float for f64 {}
