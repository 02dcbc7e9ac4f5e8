//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, NdFloat};
use num_traits::{FromPrimitive, NumCast};

use std::hash::Hash;
use std::iter::Sum;

mod impl_dataset;
mod impl_records;
mod impl_targets;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in records of a dataset and
/// in every matrix an algorithm of this workspace produces.
pub trait Float: NdFloat + FromPrimitive + Default + Sum {
    fn cast<T: NumCast>(x: T) -> Self {
        <Self as NumCast>::from(x).unwrap()
    }
}

impl Float for f32 {}
impl Float for f64 {}

/// Discrete labels
///
/// Labels are countable, comparable and hashable. Currently boolean (binary task), usize and
/// strings (multi-class tasks) are supported.
pub trait Label: PartialEq + Eq + Hash + Clone {}

impl Label for bool {}
impl Label for usize {}
impl Label for String {}
impl Label for &str {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and may contain targets. The dataset base is only generic over the records and targets and
/// introduces a trait bound on the records.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional array with dimensionality (nsamples), holding one class label
/// per record
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,
}

/// Dataset
///
/// The most commonly used typed of dataset. It contains a number of records stored as an
/// `Array2` and each record corresponds to a single target stored in an `Array1`.
pub type Dataset<D, T> = DatasetBase<Array2<D>, Array1<T>>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, D, T> = DatasetBase<ArrayView2<'a, D>, ArrayView1<'a, T>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Return a reference to the target variable
pub trait AsTargets {
    type Elem;

    /// Returns a view on the targets as one-dimensional array
    fn as_targets(&self) -> ArrayView1<Self::Elem>;
}

/// Get the distinct labels in the targets
pub trait Labels {
    type Elem: Label;

    /// Distinct labels in order of their first occurrence
    fn label_set(&self) -> Vec<Self::Elem>;
}
