//! Utility functions for randomly generating datasets

use nca::Dataset;
use ndarray::{s, Array, Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, StandardNormal, Uniform},
    RandomExt,
};

/// Special case of `blobs_with_distribution` with a standard normal distribution.
pub fn blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    blobs_with_distribution(blob_size, blob_centroids, StandardNormal, rng)
}

/// Given an input matrix `blob_centroids`, with shape `(n_blobs, n_features)`,
/// generate `blob_size` data points (a "blob") around each of the blob centroids.
///
/// More specifically, each blob is formed by `blob_size` points sampled from a distribution
/// centered in the blob centroid. The points of the blobs are stored consecutively, in the
/// order of the centroids.
pub fn blobs_with_distribution(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    distribution: impl Distribution<f64> + Clone,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let (n_centroids, n_features) = blob_centroids.dim();
    let mut blobs: Array2<f64> = Array2::zeros((n_centroids * blob_size, n_features));

    for (blob_index, blob_centroid) in blob_centroids.rows().into_iter().enumerate() {
        let blob = make_blob(blob_size, &blob_centroid, distribution.clone(), rng);

        let indexes = s![blob_index * blob_size..(blob_index + 1) * blob_size, ..];
        blobs.slice_mut(indexes).assign(&blob);
    }
    blobs
}

/// Generate `blob_size` data points (a "blob") around `blob_centroid` using the given distribution.
fn make_blob(
    blob_size: usize,
    blob_centroid: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    distribution: impl Distribution<f64>,
    rng: &mut impl Rng,
) -> Array2<f64> {
    let shape = (blob_size, blob_centroid.len());
    let origin_blob: Array2<f64> = Array::random_using(shape, distribution, rng);
    origin_blob + blob_centroid
}

/// Standard normal blobs around `blob_centroids`, every point labelled with the row index of
/// its centroid.
pub fn labelled_blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    rng: &mut impl Rng,
) -> Dataset<f64, usize> {
    let records = blobs(blob_size, blob_centroids, rng);
    let targets = (0..blob_centroids.nrows())
        .flat_map(|label| std::iter::repeat(label).take(blob_size))
        .collect::<Array1<_>>();

    Dataset::new(records, targets)
}

/// Labelled blobs with `n_noise` additional features drawn uniformly from
/// `[-noise_scale, noise_scale]`.
///
/// The extra features carry no class information. When `noise_scale` is large compared to the
/// spread of the centroids, they dominate Euclidean distances and degrade a nearest neighbour
/// classifier on the raw features.
pub fn noisy_blobs(
    blob_size: usize,
    blob_centroids: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    n_noise: usize,
    noise_scale: f64,
    rng: &mut impl Rng,
) -> Dataset<f64, usize> {
    let dataset = labelled_blobs(blob_size, blob_centroids, rng);
    let (n_samples, n_features) = dataset.records().dim();

    let mut records = Array2::zeros((n_samples, n_features + n_noise));
    records
        .slice_mut(s![.., ..n_features])
        .assign(dataset.records());
    records
        .slice_mut(s![.., n_features..])
        .assign(&Array2::random_using(
            (n_samples, n_noise),
            Uniform::new_inclusive(-noise_scale, noise_scale),
            rng,
        ));

    dataset.with_records(records)
}
