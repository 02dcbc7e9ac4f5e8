use approx::assert_abs_diff_eq;
use ndarray::{arr1, arr2, aview1, stack, Array2, ArrayView1, Axis};
use ndarray_rand::{rand::SeedableRng, rand_distr::Uniform, RandomExt};
use rand_xoshiro::Xoshiro256Plus;

use nca::prelude::*;
use nca_nn::{
    distance::{DistanceMatrix, L2Dist, Pairwise, SqEuclideanMatrix},
    KNeighborsParams, LinearSearchIndex,
};

fn assert_query(
    output: Vec<(ArrayView1<f64>, usize)>,
    input_data: &Array2<f64>,
    exp_pos: Vec<usize>,
) {
    let (pts, pos): (Vec<_>, Vec<_>) = output.into_iter().unzip();
    assert_eq!(pos, exp_pos);
    assert_abs_diff_eq!(
        stack(Axis(0), &pts).unwrap(),
        input_data.select(Axis(0), &exp_pos)
    );
}

#[test]
fn linear_search_empty() {
    let points = Array2::zeros((0, 2));
    let nn = LinearSearchIndex::new(&points, L2Dist).unwrap();

    let out = nn.k_nearest(aview1(&[0.0, 1.0]), 2).unwrap();
    assert_eq!(out, Vec::<_>::new());
}

#[test]
fn linear_search_error() {
    let points = Array2::<f64>::zeros((4, 0));
    assert!(LinearSearchIndex::new(&points, L2Dist).is_err());

    let points = arr2(&[[0.0, 2.0]]);
    let nn = LinearSearchIndex::new(&points, L2Dist).unwrap();
    assert!(nn.k_nearest(aview1(&[]), 2).is_err());
    assert!(nn.k_nearest(aview1(&[2.2, 4.4, 5.5]), 1).is_err());
}

#[test]
fn linear_search_normal() {
    let points = arr2(&[[0.0, 2.0], [10.0, 4.0], [4.0, 5.0], [7.0, 1.0], [1.0, 7.2]]);
    let nn = LinearSearchIndex::new(&points, L2Dist).unwrap();

    let out = nn.k_nearest(aview1(&[0.0, 1.0]), 2).unwrap();
    assert_query(out, &points, vec![0, 2]);

    let out = nn.k_nearest(aview1(&[4.0, 4.0]), 3).unwrap();
    assert_query(out, &points, vec![2, 3, 4]);

    let out = nn.k_nearest(aview1(&[4.0, 4.0]), 10).unwrap();
    assert_query(out, &points, vec![2, 3, 4, 0, 1]);
}

#[test]
fn linear_search_degenerate() {
    let points = arr2(&[[0.0, 2.0], [0.0, 2.0], [0.0, 2.0], [0.0, 2.0], [0.0, 2.0]]);
    let nn = LinearSearchIndex::new(&points, L2Dist).unwrap();

    // equally distant points are returned in order of their position
    let out = nn.k_nearest(aview1(&[0.0, 1.0]), 3).unwrap();
    assert_query(out, &points, vec![0, 1, 2]);
}

#[test]
fn distance_matrices_agree_on_random_points() {
    let mut rng = Xoshiro256Plus::seed_from_u64(40);
    let points = Array2::random_using((60, 5), Uniform::new(-50., 50.), &mut rng);

    let gram = SqEuclideanMatrix.distance_matrix(points.view());
    let pairwise = Pairwise(L2Dist).distance_matrix(points.view());

    assert_abs_diff_eq!(gram, pairwise, epsilon = 1e-8);
    assert_abs_diff_eq!(gram.diag(), arr1(&[0.0; 60]));
}

#[test]
fn knn_separates_blobs() {
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let noise = Uniform::new(-0.5, 0.5);

    let mut records = Array2::random_using((40, 2), noise, &mut rng);
    records.slice_mut(ndarray::s![20.., ..]).mapv_inplace(|x| x + 3.0);
    let targets = (0..40).map(|i| i >= 20).collect::<ndarray::Array1<_>>();
    let dataset = Dataset::new(records, targets).shuffle(&mut rng);

    let (train, test) = dataset.split_with_ratio(0.75);
    let model = KNeighborsParams::new(3).fit(&train).unwrap();

    assert_abs_diff_eq!(model.score(&test).unwrap(), 1.0);
}
