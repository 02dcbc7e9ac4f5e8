//! `nca-datasets` provides synthetic labelled datasets ready to be used in tests, examples and
//! benchmarks of the `nca` workspace.
//!
//! ## Current State
//!
//! The [`generate`](generate/index.html) module samples
//!
//! * `blobs` : unlabelled points around a set of centroids
//! * `labelled_blobs` : the same points, labelled with the index of their centroid
//! * `noisy_blobs` : labelled blobs padded with wide, uninformative noise features
//!
//! All generators take an explicit random number generator, so seeded runs are reproducible:
//! ```
//! use nca_datasets::generate::labelled_blobs;
//! use ndarray::array;
//! use ndarray_rand::rand::SeedableRng;
//! use ndarray_rand::rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let dataset = labelled_blobs(10, &array![[0., 0.], [5., 5.]], &mut rng);
//! assert_eq!(dataset.records().dim(), (20, 2));
//! ```

pub mod generate;
