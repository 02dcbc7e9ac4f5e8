use nca_components::{compare, Nca};
use nca_datasets::generate;

use ndarray::array;
use rand::{rngs::SmallRng, SeedableRng};
use tracing_subscriber::EnvFilter;

// Learn a two dimensional NCA projection of three labelled blobs hidden among wide noise
// features and compare 3-NN accuracy on raw, NCA and PCA projected records.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // set RUST_LOG=nca_components=debug to follow the optimizer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Our random number generator, seeded for reproducibility
    let mut rng = SmallRng::seed_from_u64(42);

    let centroids = array![[0., 0.], [3., 0.], [1.5, 2.5]];
    let dataset = generate::noisy_blobs(60, &centroids, 8, 6., &mut rng).shuffle(&mut rng);
    let (train, test) = dataset.split_with_ratio(0.7);

    let params = Nca::params().n_components(2).max_iter(50).tolerance(1e-5);
    let comparison = compare(&params, &train, &test)?;

    print!("{}", comparison);

    Ok(())
}
