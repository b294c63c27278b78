//! Seeded downsampling of large datasets.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::frame::Dataset;

/// Returns at most `max_rows` rows chosen uniformly at random with a fixed `seed`, in their
/// original order, and whether sampling happened.
pub fn downsample(dataset: &Dataset, max_rows: usize, seed: u64) -> (Dataset, bool) {
    let total = dataset.row_count();
    if total <= max_rows {
        return (dataset.clone(), false);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = rand::seq::index::sample(&mut rng, total, max_rows).into_vec();
    rows.sort_unstable();

    info!(from = total, to = rows.len(), "Dataset downsampled");
    (dataset.take_rows(&rows), true)
}
