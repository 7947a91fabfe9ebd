//! Stratified train/test splitting

use crate::error::{ChurnError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Row indices of one train/test split.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices into train/test, preserving the class distribution.
///
/// Each class is shuffled independently with the seeded generator and
/// contributes `test_fraction` of its rows (rounded) to the test side.
/// A single-member class stays entirely in train.
pub fn stratified_split(
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(ChurnError::ValidationError(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut class_indices: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, &val) in y.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    // Iterate classes in a fixed order so the split is reproducible.
    let mut classes: Vec<i64> = class_indices.keys().copied().collect();
    classes.sort_unstable();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in classes {
        let mut indices = class_indices.remove(&class).unwrap_or_default();
        indices.shuffle(&mut rng);

        let n_test = if indices.len() < 2 {
            0
        } else {
            ((indices.len() as f64) * test_fraction).round() as usize
        };

        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(ChurnError::ValidationError(format!(
            "split produced {} train and {} test rows",
            train.len(),
            test.len()
        )));
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(TrainTestSplit { train, test })
}
