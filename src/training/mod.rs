//! Model training: boosting, splitting, metrics, and the training procedure

mod gbdt;
mod metrics;
mod split;
mod trainer;

pub use gbdt::{GbdtClassifier, GbdtConfig};
pub use metrics::{roc_auc, EvalMetrics};
pub use split::{stratified_split, TrainTestSplit};
pub use trainer::{train, TrainOptions, TrainReport, DEFAULT_MODEL_PATH};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Capability interface for the pipeline's classifier stage.
///
/// Any binary classifier producing probabilities over a dense feature
/// matrix can stand in for the boosted trees.
pub trait ProbabilisticClassifier {
    /// Fit to a feature matrix and 0/1 labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict the positive-class probability for each row.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}
