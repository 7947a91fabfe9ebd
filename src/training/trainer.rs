//! End-to-end training procedure

use crate::bundle::{BundleMetadata, ModelBundle};
use crate::data::{clean_training_frame, load_table};
use crate::error::{ChurnError, Result};
use crate::pipeline::ChurnPipeline;
use crate::schema::TARGET_COLUMN;
use crate::training::{stratified_split, EvalMetrics, GbdtConfig};
use ndarray::Array1;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fixed model output path.
pub const DEFAULT_MODEL_PATH: &str = "models/churn_gbdt.bin";

/// Preferred raw training table.
pub const RAW_TRAIN_PATH: &str = "data/data_raw/customer_churn_dataset-training-master.csv";

/// Small sample used when the full table is absent.
pub const FALLBACK_SAMPLE_PATH: &str = "data/data_raw/sample_customers.csv";

/// Training run options.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Explicit data path; `None` resolves the default paths.
    pub data_path: Option<PathBuf>,
    pub model_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub config: GbdtConfig,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            data_path: None,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            test_fraction: 0.2,
            seed: 42,
            config: GbdtConfig::default(),
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub metrics: EvalMetrics,
    pub model_path: PathBuf,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
}

fn resolve_data_path(options: &TrainOptions) -> Result<PathBuf> {
    if let Some(path) = &options.data_path {
        return Ok(path.clone());
    }
    let primary = Path::new(RAW_TRAIN_PATH);
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }
    let fallback = Path::new(FALLBACK_SAMPLE_PATH);
    if fallback.exists() {
        return Ok(fallback.to_path_buf());
    }
    Err(ChurnError::DataError(format!(
        "no training data found at {RAW_TRAIN_PATH} or {FALLBACK_SAMPLE_PATH}"
    )))
}

/// Load, clean, split, fit, evaluate and persist the churn model.
pub fn train(options: &TrainOptions) -> Result<TrainReport> {
    let data_path = resolve_data_path(options)?;
    info!("loading training data from {}", data_path.display());

    let raw = load_table(&data_path)?;
    let (cleaned, _report) = clean_training_frame(raw)?;

    let y_col = cleaned.column(TARGET_COLUMN)?.cast(&DataType::Float64)?;
    let y: Array1<f64> = y_col
        .f64()
        .map_err(|e| ChurnError::DataError(e.to_string()))?
        .into_no_null_iter()
        .collect();
    let features = cleaned.drop(TARGET_COLUMN)?;

    let split = stratified_split(&y, options.test_fraction, options.seed)?;
    info!(
        "split {} rows into {} train / {} test",
        y.len(),
        split.train.len(),
        split.test.len()
    );

    let train_df = take_rows(&features, &split.train)?;
    let test_df = take_rows(&features, &split.test)?;
    let y_train: Array1<f64> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Array1<f64> = split.test.iter().map(|&i| y[i]).collect();

    let mut pipeline = ChurnPipeline::new(options.config.clone());
    pipeline.fit(&train_df, &y_train)?;

    let proba = pipeline.predict_proba(&test_df)?;
    let metrics = EvalMetrics::compute(&y_test, &proba, 0.5);
    info!(
        "holdout auc {:.4}, f1 {:.4} over {} rows",
        metrics.auc, metrics.f1, metrics.n_samples
    );

    let bundle = ModelBundle::new(
        pipeline,
        metrics.clone(),
        BundleMetadata::new(split.train.len(), split.test.len()),
    );
    bundle.save(&options.model_path)?;
    info!("saved model to {}", options.model_path.display());

    Ok(TrainReport {
        metrics,
        model_path: options.model_path.clone(),
        n_rows: y.len(),
        n_train: split.train.len(),
        n_test: split.test.len(),
    })
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: IdxCa = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    df.take(&idx).map_err(|e| ChurnError::DataError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let options = TrainOptions {
            data_path: Some(PathBuf::from("somewhere/custom.csv")),
            ..Default::default()
        };
        let path = resolve_data_path(&options).unwrap();
        assert_eq!(path, PathBuf::from("somewhere/custom.csv"));
    }

    #[test]
    fn test_resolve_without_data_is_an_error() {
        // Neither default file exists in the test working directory.
        let options = TrainOptions::default();
        assert!(resolve_data_path(&options).is_err());
    }

    #[test]
    fn test_take_rows() {
        let df = df!("a" => &[10i64, 20, 30, 40]).unwrap();
        let taken = take_rows(&df, &[0, 2]).unwrap();
        let a = taken.column("a").unwrap().i64().unwrap();
        assert_eq!(a.get(0), Some(10));
        assert_eq!(a.get(1), Some(30));
    }
}
