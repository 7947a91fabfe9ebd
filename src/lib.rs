//! Churn AI - customer churn risk scoring
//!
//! This crate covers the full offline/online loop for a small churn model:
//! loading and cleaning a raw customer table, fitting a preprocessing +
//! gradient-boosted-trees pipeline, persisting the trained bundle, and
//! scoring single records behind a validated intake form.

pub mod bundle;
pub mod cli;
pub mod data;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod training;

pub use error::{ChurnError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bundle::{BundleMetadata, ModelBundle};
    pub use crate::data::{clean_training_frame, load_table, CleanReport};
    pub use crate::error::{ChurnError, Result};
    pub use crate::inference::{
        threshold_from_env, CustomerRecord, FormInput, InferenceEngine, Prediction, RiskClass,
        ViewState,
    };
    pub use crate::pipeline::ChurnPipeline;
    pub use crate::preprocessing::{FeatureTransformer, OneHotEncoder};
    pub use crate::training::{
        roc_auc, stratified_split, train, EvalMetrics, GbdtClassifier, GbdtConfig,
        ProbabilisticClassifier, TrainOptions,
    };
}
