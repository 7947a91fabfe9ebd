//! Single-record inference over a persisted model bundle
//!
//! The bundle is loaded once per process and treated as immutable. Records
//! reach the engine only after form validation, so every field is present
//! and typed by the time a frame is built.

mod form;

pub use form::{
    FormInput, ViewState, CONTRACT_OPTIONS, GENDER_OPTIONS, PLACEHOLDER, SUBSCRIPTION_OPTIONS,
};

use crate::bundle::ModelBundle;
use crate::error::{ChurnError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the default decision threshold.
pub const THRESHOLD_ENV: &str = "THRESHOLD";

/// Decision threshold used when no override is present.
pub const DEFAULT_THRESHOLD: f64 = 0.50;

/// Threshold slider bounds at the intake surface.
pub const THRESHOLD_MIN: f64 = 0.05;
pub const THRESHOLD_MAX: f64 = 0.95;

/// Resolve the starting threshold: `THRESHOLD` env var when it parses to a
/// value in [0, 1], the default otherwise.
pub fn threshold_from_env() -> f64 {
    std::env::var(THRESHOLD_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|t| (0.0..=1.0).contains(t))
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Risk classification of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClass {
    High,
    Low,
}

impl std::fmt::Display for RiskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskClass::High => write!(f, "High"),
            RiskClass::Low => write!(f, "Low"),
        }
    }
}

/// Result payload rendered by the result view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub threshold: f64,
    pub risk: RiskClass,
    /// Probability of the predicted class.
    pub confidence: f64,
}

/// One fully populated customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub age: f64,
    pub gender: String,
    pub tenure: f64,
    pub usage: f64,
    pub support: f64,
    pub payment_delay: f64,
    pub subscription: String,
    pub contract: String,
    pub total_spend: f64,
    pub last_interaction: f64,
}

impl CustomerRecord {
    /// Build the one-row feature frame the pipeline expects.
    pub fn to_frame(&self) -> Result<DataFrame> {
        df!(
            "Age" => &[self.age],
            "Gender" => &[self.gender.as_str()],
            "Tenure" => &[self.tenure],
            "Usage" => &[self.usage],
            "Support" => &[self.support],
            "PaymentDelay" => &[self.payment_delay],
            "Subscription" => &[self.subscription.as_str()],
            "Contract" => &[self.contract.as_str()],
            "TotalSpend" => &[self.total_spend],
            "LastInteraction" => &[self.last_interaction],
        )
        .map_err(|e| ChurnError::DataError(e.to_string()))
    }
}

/// Read-only scoring engine around a loaded bundle.
#[derive(Debug)]
pub struct InferenceEngine {
    bundle: ModelBundle,
}

impl InferenceEngine {
    /// Load the bundle from disk. Done once per process.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            bundle: ModelBundle::load(path)?,
        })
    }

    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Score one record against a threshold.
    ///
    /// Risk is decided by a non-strict comparison: `probability >=
    /// threshold` classifies as high risk.
    pub fn predict(&self, record: &CustomerRecord, threshold: f64) -> Result<Prediction> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ChurnError::ValidationError(format!(
                "threshold must be in [0, 1], got {threshold}"
            )));
        }

        let frame = record.to_frame()?;
        let proba = self.bundle.pipeline.predict_proba(&frame)?;
        let probability = proba[0];

        let risk = if probability >= threshold {
            RiskClass::High
        } else {
            RiskClass::Low
        };
        let confidence = match risk {
            RiskClass::High => probability,
            RiskClass::Low => 1.0 - probability,
        };

        Ok(Prediction {
            probability,
            threshold,
            risk,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BundleMetadata, ModelBundle};
    use crate::pipeline::ChurnPipeline;
    use crate::training::{EvalMetrics, GbdtConfig};
    use ndarray::Array1;

    fn sample_record() -> CustomerRecord {
        CustomerRecord {
            age: 32.0,
            gender: "Male".to_string(),
            tenure: 18.0,
            usage: 45.0,
            support: 2.0,
            payment_delay: 0.0,
            subscription: "Standard".to_string(),
            contract: "Monthly".to_string(),
            total_spend: 900.0,
            last_interaction: 7.0,
        }
    }

    fn training_frame(n: usize) -> (DataFrame, Array1<f64>) {
        let mut age = Vec::with_capacity(n);
        let mut gender = Vec::with_capacity(n);
        let mut tenure = Vec::with_capacity(n);
        let mut usage = Vec::with_capacity(n);
        let mut support = Vec::with_capacity(n);
        let mut delay = Vec::with_capacity(n);
        let mut subscription = Vec::with_capacity(n);
        let mut contract = Vec::with_capacity(n);
        let mut spend = Vec::with_capacity(n);
        let mut last = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);

        for i in 0..n {
            let churned = i % 2 == 0;
            age.push(20.0 + i as f64);
            gender.push(if churned { "Male" } else { "Female" });
            tenure.push(if churned { 2.0 } else { 40.0 });
            usage.push(if churned { 5.0 + i as f64 * 0.1 } else { 60.0 + i as f64 });
            support.push(if churned { 8.0 } else { 1.0 });
            delay.push(if churned { 20.0 } else { 0.0 });
            subscription.push(if churned { "Basic" } else { "Premium" });
            contract.push(if churned { "Monthly" } else { "Annual" });
            spend.push(100.0 + i as f64);
            last.push(if churned { 25.0 } else { 3.0 });
            y.push(if churned { 1.0 } else { 0.0 });
        }

        let df = df!(
            "Age" => &age,
            "Gender" => &gender,
            "Tenure" => &tenure,
            "Usage" => &usage,
            "Support" => &support,
            "PaymentDelay" => &delay,
            "Subscription" => &subscription,
            "Contract" => &contract,
            "TotalSpend" => &spend,
            "LastInteraction" => &last,
        )
        .unwrap();
        (df, Array1::from_vec(y))
    }

    fn fitted_engine() -> InferenceEngine {
        let (df, y) = training_frame(40);
        let mut pipeline = ChurnPipeline::new(GbdtConfig {
            n_estimators: 20,
            max_depth: 3,
            eval_every: 0,
            ..Default::default()
        });
        pipeline.fit(&df, &y).unwrap();
        let proba = pipeline.predict_proba(&df).unwrap();
        let metrics = EvalMetrics::compute(&y, &proba, 0.5);
        InferenceEngine::from_bundle(ModelBundle::new(
            pipeline,
            metrics,
            BundleMetadata::new(40, 0),
        ))
    }

    #[test]
    fn test_predict_returns_probability_in_unit_interval() {
        let engine = fitted_engine();
        let prediction = engine.predict(&sample_record(), 0.5).unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert_eq!(prediction.threshold, 0.5);
        match prediction.risk {
            RiskClass::High => assert!(prediction.probability >= 0.5),
            RiskClass::Low => assert!(prediction.probability < 0.5),
        }
    }

    #[test]
    fn test_risk_comparison_is_non_strict() {
        let engine = fitted_engine();
        let prediction = engine.predict(&sample_record(), 0.0).unwrap();
        // Every probability satisfies >= 0.0.
        assert_eq!(prediction.risk, RiskClass::High);
        assert_eq!(prediction.confidence, prediction.probability);
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let engine = fitted_engine();
        assert!(engine.predict(&sample_record(), 1.5).is_err());
    }

    #[test]
    fn test_threshold_from_env() {
        std::env::remove_var(THRESHOLD_ENV);
        assert_eq!(threshold_from_env(), DEFAULT_THRESHOLD);

        std::env::set_var(THRESHOLD_ENV, "0.30");
        assert_eq!(threshold_from_env(), 0.30);

        std::env::set_var(THRESHOLD_ENV, "not-a-number");
        assert_eq!(threshold_from_env(), DEFAULT_THRESHOLD);

        std::env::set_var(THRESHOLD_ENV, "7.5");
        assert_eq!(threshold_from_env(), DEFAULT_THRESHOLD);

        std::env::remove_var(THRESHOLD_ENV);
    }
}
