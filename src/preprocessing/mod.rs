//! Feature preprocessing
//!
//! Numeric columns pass through untouched; categorical columns are one-hot
//! encoded against the category sets seen at fit time. The fitted
//! transformer is the first stage of the churn pipeline.

mod encoder;
mod features;

pub use encoder::OneHotEncoder;
pub use features::FeatureTransformer;
