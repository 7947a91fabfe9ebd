//! Fitted column transformer: numeric passthrough + one-hot encoding

use crate::error::{ChurnError, Result};
use super::OneHotEncoder;
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Two-block feature transformer.
///
/// At fit time the frame's columns are partitioned by runtime dtype:
/// numeric columns pass through in frame order, string columns go to the
/// one-hot encoder. `transform` accepts any frame carrying the same column
/// set, regardless of column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl FeatureTransformer {
    pub fn new() -> Self {
        Self {
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Fit to a feature frame (target already removed).
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.numeric_columns.clear();
        self.categorical_columns.clear();

        for col in df.get_columns() {
            let name = col.name().to_string();
            match col.dtype() {
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
                | DataType::Float32
                | DataType::Float64 => self.numeric_columns.push(name),
                DataType::String | DataType::Categorical(_, _) => {
                    self.categorical_columns.push(name)
                }
                _ => {
                    if col.str().is_ok() {
                        self.categorical_columns.push(name);
                    }
                }
            }
        }

        self.encoder.fit(df, &self.categorical_columns)?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a frame into the dense feature matrix.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ChurnError::ModelNotFitted);
        }

        let n = df.height();
        let mut numeric = Array2::<f64>::zeros((n, self.numeric_columns.len()));

        for (j, name) in self.numeric_columns.iter().enumerate() {
            let col = df
                .column(name)
                .map_err(|_| ChurnError::FeatureNotFound(name.clone()))?;
            let casted = col
                .cast(&DataType::Float64)
                .map_err(|e| ChurnError::PreprocessingError(e.to_string()))?;
            let ca = casted
                .f64()
                .map_err(|e| ChurnError::PreprocessingError(e.to_string()))?;
            for (i, val) in ca.into_iter().enumerate() {
                numeric[[i, j]] = val.unwrap_or(f64::NAN);
            }
        }

        if self.categorical_columns.is_empty() {
            return Ok(numeric);
        }

        let encoded = self.encoder.transform(df)?;
        if self.numeric_columns.is_empty() {
            return Ok(encoded);
        }

        Ok(concatenate(Axis(1), &[numeric.view(), encoded.view()])?)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the output matrix columns.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        names.extend(self.encoder.feature_names());
        names
    }

    pub fn n_features(&self) -> usize {
        self.numeric_columns.len() + self.encoder.width()
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_frame() -> DataFrame {
        df!(
            "age" => &[25.0, 30.0, 35.0],
            "contract" => &["Monthly", "Annual", "Monthly"],
            "spend" => &[100.0, 250.0, 80.0],
        )
        .unwrap()
    }

    #[test]
    fn test_column_partition() {
        let mut t = FeatureTransformer::new();
        t.fit(&feature_frame()).unwrap();

        assert_eq!(t.numeric_columns(), &["age", "spend"]);
        assert_eq!(t.categorical_columns(), &["contract"]);
        assert_eq!(t.n_features(), 4);
        assert_eq!(
            t.feature_names(),
            vec!["age", "spend", "contract_Annual", "contract_Monthly"]
        );
    }

    #[test]
    fn test_transform_layout() {
        let mut t = FeatureTransformer::new();
        let x = t.fit_transform(&feature_frame()).unwrap();

        assert_eq!(x.dim(), (3, 4));
        // Row 1: age 30, spend 250, contract Annual.
        assert_eq!(x.row(1).to_vec(), vec![30.0, 250.0, 1.0, 0.0]);
    }

    #[test]
    fn test_transform_ignores_column_order() {
        let mut t = FeatureTransformer::new();
        t.fit(&feature_frame()).unwrap();

        let shuffled = df!(
            "contract" => &["Annual"],
            "spend" => &[250.0],
            "age" => &[30.0],
        )
        .unwrap();

        let x = t.transform(&shuffled).unwrap();
        assert_eq!(x.row(0).to_vec(), vec![30.0, 250.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut t = FeatureTransformer::new();
        t.fit(&feature_frame()).unwrap();

        let partial = df!("age" => &[30.0], "contract" => &["Annual"]).unwrap();
        assert!(matches!(
            t.transform(&partial),
            Err(ChurnError::FeatureNotFound(_))
        ));
    }
}
