//! One-hot encoding for categorical columns

use crate::error::{ChurnError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One-hot encoder over string columns.
///
/// Categories are fixed at fit time, sorted for a deterministic layout. A
/// value unseen during fit encodes as the all-zero block, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // Column name -> sorted category list
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder to the given columns.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.categories.clear();

        for name in columns {
            let col = df
                .column(name)
                .map_err(|_| ChurnError::FeatureNotFound(name.clone()))?;
            let ca = col
                .str()
                .map_err(|e| ChurnError::PreprocessingError(e.to_string()))?;

            let mut cats: Vec<String> = ca
                .into_iter()
                .flatten()
                .map(|s| s.to_string())
                .collect();
            cats.sort();
            cats.dedup();

            self.categories.push((name.clone(), cats));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Total width of the encoded block.
    pub fn width(&self) -> usize {
        self.categories.iter().map(|(_, cats)| cats.len()).sum()
    }

    /// Column names of the encoded block, `{column}_{category}`.
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}_{}", name, c)))
            .collect()
    }

    /// Fitted categories per column.
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }

    /// Encode the fitted columns of `df` into a dense block.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ChurnError::ModelNotFitted);
        }

        let n = df.height();
        let mut out = Array2::<f64>::zeros((n, self.width()));

        let mut offset = 0usize;
        for (name, cats) in &self.categories {
            let col = df
                .column(name)
                .map_err(|_| ChurnError::FeatureNotFound(name.clone()))?;
            let ca = col
                .str()
                .map_err(|e| ChurnError::PreprocessingError(e.to_string()))?;

            for (i, val) in ca.into_iter().enumerate() {
                if let Some(v) = val {
                    if let Ok(pos) = cats.binary_search_by(|c| c.as_str().cmp(v)) {
                        out[[i, offset + pos]] = 1.0;
                    }
                }
            }
            offset += cats.len();
        }

        Ok(out)
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_encoder() -> OneHotEncoder {
        let df = df!("city" => &["NYC", "LA", "NYC", "SF"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city".to_string()]).unwrap();
        encoder
    }

    #[test]
    fn test_fit_sorts_categories() {
        let encoder = fitted_encoder();
        assert_eq!(encoder.width(), 3);
        assert_eq!(
            encoder.feature_names(),
            vec!["city_LA", "city_NYC", "city_SF"]
        );
    }

    #[test]
    fn test_transform_sets_single_position() {
        let encoder = fitted_encoder();
        let df = df!("city" => &["SF", "LA"]).unwrap();
        let out = encoder.transform(&df).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let encoder = fitted_encoder();
        let df = df!("city" => &["Tokyo"]).unwrap();
        let out = encoder.transform(&df).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let encoder = OneHotEncoder::new();
        let df = df!("city" => &["NYC"]).unwrap();
        assert!(matches!(
            encoder.transform(&df),
            Err(ChurnError::ModelNotFitted)
        ));
    }
}
