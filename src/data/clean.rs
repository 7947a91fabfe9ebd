//! Training-frame cleaning: label normalization, coercion, imputation

use crate::error::{ChurnError, Result};
use crate::schema::{self, ID_COLUMN, NUMERIC_HINTS, TARGET_COLUMN};
use polars::prelude::*;
use tracing::info;

/// Row accounting for a cleaning pass.
#[derive(Debug, Clone, Copy)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_dropped: usize,
    pub rows_out: usize,
}

/// Map one raw target cell to a binary label.
///
/// Off-lexicon values fall through to numeric parsing; anything that still
/// fails is missing and the row will be dropped.
pub fn parse_target_value(raw: &str) -> Option<i64> {
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "yes" | "y" | "true" | "t" | "1" => Some(1),
        "no" | "n" | "false" | "f" | "0" => Some(0),
        "" | "nan" => None,
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v as i64),
    }
}

/// Normalize a heterogeneous target column to per-row binary labels.
pub fn normalize_target(col: &Column) -> Result<Vec<Option<i64>>> {
    let as_str = col
        .cast(&DataType::String)
        .map_err(|e| ChurnError::DataError(e.to_string()))?;
    let ca = as_str
        .str()
        .map_err(|e| ChurnError::DataError(e.to_string()))?;

    Ok(ca
        .into_iter()
        .map(|opt| opt.and_then(parse_target_value))
        .collect())
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Clean a raw training table into a modeling-ready frame.
///
/// Canonicalizes headers, verifies the required columns, drops the ID
/// column, normalizes the target (dropping rows it cannot label), coerces
/// the hinted numeric columns, and imputes what is left: medians for
/// numeric columns, the literal `"Unknown"` for categorical ones.
pub fn clean_training_frame(df: DataFrame) -> Result<(DataFrame, CleanReport)> {
    let mut df = schema::canonicalize_columns(&df)?;
    schema::check_required(&df)?;

    if df.column(ID_COLUMN).is_ok() {
        df = df.drop(ID_COLUMN)?;
    }

    let rows_in = df.height();

    // Normalize the target and drop rows without a usable label.
    let labels = normalize_target(df.column(TARGET_COLUMN)?)?;
    let kept: Vec<i64> = labels.iter().flatten().copied().collect();
    let rows_dropped = rows_in - kept.len();
    if rows_dropped > 0 {
        info!("dropping {rows_dropped} rows with missing or invalid churn label");
    }

    let mask: BooleanChunked = labels.iter().map(|o| Some(o.is_some())).collect();
    df = df.filter(&mask)?;
    df.with_column(Column::new(TARGET_COLUMN.into(), kept))?;

    // Coerce the hinted numeric columns; unparsable cells become null.
    for name in NUMERIC_HINTS {
        if let Ok(col) = df.column(name) {
            let casted = col.cast(&DataType::Float64)?;
            df.with_column(casted)?;
        }
    }

    // Classify by runtime dtype after coercion, then impute.
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for name in &names {
        if name == TARGET_COLUMN {
            continue;
        }
        let col = df.column(name)?.clone();

        if is_numeric_dtype(col.dtype()) {
            let casted = col.cast(&DataType::Float64)?;
            let ca = casted
                .f64()
                .map_err(|e| ChurnError::DataError(e.to_string()))?;
            let median = ca.median().unwrap_or(0.0);
            let filled: Float64Chunked = ca
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(median)))
                .collect();
            df.with_column(filled.with_name(name.as_str().into()).into_series())?;
        } else if let Ok(ca) = col.str() {
            let filled: StringChunked = ca
                .into_iter()
                .map(|opt| Some(opt.unwrap_or("Unknown").to_string()))
                .collect();
            df.with_column(filled.with_name(name.as_str().into()).into_series())?;
        }
    }

    let report = CleanReport {
        rows_in,
        rows_dropped,
        rows_out: df.height(),
    };
    info!(
        "cleaned training frame: {} rows x {} cols",
        report.rows_out,
        df.width()
    );

    Ok((df, report))
}
