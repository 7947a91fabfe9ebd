//! Column schema: header aliases, canonicalization, and required fields
//!
//! Raw exports of the customer table arrive with inconsistent headers
//! ("Payment Delay", "payment_delay_days", "Support Calls", ...). Headers are
//! normalized to lowercase alphanumerics and resolved against a fixed alias
//! table by prefix. The first alias that matches wins, in declaration order,
//! so the table below is an ordered slice rather than a map.

use crate::error::{ChurnError, Result};
use polars::prelude::*;

/// Ordered prefix -> canonical name alias table.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    ("customer", "CustomerID"),
    ("customerid", "CustomerID"),
    ("age", "Age"),
    ("gender", "Gender"),
    ("tenure", "Tenure"),
    ("usage", "Usage"),
    ("support", "Support"),
    ("payment", "PaymentDelay"),
    ("paymentdelay", "PaymentDelay"),
    ("subscription", "Subscription"),
    ("contract", "Contract"),
    ("total", "TotalSpend"),
    ("totalspend", "TotalSpend"),
    ("last", "LastInteraction"),
    ("lastinteraction", "LastInteraction"),
    ("churn", "Churn"),
];

/// Target column name.
pub const TARGET_COLUMN: &str = "Churn";

/// Identifier column, dropped before modeling when present.
pub const ID_COLUMN: &str = "CustomerID";

/// Feature columns, in intake-form display order.
pub const FEATURE_COLUMNS: &[&str] = &[
    "Age",
    "Gender",
    "Tenure",
    "Usage",
    "Support",
    "PaymentDelay",
    "Subscription",
    "Contract",
    "TotalSpend",
    "LastInteraction",
];

/// Columns that must exist after canonicalization (features + target).
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Age",
    "Gender",
    "Tenure",
    "Usage",
    "Support",
    "PaymentDelay",
    "Subscription",
    "Contract",
    "TotalSpend",
    "LastInteraction",
    "Churn",
];

/// Columns expected to hold numbers, coerced during cleaning.
pub const NUMERIC_HINTS: &[&str] = &[
    "Age",
    "Tenure",
    "Usage",
    "Support",
    "PaymentDelay",
    "TotalSpend",
    "LastInteraction",
];

/// Strip a raw header down to its lowercase alphanumeric characters.
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve a raw header against the alias table.
///
/// First alias whose key is a prefix of the normalized header wins; returns
/// `None` when nothing matches so callers can keep the original name.
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    let key = normalize_header(raw);
    HEADER_ALIASES
        .iter()
        .find(|(prefix, _)| key.starts_with(prefix))
        .map(|(_, canonical)| *canonical)
}

/// Rename all columns to their canonical names.
///
/// Later duplicates of an already-seen canonical name are dropped, keeping
/// the first occurrence.
pub fn canonicalize_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut seen: Vec<String> = Vec::new();
    let mut columns: Vec<Column> = Vec::new();

    for col in df.get_columns() {
        let raw = col.name().to_string();
        let mapped = canonical_name(&raw).map(str::to_string).unwrap_or(raw);

        if seen.iter().any(|s| s == &mapped) {
            continue;
        }
        seen.push(mapped.clone());

        let mut renamed = col.clone();
        renamed.rename(mapped.into());
        columns.push(renamed);
    }

    DataFrame::new(columns).map_err(|e| ChurnError::DataError(e.to_string()))
}

/// Fail fast when any required column is absent.
pub fn check_required(df: &DataFrame) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !present.iter().any(|p| p == *c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ChurnError::SchemaError(missing))
    }
}
