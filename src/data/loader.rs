//! Table readers for the supported input formats

use crate::error::{ChurnError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a table from disk, dispatching on the file extension.
///
/// CSV is the primary format; TSV, line-delimited JSON and Parquet are
/// accepted as well. Anything else is treated as CSV.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "tsv" => read_csv(path, b'\t'),
        "json" | "jsonl" => {
            let file = File::open(path)?;
            JsonReader::new(file)
                .finish()
                .map_err(|e| ChurnError::DataError(e.to_string()))
        }
        "parquet" | "pq" => {
            let file = File::open(path)?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| ChurnError::DataError(e.to_string()))
        }
        _ => read_csv(path, b','),
    }
}

fn read_csv(path: &Path, delimiter: u8) -> Result<DataFrame> {
    let file = File::open(path)?;

    let parse_opts = CsvParseOptions::default().with_separator(delimiter);

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .with_parse_options(parse_opts)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| ChurnError::DataError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2,x").unwrap();
        writeln!(file, "4,5,y").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = load_table(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_table(Path::new("does/not/exist.csv"));
        assert!(result.is_err());
    }
}
