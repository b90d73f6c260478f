//! CSV Data Loader Module
//! Handles CSV file loading, header normalization and the enriched-frame cache.

use polars::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

use super::cleaner::{self, CleanError};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("failed to read source file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error(transparent)]
    Clean(#[from] CleanError),
}

/// Identity of the file content at load time; a changed fingerprint means the
/// cached frame is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, LoaderError> {
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoaderError::SourceNotFound(path.to_path_buf()),
            _ => LoaderError::Io(e),
        })?;
        Ok(Self {
            modified: meta.modified()?,
            len: meta.len(),
        })
    }
}

/// Whether `load` produced a fresh frame or reused the cached one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Fresh,
    Cached,
}

/// Loads the raw CSV, runs the enrichment pipeline and keeps the result
/// cached until the underlying file changes. The cached frame is handed out
/// by shared reference and never mutated after construction.
pub struct DataStore {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
    fingerprint: Option<Fingerprint>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
            fingerprint: None,
        }
    }

    /// Load and enrich `path`, reusing the cached frame while the file is
    /// unchanged.
    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome, LoaderError> {
        let fingerprint = Fingerprint::of(path)?;
        if self.df.is_some()
            && self.file_path.as_deref() == Some(path)
            && self.fingerprint == Some(fingerprint)
        {
            log::debug!("reusing cached dataset for {}", path.display());
            return Ok(LoadOutcome::Cached);
        }

        let path_str = path.to_string_lossy().to_string();
        let raw = LazyCsvReader::new(&path_str)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        let raw = trim_column_names(raw)?;
        let enriched = cleaner::enrich(&raw)?;

        log::info!(
            "loaded {} records ({} columns) from {}",
            enriched.height(),
            enriched.width(),
            path.display()
        );
        self.df = Some(enriched);
        self.file_path = Some(path.to_path_buf());
        self.fingerprint = Some(fingerprint);
        Ok(LoadOutcome::Fresh)
    }

    /// Get a reference to the cached enriched frame.
    pub fn frame(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Get the number of cached records.
    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get the path of the currently cached file.
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

/// Header cells may carry stray whitespace around the column name.
fn trim_column_names(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for name in names {
        let trimmed = name.trim();
        if trimmed != name {
            df.rename(&name, trimmed.into())?;
        }
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = " age ,sex,dataset,cp,trestbps,chol,fbs,restecg,thalch,exang,oldpeak,num";

    fn write_csv(name: &str, rows: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut contents = String::from(HEADER);
        for row in rows {
            contents.push('\n');
            contents.push_str(row);
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_and_trims_header_whitespace() {
        let path = write_csv(
            "cardio_loader_trim.csv",
            &[
                "63,Male,Cleveland,1,145,233,1,0,150,0,2.3,0",
                "41,Female,Cleveland,2,130,0,0,1,160,1,1.0,2",
            ],
        );
        let mut store = DataStore::new();
        assert_eq!(store.load(&path).unwrap(), LoadOutcome::Fresh);

        let df = store.frame().unwrap();
        assert!(df.column("age").is_ok());
        assert_eq!(store.row_count(), 2);

        let target = df
            .column("has_heart_disease")
            .unwrap()
            .cast(&DataType::Int32)
            .unwrap();
        let flags: Vec<i32> = target.i32().unwrap().into_iter().flatten().collect();
        assert_eq!(flags, vec![0, 1]);
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let mut store = DataStore::new();
        let path = std::env::temp_dir().join("cardio_loader_does_not_exist.csv");
        assert!(matches!(
            store.load(&path),
            Err(LoaderError::SourceNotFound(_))
        ));
        assert!(store.frame().is_none());
    }

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let path = write_csv(
            "cardio_loader_cache.csv",
            &["63,Male,Cleveland,1,145,233,1,0,150,0,2.3,0"],
        );
        let mut store = DataStore::new();
        assert_eq!(store.load(&path).unwrap(), LoadOutcome::Fresh);
        assert_eq!(store.load(&path).unwrap(), LoadOutcome::Cached);
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn rewritten_file_invalidates_the_cache() {
        let path = write_csv(
            "cardio_loader_invalidate.csv",
            &["63,Male,Cleveland,1,145,233,1,0,150,0,2.3,0"],
        );
        let mut store = DataStore::new();
        assert_eq!(store.load(&path).unwrap(), LoadOutcome::Fresh);

        // Same name, different content (and size): the fingerprint changes.
        write_csv(
            "cardio_loader_invalidate.csv",
            &[
                "63,Male,Cleveland,1,145,233,1,0,150,0,2.3,0",
                "41,Female,Hungary,2,130,250,0,1,160,1,1.0,1",
                "55,Male,Hungary,3,120,210,0,2,100,0,0.5,0",
            ],
        );
        assert_eq!(store.load(&path).unwrap(), LoadOutcome::Fresh);
        assert_eq!(store.row_count(), 3);
    }

    #[test]
    fn csv_missing_required_columns_fails_with_format_error() {
        let path = std::env::temp_dir().join("cardio_loader_bad_format.csv");
        fs::write(&path, "age,sex\n63,Male\n").unwrap();
        let mut store = DataStore::new();
        assert!(matches!(
            store.load(&path),
            Err(LoaderError::Clean(CleanError::MissingColumns(_)))
        ));
    }
}
