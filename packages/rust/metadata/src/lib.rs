//! Metadata table loader.
//!
//! Reads the issue's CSV spreadsheet (one row per contribution, header row
//! required) into [`ContributionRecord`]s. Rows are yielded lazily in file
//! order; ordering by index happens later, when fragments are collected.
//!
//! Required columns: `index`, `author`, `title`, `email`, `filename`.
//! Optional: `kind` or `type`, but not both. Other columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use journalbuilder_shared::{ContributionRecord, JournalError, Result};

/// An opened metadata table.
pub struct MetadataTable<R> {
    reader: csv::Reader<R>,
    origin: PathBuf,
}

impl MetadataTable<File> {
    /// Open a table file. A missing file is a configuration error.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(JournalError::config(format!(
                "no database file; should be {}",
                path.display()
            )));
        }

        let reader = builder()
            .from_path(path)
            .map_err(|e| JournalError::metadata(format!("{}: {e}", path.display())))?;

        debug!("metadata table opened");

        Ok(Self {
            reader,
            origin: path.to_path_buf(),
        })
    }
}

impl<R: Read> MetadataTable<R> {
    /// Wrap an in-memory or already-open source. `origin` is only used in
    /// error messages.
    pub fn from_reader(source: R, origin: impl Into<PathBuf>) -> Self {
        Self {
            reader: builder().from_reader(source),
            origin: origin.into(),
        }
    }

    /// Column names from the header row.
    pub fn headers(&mut self) -> Result<Vec<String>> {
        let origin = self.origin.clone();
        let headers = self
            .reader
            .headers()
            .map_err(|e| JournalError::metadata(format!("{}: {e}", origin.display())))?;
        Ok(headers.iter().map(str::to_string).collect())
    }

    /// Lazily deserialize rows in file order.
    ///
    /// A row that is malformed, or a table missing a required column, yields
    /// a metadata error naming the problem when that row is reached. A bad
    /// header row is reported as the first item.
    pub fn records(mut self) -> impl Iterator<Item = Result<ContributionRecord>> {
        let header_error = self.check_headers().err();
        let origin = self.origin;
        let rows = header_error.is_none().then(|| {
            self.reader
                .into_deserialize::<ContributionRecord>()
                .map(move |row| {
                    row.map_err(|e| JournalError::metadata(format!("{}: {e}", origin.display())))
                })
        });

        header_error.map(Err).into_iter().chain(rows.into_iter().flatten())
    }

    /// `kind` and `type` name the same field; a table may carry only one.
    fn check_headers(&mut self) -> Result<()> {
        let headers = self.headers()?;
        let has = |name: &str| headers.iter().any(|h| h == name);
        if has("kind") && has("type") {
            return Err(JournalError::metadata(format!(
                "{}: both `kind` and `type` columns present; keep only one",
                self.origin.display()
            )));
        }
        Ok(())
    }
}

fn builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).trim(csv::Trim::All);
    builder
}
