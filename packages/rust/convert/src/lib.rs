//! Contribution conversion.
//!
//! Resolves each record's source document, runs the external converter
//! (pandoc by default) to turn it into a LaTeX fragment in a temporary file,
//! and collects the results into a [`FragmentSet`] keyed by index.

mod fragments;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use journalbuilder_shared::{
    ContributionKind, ContributionRecord, JournalError, Result, ToolInvocation, ToolRunner,
    ToolsConfig,
};

pub use fragments::{Fragment, FragmentBody, FragmentSet};

/// Lines of converter output kept in a conversion error.
const DIAGNOSTIC_LINES: usize = 8;

/// Progress callback for the conversion loop.
pub trait ConvertProgress {
    /// Called after each record has been converted (1-based `current`).
    fn converted(&self, record: &ContributionRecord, current: usize);
}

/// Progress reporter that reports nothing.
pub struct NoProgress;

impl ConvertProgress for NoProgress {
    fn converted(&self, _record: &ContributionRecord, _current: usize) {}
}

// ---------------------------------------------------------------------------
// Source resolution
// ---------------------------------------------------------------------------

/// Locate a contribution's source document.
///
/// Tries the filename as given first, then under `contribs_dir`. Only
/// regular files match. Returns an absolute path, or
/// [`JournalError::NotFound`] naming `filename`.
pub fn resolve_source(filename: &str, contribs_dir: Option<&Path>) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(JournalError::not_found(filename));
    }

    let direct = Path::new(filename);
    let found = if direct.is_file() {
        direct.to_path_buf()
    } else {
        match contribs_dir.map(|dir| dir.join(filename)) {
            Some(candidate) if candidate.is_file() => candidate,
            _ => return Err(JournalError::not_found(filename)),
        }
    };

    std::path::absolute(&found).map_err(|e| JournalError::io(&found, e))
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Runs the external converter over contribution records.
pub struct Converter<'a> {
    tools: &'a ToolsConfig,
    runner: &'a dyn ToolRunner,
    contribs_dir: Option<PathBuf>,
    scratch_dir: Option<PathBuf>,
}

impl<'a> Converter<'a> {
    pub fn new(tools: &'a ToolsConfig, runner: &'a dyn ToolRunner) -> Self {
        Self {
            tools,
            runner,
            contribs_dir: None,
            scratch_dir: None,
        }
    }

    /// Directory searched for sources not found as given.
    pub fn with_contribs_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.contribs_dir = dir;
        self
    }

    /// Directory for fragment files (system temp dir when unset).
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Convert a single record.
    ///
    /// Illustrations are not converted; their source image is carried
    /// through as-is.
    #[instrument(skip_all, fields(index = record.index, filename = %record.filename))]
    pub fn convert_record(&self, record: ContributionRecord) -> Result<Fragment> {
        let source = resolve_source(&record.filename, self.contribs_dir.as_deref())?;
        debug!(title = %record.title, source = %source.display(), "resolved source");

        if record.kind == ContributionKind::Illustration {
            return Ok(Fragment {
                body: FragmentBody::Image(source.clone()),
                source,
                record,
            });
        }

        let output = self.fragment_file()?;

        let mut output_flag = OsString::from("--output=");
        output_flag.push(output.as_os_str());

        let invocation = ToolInvocation::new(&self.tools.converter)
            .args(&self.tools.converter_args)
            .arg(output_flag)
            .arg(source.as_os_str());

        let result = self.runner.run(&invocation)?;
        if !result.success() {
            // `output` is dropped here, removing the partial fragment.
            let tail = result.diagnostic_tail(DIAGNOSTIC_LINES);
            let detail = if tail.is_empty() {
                format!("{} {}", result.program, result.status_text())
            } else {
                format!("{} {}:\n{tail}", result.program, result.status_text())
            };
            return Err(JournalError::conversion(&source, detail));
        }

        debug!(fragment = %output.display(), "converted");

        Ok(Fragment {
            record,
            source,
            body: FragmentBody::Latex(output),
        })
    }

    /// Convert every record, stopping at the first failure.
    ///
    /// On failure the fragments produced so far are deleted along with the
    /// partially built set.
    #[instrument(skip_all)]
    pub fn convert_all<I>(&self, records: I, progress: &dyn ConvertProgress) -> Result<FragmentSet>
    where
        I: IntoIterator<Item = Result<ContributionRecord>>,
    {
        let mut set = FragmentSet::new();

        for record in records {
            let record = record?;
            if set.contains(record.index) {
                return Err(fragments::duplicate_index(record.index));
            }

            let fragment = self.convert_record(record)?;
            progress.converted(&fragment.record, set.len() + 1);
            set.insert(fragment)?;
        }

        info!(
            count = set.len(),
            temp_files = set.temp_file_count(),
            "conversion complete"
        );

        Ok(set)
    }

    fn fragment_file(&self) -> Result<tempfile::TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("journal-fragment-").suffix(".latex");

        let file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };

        let dir = self
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        file.map(tempfile::NamedTempFile::into_temp_path)
            .map_err(|e| JournalError::io(dir, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
