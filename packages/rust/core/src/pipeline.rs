//! End-to-end `build` pipeline: metadata → convert → assemble → typeset → PDF.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Datelike;
use tracing::{info, instrument, warn};

use journalbuilder_convert::{ConvertProgress, Converter};
use journalbuilder_latex::validate_color;
use journalbuilder_metadata::MetadataTable;
use journalbuilder_shared::{
    ContributionRecord, IssueInfo, JournalError, KindFilter, MastheadConfig, PageConfig, Result,
    ToolRunner, ToolsConfig,
};

use crate::assembler::{self, AssemblyContext};
use crate::cover;
use crate::typeset::{self, OutputTarget};

/// Configuration for the `build_journal` pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Metadata table (CSV).
    pub table: PathBuf,
    /// Directory searched for contribution files.
    pub contribs_dir: Option<PathBuf>,
    /// Requested PDF path.
    pub output: PathBuf,
    pub issue: IssueInfo,
    pub kinds: KindFilter,
    /// Keep the assembled `.tex` next to the PDF.
    pub keep_latex: bool,
    pub page: PageConfig,
    pub masthead: MastheadConfig,
    pub tools: ToolsConfig,
    /// Directory for fragments and the temporary document (system temp
    /// dir when `None`).
    pub scratch_dir: Option<PathBuf>,
}

/// Result of the `build_journal` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    pub pdf_path: PathBuf,
    /// Records read from the metadata table.
    pub record_count: usize,
    /// Contributions placed in the document.
    pub included: usize,
    /// Contributions left out by the kind filter.
    pub skipped: usize,
    /// SHA-256 of the assembled LaTeX document.
    pub latex_sha256: String,
    /// Where the assembled document was kept, if requested.
    pub latex_path: Option<PathBuf>,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each contribution is converted.
    fn contribution_converted(&self, title: &str, current: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn contribution_converted(&self, _title: &str, _current: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Check inputs (table, contributions directory, cover art, color)
/// 2. Convert each contribution to a LaTeX fragment
/// 3. Assemble the journal document
/// 4. Typeset it
/// 5. Remove the fragments
#[instrument(skip_all, fields(table = %config.table.display(), output = %config.output.display()))]
pub fn build_journal(
    config: &BuildConfig,
    runner: &dyn ToolRunner,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();

    info!(
        volume = %config.issue.volume,
        number = %config.issue.number,
        "starting build pipeline"
    );

    // --- Phase 1: Inputs ---
    progress.phase("Checking inputs");
    check_inputs(config)?;
    let cover = config
        .issue
        .cover_art
        .as_deref()
        .map(|path| cover::prepare_cover(path, &config.page))
        .transpose()?;
    let target = OutputTarget::from_output_path(&config.output)?;
    let table = MetadataTable::open(&config.table)?;

    // --- Phase 2: Convert ---
    progress.phase("Converting contributions");
    let converter = Converter::new(&config.tools, runner)
        .with_contribs_dir(config.contribs_dir.clone())
        .with_scratch_dir(config.scratch_dir.clone());
    let fragments = converter.convert_all(
        table.records(),
        &PipelineConvertProgress { inner: progress },
    )?;

    if fragments.is_empty() {
        warn!("metadata table has no contributions");
    }

    // --- Phase 3: Assemble ---
    progress.phase("Assembling document");
    let ctx = AssemblyContext {
        page: &config.page,
        masthead: &config.masthead,
        issue: &config.issue,
        cover: cover.as_ref(),
        year: chrono::Local::now().year(),
        kinds: &config.kinds,
    };
    let document = assembler::assemble(&ctx, &fragments)?;
    let latex_sha256 = document.sha256();

    // --- Phase 4: Typeset ---
    progress.phase("Typesetting");
    target.ensure_dir()?;

    // The temporary document must outlive the typesetter run.
    let (document_path, _temp_document) = if config.keep_latex {
        let path = target.output_dir.join(format!("{}.tex", target.job_name));
        document.write_to(&path)?;
        (path, None)
    } else {
        let temp = write_temp_document(config, &document.latex)?;
        (temp.path().to_path_buf(), Some(temp))
    };

    let typeset_result = typeset::typeset(&config.tools, &target, &document_path, runner)?;

    // --- Phase 5: Clean up ---
    let record_count = fragments.len();
    let removed = fragments.cleanup()?;
    info!(removed, "fragments removed");

    let result = BuildResult {
        pdf_path: typeset_result.pdf_path,
        record_count,
        included: document.included.len(),
        skipped: document.skipped.len(),
        latex_sha256,
        latex_path: config.keep_latex.then_some(document_path),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        pdf = %result.pdf_path.display(),
        included = result.included,
        skipped = result.skipped,
        sha256 = %result.latex_sha256,
        elapsed_ms = result.elapsed.as_millis(),
        "build pipeline complete"
    );

    Ok(result)
}

/// Validate settings that do not depend on the table's contents.
fn check_inputs(config: &BuildConfig) -> Result<()> {
    if !config.table.is_file() {
        return Err(JournalError::config(format!(
            "no database file; should be {}",
            config.table.display()
        )));
    }

    if let Some(dir) = &config.contribs_dir {
        if !dir.is_dir() {
            return Err(JournalError::config(format!(
                "directory of contributions {} is not a directory",
                dir.display()
            )));
        }
    }

    validate_color(&config.issue.title_color)?;

    if config.tools.typeset_passes == 0 {
        return Err(JournalError::validation("typeset_passes must be at least 1"));
    }

    Ok(())
}

fn write_temp_document(config: &BuildConfig, latex: &str) -> Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("journal-").suffix(".tex");

    let dir = config
        .scratch_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);

    let mut file = builder
        .tempfile_in(&dir)
        .map_err(|e| JournalError::io(&dir, e))?;
    if let Err(e) = file.write_all(latex.as_bytes()) {
        return Err(JournalError::io(file.path(), e));
    }

    Ok(file)
}

// ---------------------------------------------------------------------------
// Conversion progress adapter
// ---------------------------------------------------------------------------

/// Adapts a `ProgressReporter` to the `ConvertProgress` interface.
struct PipelineConvertProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl ConvertProgress for PipelineConvertProgress<'_> {
    fn converted(&self, record: &ContributionRecord, current: usize) {
        self.inner.contribution_converted(&record.title, current);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
