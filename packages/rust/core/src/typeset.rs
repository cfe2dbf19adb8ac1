//! Typesetter invocation.
//!
//! Runs the typesetter over the assembled document as many times as
//! configured (twice by default: the second pass picks up the page numbers
//! and table of contents recorded by the first).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use journalbuilder_shared::{JournalError, Result, ToolInvocation, ToolRunner, ToolsConfig};

/// Lines of typesetter output kept in an error.
const DIAGNOSTIC_LINES: usize = 12;

/// Where the typesetter writes its PDF and auxiliary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Base name for the PDF, log, and aux files.
    pub job_name: String,
    pub output_dir: PathBuf,
}

impl OutputTarget {
    /// Derive the job name and directory from the requested output file,
    /// e.g. `out/issue-3.pdf` gives job `issue-3` in `out/`.
    pub fn from_output_path(output: &Path) -> Result<Self> {
        let job_name = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                JournalError::validation(format!(
                    "output path {} has no file name",
                    output.display()
                ))
            })?;

        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let output_dir = std::path::absolute(parent).map_err(|e| JournalError::io(parent, e))?;

        Ok(Self {
            job_name,
            output_dir,
        })
    }

    /// The PDF the typesetter is expected to produce.
    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.job_name))
    }

    /// Create the output directory if needed.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| JournalError::io(&self.output_dir, e))
    }
}

/// Outcome of a successful typesetting run.
#[derive(Debug, Clone)]
pub struct TypesetResult {
    pub pdf_path: PathBuf,
    pub passes: u32,
}

/// Build the invocation for one typesetter pass.
pub fn typeset_invocation(
    tools: &ToolsConfig,
    target: &OutputTarget,
    document: &Path,
) -> ToolInvocation {
    let mut output_dir = OsString::from("-output-directory=");
    output_dir.push(target.output_dir.as_os_str());

    ToolInvocation::new(&tools.typesetter)
        .args(&tools.typesetter_args)
        .arg(format!("-jobname={}", target.job_name))
        .arg(output_dir)
        .arg(document.as_os_str())
}

/// Typeset `document` into `target`.
///
/// Every pass must exit successfully, and the PDF must exist afterwards.
#[instrument(skip_all, fields(job = %target.job_name, passes = tools.typeset_passes))]
pub fn typeset(
    tools: &ToolsConfig,
    target: &OutputTarget,
    document: &Path,
    runner: &dyn ToolRunner,
) -> Result<TypesetResult> {
    if tools.typeset_passes == 0 {
        return Err(JournalError::validation("typeset_passes must be at least 1"));
    }

    target.ensure_dir()?;
    let invocation = typeset_invocation(tools, target, document);

    for pass in 1..=tools.typeset_passes {
        info!(pass, "running typesetter");
        let output = runner.run(&invocation)?;
        if !output.success() {
            return Err(JournalError::typeset(format!(
                "{} {} on pass {pass}:\n{}",
                output.program,
                output.status_text(),
                output.diagnostic_tail(DIAGNOSTIC_LINES)
            )));
        }
    }

    let pdf_path = target.pdf_path();
    if !pdf_path.is_file() {
        return Err(JournalError::typeset(format!(
            "{} reported success but {} was not written",
            tools.typesetter,
            pdf_path.display()
        )));
    }

    info!(pdf = %pdf_path.display(), "typesetting complete");

    Ok(TypesetResult {
        pdf_path,
        passes: tools.typeset_passes,
    })
}
