//! External tool invocation.
//!
//! Every call out to the converter or the typesetter goes through
//! [`ToolRunner`], which returns a [`ToolOutput`] carrying the exit status and
//! the captured output. Callers decide what a failure means; nothing here
//! ignores a status.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use crate::error::{JournalError, Result};

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Render as a shell-like line for logs and error messages.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// How a tool process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Exited with this code.
    Exited(i32),
    /// Killed by a signal before exiting.
    Terminated,
}

/// Result of running a [`ToolInvocation`].
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub program: String,
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == ToolStatus::Exited(0)
    }

    /// Human-readable status for error messages.
    pub fn status_text(&self) -> String {
        match self.status {
            ToolStatus::Exited(code) => format!("exited with status {code}"),
            ToolStatus::Terminated => "was terminated by a signal".to_string(),
        }
    }

    /// The last `max_lines` non-empty lines of stderr, falling back to stdout
    /// (TeX engines report errors on stdout).
    pub fn diagnostic_tail(&self, max_lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };

        let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

/// Runs external tools. Swapped out in tests.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput>;
}

/// Runs tools as child processes, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %invocation.program))]
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        debug!(command = %invocation.display_line(), "running external tool");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = command.output().map_err(|e| JournalError::Tool {
            program: invocation.program.clone(),
            source: e,
        })?;

        let status = match output.status.code() {
            Some(code) => ToolStatus::Exited(code),
            None => ToolStatus::Terminated,
        };

        debug!(?status, "external tool finished");

        Ok(ToolOutput {
            program: invocation.program.clone(),
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Check that `program` can be launched, returning the first line of its
/// `--version` output.
pub fn check_tool_available(runner: &dyn ToolRunner, program: &str) -> Result<String> {
    let output = runner.run(&ToolInvocation::new(program).arg("--version"))?;

    if !output.success() {
        return Err(JournalError::config(format!(
            "`{program} --version` {}",
            output.status_text()
        )));
    }

    Ok(output
        .stdout
        .lines()
        .next()
        .unwrap_or("unknown")
        .trim()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(status: ToolStatus, stdout: &str, stderr: &str) -> ToolOutput {
        ToolOutput {
            program: "tool".into(),
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    #[test]
    fn success_requires_zero_exit() {
        assert!(output(ToolStatus::Exited(0), "", "").success());
        assert!(!output(ToolStatus::Exited(1), "", "").success());
        assert!(!output(ToolStatus::Terminated, "", "").success());
    }

    #[test]
    fn diagnostic_tail_prefers_stderr() {
        let out = output(ToolStatus::Exited(1), "stdout line", "a\n\nb\nc\n");
        assert_eq!(out.diagnostic_tail(2), "b\nc");
    }

    #[test]
    fn diagnostic_tail_falls_back_to_stdout() {
        let out = output(
            ToolStatus::Exited(1),
            "This is pdfTeX\n! Undefined control sequence.\nl.12 \\foo\n",
            "  \n",
        );
        assert_eq!(out.diagnostic_tail(5), "This is pdfTeX\n! Undefined control sequence.\nl.12 \\foo");
    }

    #[test]
    fn invocation_display_line() {
        let inv = ToolInvocation::new("pandoc")
            .arg("--to=latex")
            .args(["--output=/tmp/x.latex", "story.docx"]);
        assert_eq!(inv.display_line(), "pandoc --to=latex --output=/tmp/x.latex story.docx");
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let err = SystemRunner
            .run(&ToolInvocation::new("journalbuilder-no-such-tool-xyz"))
            .unwrap_err();
        assert!(matches!(err, JournalError::Tool { .. }));
    }

    struct FixedRunner(ToolOutput);

    impl ToolRunner for FixedRunner {
        fn run(&self, _invocation: &ToolInvocation) -> Result<ToolOutput> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn check_tool_available_returns_first_line() {
        let runner = FixedRunner(output(
            ToolStatus::Exited(0),
            "pandoc 3.1.11\nFeatures: +server\n",
            "",
        ));
        assert_eq!(check_tool_available(&runner, "pandoc").unwrap(), "pandoc 3.1.11");

        let runner = FixedRunner(output(ToolStatus::Exited(2), "", "boom"));
        assert!(check_tool_available(&runner, "pandoc").is_err());
    }
}
