//! Shared types, error model, configuration, and the external-tool seam
//! for journalbuilder.
//!
//! This crate is the foundation depended on by all other journalbuilder crates.
//! It provides:
//! - [`JournalError`] — the unified error type
//! - Domain types ([`ContributionRecord`], [`ContributionKind`], [`IssueInfo`], [`KindFilter`])
//! - Configuration ([`AppConfig`], [`PageConfig`], [`MastheadConfig`], config loading)
//! - External process invocation ([`ToolRunner`], [`ToolOutput`])

pub mod config;
pub mod error;
pub mod process;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, MastheadConfig, PageConfig, ToolsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{JournalError, Result};
pub use process::{
    SystemRunner, ToolInvocation, ToolOutput, ToolRunner, ToolStatus, check_tool_available,
};
pub use types::{ContributionKind, ContributionRecord, CoverFit, IssueInfo, KindFilter};
