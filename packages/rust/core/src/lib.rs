//! Core pipeline orchestration for journalbuilder.
//!
//! This crate ties together the metadata table, fragment conversion, LaTeX
//! assembly, and typesetting into the end-to-end `build_journal` workflow.

pub mod assembler;
pub mod cover;
pub mod pipeline;
pub mod typeset;
