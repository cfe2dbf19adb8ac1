//! LaTeX generation for journal issues.
//!
//! Typed templates for each block of the assembled document, escaping of
//! user-supplied text, and verse formatting for poems.

pub mod escape;
pub mod templates;
pub mod verse;

pub use escape::{escape_text, latex_path, validate_color};
pub use templates::{
    ARTICLE_MARKER, ContributionHeader, CoverBackground, Illustration, Masthead, Preamble,
    TitlePage, fit_directive,
};
pub use verse::{LINE_BREAK, render_verse};
