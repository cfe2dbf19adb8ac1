//! Core domain types for journal issues and their contributions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContributionKind
// ---------------------------------------------------------------------------

/// What sort of piece a contribution is.
///
/// Parsed case-insensitively from the metadata table's `kind` (or `type`)
/// column. Unrecognised values are kept lowercased so they can still be
/// matched by a [`KindFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContributionKind {
    Story,
    /// Set as verse: blank lines become explicit line breaks.
    Poem,
    /// An image placed on its own page instead of a converted document.
    Illustration,
    Other(String),
    /// The column was absent or empty.
    #[default]
    Unspecified,
}

impl ContributionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Story => "story",
            Self::Poem => "poem",
            Self::Illustration => "illustration",
            Self::Other(s) => s,
            Self::Unspecified => "",
        }
    }
}

impl From<String> for ContributionKind {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Unspecified,
            "story" => Self::Story,
            "poem" => Self::Poem,
            "illustration" => Self::Illustration,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<&str> for ContributionKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ContributionKind> for String {
    fn from(kind: ContributionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContributionRecord
// ---------------------------------------------------------------------------

/// One row of the metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Ordering key; contributions are printed in ascending index order.
    pub index: u32,
    pub author: String,
    pub title: String,
    pub email: String,
    #[serde(default, alias = "type")]
    pub kind: ContributionKind,
    /// Source document, relative to the working directory or the
    /// contributions directory.
    pub filename: String,
}

// ---------------------------------------------------------------------------
// KindFilter
// ---------------------------------------------------------------------------

/// Which contribution kinds make it into the assembled document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KindFilter {
    /// Every record is included.
    #[default]
    All,
    /// Only records whose kind is listed.
    Only(Vec<ContributionKind>),
}

impl KindFilter {
    /// Build a filter from kind names; an empty list means [`KindFilter::All`].
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kinds: Vec<ContributionKind> = names
            .into_iter()
            .map(|n| ContributionKind::from(n.as_ref()))
            .filter(|k| *k != ContributionKind::Unspecified)
            .collect();

        if kinds.is_empty() {
            Self::All
        } else {
            Self::Only(kinds)
        }
    }

    pub fn includes(&self, kind: &ContributionKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(kinds) => kinds.contains(kind),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueInfo
// ---------------------------------------------------------------------------

/// Per-issue settings supplied once per run.
#[derive(Debug, Clone)]
pub struct IssueInfo {
    pub volume: String,
    pub number: String,
    /// Free-form date string printed on the title page.
    pub issue_date: String,
    /// xcolor/dvips color for the title page heading.
    pub title_color: String,
    /// Full-page background image for the title page.
    pub cover_art: Option<PathBuf>,
    /// Credit line for the cover illustration.
    pub cover_credit: Option<String>,
}

// ---------------------------------------------------------------------------
// CoverFit
// ---------------------------------------------------------------------------

/// How the cover image is scaled onto the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFit {
    /// Scale to the paper width (image is narrower than the page).
    Width,
    /// Scale to the paper height.
    Height,
}

impl CoverFit {
    /// Pick the fit for an image of the given pixel size on a page of the
    /// given aspect ratio (width / height).
    pub fn for_image(width_px: u32, height_px: u32, page_aspect: f64) -> Self {
        let image_aspect = f64::from(width_px) / f64::from(height_px);
        if image_aspect < page_aspect {
            Self::Width
        } else {
            Self::Height
        }
    }
}
