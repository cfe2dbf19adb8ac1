//! Converted fragments, tracked by contribution index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use journalbuilder_shared::{ContributionRecord, JournalError, Result};

/// What a contribution contributes to the assembled document.
#[derive(Debug)]
pub enum FragmentBody {
    /// LaTeX produced by the converter. The file is deleted when dropped.
    Latex(TempPath),
    /// An image included as-is.
    Image(PathBuf),
}

/// One contribution after conversion.
#[derive(Debug)]
pub struct Fragment {
    pub record: ContributionRecord,
    /// Resolved absolute path of the source document.
    pub source: PathBuf,
    pub body: FragmentBody,
}

impl Fragment {
    /// Path of the converted LaTeX file, if this fragment has one.
    pub fn latex_path(&self) -> Option<&Path> {
        match &self.body {
            FragmentBody::Latex(path) => Some(&**path),
            FragmentBody::Image(_) => None,
        }
    }

    /// Read the converted LaTeX, if this fragment has any.
    pub fn read_latex(&self) -> Result<Option<String>> {
        match self.latex_path() {
            Some(path) => std::fs::read_to_string(path)
                .map(Some)
                .map_err(|e| JournalError::io(path, e)),
            None => Ok(None),
        }
    }
}

/// All fragments of a run, ordered by ascending contribution index.
///
/// Owns the temporary LaTeX files: dropping the set deletes them, so a run
/// that aborts halfway leaves nothing behind. [`FragmentSet::cleanup`] does
/// the same but reports deletion errors.
#[derive(Debug, Default)]
pub struct FragmentSet {
    fragments: BTreeMap<u32, Fragment>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.fragments.contains_key(&index)
    }

    /// Add a fragment. Indices must be unique.
    pub fn insert(&mut self, fragment: Fragment) -> Result<()> {
        let index = fragment.record.index;
        if self.contains(index) {
            return Err(duplicate_index(index));
        }
        self.fragments.insert(index, fragment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.values()
    }

    /// Number of temporary LaTeX files currently held.
    pub fn temp_file_count(&self) -> usize {
        self.iter().filter(|f| f.latex_path().is_some()).count()
    }

    /// Delete every temporary LaTeX file. Returns how many were removed.
    pub fn cleanup(self) -> Result<usize> {
        let mut removed = 0;
        for (index, fragment) in self.fragments {
            if let FragmentBody::Latex(path) = fragment.body {
                let removed_path = path.to_path_buf();
                path.close().map_err(|e| JournalError::io(&removed_path, e))?;
                debug!(index, path = %removed_path.display(), "removed fragment");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub(crate) fn duplicate_index(index: u32) -> JournalError {
    JournalError::metadata(format!("duplicate contribution index {index}"))
}
