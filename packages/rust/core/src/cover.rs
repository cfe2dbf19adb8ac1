//! Cover art inspection.
//!
//! Reads the cover image's pixel size and decides whether it should be
//! scaled to the page width or the page height.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use journalbuilder_latex::latex_path;
use journalbuilder_shared::{CoverFit, JournalError, PageConfig, Result};

/// A cover image ready to be placed on the title page.
#[derive(Debug, Clone)]
pub struct CoverImage {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// The same path as written into the LaTeX document.
    pub latex_path: String,
    pub width_px: u32,
    pub height_px: u32,
    pub fit: CoverFit,
}

/// Check that the cover image exists and is readable, and compute its fit.
#[instrument(skip(page), fields(path = %path.display()))]
pub fn prepare_cover(path: &Path, page: &PageConfig) -> Result<CoverImage> {
    if !path.exists() {
        return Err(JournalError::config(format!(
            "specified cover image {} does not exist",
            path.display()
        )));
    }

    let (width_px, height_px) = image::image_dimensions(path).map_err(|e| {
        JournalError::config(format!("cannot read cover image {}: {e}", path.display()))
    })?;

    if width_px == 0 || height_px == 0 {
        return Err(JournalError::config(format!(
            "cover image {} has no pixels",
            path.display()
        )));
    }

    let fit = CoverFit::for_image(width_px, height_px, page.aspect());
    let absolute = std::path::absolute(path).map_err(|e| JournalError::io(path, e))?;
    let latex_path = latex_path(&absolute)?;

    debug!(width_px, height_px, ?fit, "cover image measured");

    Ok(CoverImage {
        path: absolute,
        latex_path,
        width_px,
        height_px,
        fit,
    })
}
