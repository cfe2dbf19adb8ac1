//! Escaping of user-supplied text for LaTeX.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use journalbuilder_shared::{JournalError, Result};

/// Escape text so LaTeX typesets it literally.
///
/// Handles the ten characters that are special in running text. Newlines
/// collapse to spaces since every substitution site is a single line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' => out.push_str(r"\$"),
            '&' => out.push_str(r"\&"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '%' => out.push_str(r"\%"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\r' => {}
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Render a filesystem path for `\includegraphics`.
///
/// On Windows, separators become forward slashes. Elsewhere a backslash is
/// part of the file name, so it is rejected along with every other character
/// that would change the meaning of the surrounding LaTeX.
pub fn latex_path(path: &Path) -> Result<String> {
    let rendered = path.to_string_lossy();
    #[cfg(windows)]
    let rendered = rendered.replace('\\', "/");
    #[cfg(not(windows))]
    let rendered = rendered.into_owned();

    if let Some(bad) = rendered
        .chars()
        .find(|c| matches!(c, '\\' | '{' | '}' | '%' | '#' | '$' | '^' | '&' | '~'))
    {
        return Err(JournalError::config(format!(
            "image path {} contains '{bad}', which LaTeX cannot include; rename the file",
            path.display()
        )));
    }

    Ok(rendered)
}

/// Check that `color` is an xcolor expression built from named colors,
/// e.g. `Black`, `MidnightBlue` or `blue!50!black`.
pub fn validate_color(color: &str) -> Result<()> {
    static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z]+(![0-9]{1,3}(![A-Za-z]+)?)*$").expect("valid regex")
    });

    if COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(JournalError::config(format!(
            "invalid title color '{color}': expected a dvips color name such as Black or MidnightBlue"
        )))
    }
}
