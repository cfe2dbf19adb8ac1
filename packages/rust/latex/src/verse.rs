//! Verse formatting for poems.

/// Explicit line break emitted in place of a blank line.
pub const LINE_BREAK: &str = r"\\";

/// Wrap a converted poem in a `verse` environment.
///
/// Non-blank lines are kept verbatim. Blank (or whitespace-only) lines become
/// an explicit `\\` so stanza breaks survive LaTeX's paragraph handling.
pub fn render_verse(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 64);
    out.push_str("\\begin{verse}\n");
    for line in fragment.lines() {
        if line.trim().is_empty() {
            out.push_str(LINE_BREAK);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str("\\end{verse}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_become_breaks() {
        let rendered = render_verse("Line one\n\nLine two\n");
        assert_eq!(
            rendered,
            "\\begin{verse}\nLine one\n\\\\\nLine two\n\\end{verse}\n"
        );
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        let rendered = render_verse("a\n   \t\nb");
        assert_eq!(rendered, "\\begin{verse}\na\n\\\\\nb\n\\end{verse}\n");
    }

    #[test]
    fn non_blank_lines_are_verbatim() {
        let rendered = render_verse("  indented \\emph{word}\n");
        assert!(rendered.contains("\n  indented \\emph{word}\n"));
    }

    #[test]
    fn empty_fragment() {
        assert_eq!(render_verse(""), "\\begin{verse}\n\\end{verse}\n");
    }
}
