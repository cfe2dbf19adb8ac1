//! Journal document assembler.
//!
//! Takes the converted fragments, issue settings, and front-matter
//! configuration, then concatenates everything into the single LaTeX
//! document handed to the typesetter.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use journalbuilder_convert::{FragmentBody, FragmentSet};
use journalbuilder_latex::{
    ContributionHeader, CoverBackground, Illustration, Masthead, Preamble, TitlePage, latex_path,
    render_verse, templates, validate_color,
};
use journalbuilder_shared::{
    ContributionKind, ContributionRecord, IssueInfo, JournalError, KindFilter, MastheadConfig,
    PageConfig, Result,
};

use crate::cover::CoverImage;

/// Everything besides the contributions that shapes the document.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub page: &'a PageConfig,
    pub masthead: &'a MastheadConfig,
    pub issue: &'a IssueInfo,
    pub cover: Option<&'a CoverImage>,
    /// Copyright year printed on the masthead.
    pub year: i32,
    pub kinds: &'a KindFilter,
}

/// Content of one contribution, ready to render.
#[derive(Debug, Clone)]
pub enum EntryBody {
    /// Converted LaTeX fragment text.
    Latex(String),
    /// Image path as written into the document.
    Image(String),
}

/// A contribution to place in the document.
#[derive(Debug, Clone)]
pub struct AssemblyEntry<'a> {
    pub record: &'a ContributionRecord,
    pub body: EntryBody,
}

/// The assembled LaTeX document.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub latex: String,
    /// Indices of contributions placed in the document, in order.
    pub included: Vec<u32>,
    /// Indices left out by the kind filter.
    pub skipped: Vec<u32>,
}

impl AssembledDocument {
    /// Hex SHA-256 of the document text.
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.latex.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Write the document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.latex).map_err(|e| JournalError::io(path, e))?;
        debug!(path = %path.display(), bytes = self.latex.len(), "wrote assembled document");
        Ok(())
    }
}

/// Read every fragment and assemble the document.
#[instrument(skip_all, fields(fragments = fragments.len()))]
pub fn assemble(ctx: &AssemblyContext<'_>, fragments: &FragmentSet) -> Result<AssembledDocument> {
    let mut entries = Vec::with_capacity(fragments.len());

    for fragment in fragments.iter() {
        let body = match &fragment.body {
            FragmentBody::Latex(path) => EntryBody::Latex(
                std::fs::read_to_string(path).map_err(|e| JournalError::io(&**path, e))?,
            ),
            FragmentBody::Image(path) => EntryBody::Image(latex_path(path)?),
        };
        entries.push(AssemblyEntry {
            record: &fragment.record,
            body,
        });
    }

    render_document(ctx, &entries)
}

/// Render the complete document from in-memory entries.
///
/// Entries are placed in ascending index order whatever order they arrive
/// in. The output depends only on the inputs, so identical inputs give
/// byte-identical documents.
pub fn render_document(
    ctx: &AssemblyContext<'_>,
    entries: &[AssemblyEntry<'_>],
) -> Result<AssembledDocument> {
    validate_color(&ctx.issue.title_color)?;

    let cover = ctx.cover.map(|c| CoverBackground {
        image: &c.latex_path,
        fit: c.fit,
    });

    let mut latex = String::new();

    // Front matter
    latex.push_str(&Preamble { page: ctx.page }.render());
    if let Some(cover) = &cover {
        latex.push_str(&cover.render_definition());
    }
    latex.push_str(&templates::render_begin_document());
    if let Some(cover) = &cover {
        latex.push_str(&cover.render_shipout());
    }
    latex.push_str(
        &TitlePage {
            heading_lines: &ctx.masthead.title_page_lines,
            color: &ctx.issue.title_color,
            volume: &ctx.issue.volume,
            number: &ctx.issue.number,
            issue_date: &ctx.issue.issue_date,
        }
        .render(),
    );
    latex.push_str(
        &Masthead {
            config: ctx.masthead,
            year: ctx.year,
            cover_credit: ctx.issue.cover_credit.as_deref(),
        }
        .render(),
    );
    latex.push_str(&templates::render_contents());
    latex.push_str(&templates::render_contributions_start());

    // Contributions
    let mut ordered: Vec<&AssemblyEntry<'_>> = entries.iter().collect();
    ordered.sort_by_key(|e| e.record.index);

    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for entry in ordered {
        let record = entry.record;
        if !ctx.kinds.includes(&record.kind) {
            debug!(index = record.index, kind = %record.kind, "kind filtered out");
            skipped.push(record.index);
            continue;
        }

        match &entry.body {
            EntryBody::Latex(text) => {
                latex.push_str(
                    &ContributionHeader {
                        index: record.index,
                        title: &record.title,
                        author: &record.author,
                    }
                    .render(),
                );
                if record.kind == ContributionKind::Poem {
                    latex.push_str(&render_verse(text));
                } else {
                    latex.push_str(text);
                }
            }
            EntryBody::Image(image) => {
                latex.push_str(
                    &Illustration {
                        index: record.index,
                        title: &record.title,
                        author: &record.author,
                        image,
                    }
                    .render(),
                );
            }
        }
        included.push(record.index);
    }

    latex.push_str(&templates::render_footer());

    info!(
        included = included.len(),
        skipped = skipped.len(),
        bytes = latex.len(),
        "document assembled"
    );

    Ok(AssembledDocument {
        latex,
        included,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use journalbuilder_latex::ARTICLE_MARKER;
    use journalbuilder_shared::CoverFit;

    fn issue() -> IssueInfo {
        IssueInfo {
            volume: "2".into(),
            number: "4".into(),
            issue_date: "Winter 2025".into(),
            title_color: "Black".into(),
            cover_art: None,
            cover_credit: None,
        }
    }

    fn record(index: u32, kind: &str, title: &str) -> ContributionRecord {
        ContributionRecord {
            index,
            author: format!("Author {index}"),
            title: title.into(),
            email: format!("a{index}@example.com"),
            kind: ContributionKind::from(kind),
            filename: format!("{index}.docx"),
        }
    }

    fn latex_entry<'a>(record: &'a ContributionRecord, body: &str) -> AssemblyEntry<'a> {
        AssemblyEntry {
            record,
            body: EntryBody::Latex(body.into()),
        }
    }

    struct Fixture {
        page: PageConfig,
        masthead: MastheadConfig,
        issue: IssueInfo,
        kinds: KindFilter,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                page: PageConfig::default(),
                masthead: MastheadConfig::default(),
                issue: issue(),
                kinds: KindFilter::All,
            }
        }

        fn ctx(&self) -> AssemblyContext<'_> {
            AssemblyContext {
                page: &self.page,
                masthead: &self.masthead,
                issue: &self.issue,
                cover: None,
                year: 2025,
                kinds: &self.kinds,
            }
        }
    }

    fn article_indices(latex: &str) -> Vec<u32> {
        latex
            .lines()
            .filter_map(|l| l.strip_prefix(ARTICLE_MARKER))
            .map(|n| n.trim().parse().unwrap())
            .collect()
    }

    #[test]
    fn contributions_in_ascending_index_order() {
        let fx = Fixture::new();
        let records = [
            record(12, "story", "Twelve"),
            record(3, "story", "Three"),
            record(7, "poem", "Seven"),
        ];
        let entries: Vec<_> = records.iter().map(|r| latex_entry(r, "Text.\n")).collect();

        let doc = render_document(&fx.ctx(), &entries).unwrap();

        assert_eq!(article_indices(&doc.latex), vec![3, 7, 12]);
        assert_eq!(doc.latex.matches(r"\maketitle").count(), 3);
        assert_eq!(doc.included, vec![3, 7, 12]);

        let three = doc.latex.find(r"\title{Three}").unwrap();
        let seven = doc.latex.find(r"\title{Seven}").unwrap();
        let twelve = doc.latex.find(r"\title{Twelve}").unwrap();
        assert!(three < seven && seven < twelve);
    }

    #[test]
    fn document_structure_in_fixed_order() {
        let fx = Fixture::new();
        let r = record(1, "story", "Only");
        let doc = render_document(&fx.ctx(), &[latex_entry(&r, "Once upon a time.\n")]).unwrap();
        let latex = &doc.latex;

        let positions: Vec<usize> = [
            r"\documentclass",
            r"\begin{document}",
            r"\begin{titlepage}",
            r"\thispagestyle{empty}",
            r"\journalcontents",
            r"\journalpart[]{}",
            r"\title{Only}",
            "Once upon a time.",
            r"\end{document}",
        ]
        .iter()
        .map(|needle| latex.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(latex.contains(r"{Copyright \copyright\ 2025, Adult Education Press}"));
        assert!(latex.contains(r"{\large Volume 2, Number 4, Winter 2025}"));
        assert!(!latex.contains("BackgroundPic"));
    }

    #[test]
    fn poems_are_set_as_verse() {
        let fx = Fixture::new();
        let r = record(1, "poem", "Salt");
        let doc = render_document(&fx.ctx(), &[latex_entry(&r, "Line one\n\nLine two\n")]).unwrap();
        assert!(
            doc.latex
                .contains("\\begin{verse}\nLine one\n\\\\\nLine two\n\\end{verse}\n")
        );
    }

    #[test]
    fn stories_are_verbatim() {
        let fx = Fixture::new();
        let r = record(1, "story", "Prose");
        let body = "First paragraph.\n\nSecond \\emph{paragraph}.\n";
        let doc = render_document(&fx.ctx(), &[latex_entry(&r, body)]).unwrap();
        assert!(doc.latex.contains(body));
        assert!(!doc.latex.contains(r"\begin{verse}"));
    }

    #[test]
    fn kind_filter_skips_records() {
        let mut fx = Fixture::new();
        fx.kinds = KindFilter::from_names(["story", "poem"]);
        let records = [
            record(1, "story", "Kept Story"),
            record(2, "essay", "Dropped Essay"),
            record(3, "poem", "Kept Poem"),
            record(4, "", "Dropped Untyped"),
        ];
        let entries: Vec<_> = records.iter().map(|r| latex_entry(r, "x\n")).collect();

        let doc = render_document(&fx.ctx(), &entries).unwrap();
        assert_eq!(doc.included, vec![1, 3]);
        assert_eq!(doc.skipped, vec![2, 4]);
        assert!(!doc.latex.contains("Dropped"));
    }

    #[test]
    fn illustrations_render_figures() {
        let fx = Fixture::new();
        let r = record(5, "illustration", "Harbor");
        let entry = AssemblyEntry {
            record: &r,
            body: EntryBody::Image("/srv/art/harbor.png".into()),
        };
        let doc = render_document(&fx.ctx(), &[entry]).unwrap();
        assert!(doc.latex.contains(r"\includegraphics[width=\linewidth]{/srv/art/harbor.png}"));
        assert_eq!(doc.included, vec![5]);
    }

    #[test]
    fn cover_block_included_when_configured() {
        let mut fx = Fixture::new();
        fx.issue.cover_credit = Some("Dana Cole".into());
        let cover = CoverImage {
            path: "/srv/art/cover.png".into(),
            latex_path: "/srv/art/cover.png".into(),
            width_px: 600,
            height_px: 1200,
            fit: CoverFit::Width,
        };
        let mut ctx = fx.ctx();
        ctx.cover = Some(&cover);

        let doc = render_document(&ctx, &[]).unwrap();
        let latex = &doc.latex;
        let definition = latex.find(r"\newcommand\BackgroundPic").unwrap();
        let begin = latex.find(r"\begin{document}").unwrap();
        let shipout = latex.find(r"\AddToShipoutPicture*{\BackgroundPic}").unwrap();
        assert!(definition < begin && begin < shipout);
        assert!(latex.contains(r"[width=\paperwidth,keepaspectratio,clip]{/srv/art/cover.png}"));
        assert!(latex.contains("{Cover illustration: Dana Cole}"));
    }

    #[test]
    fn metadata_text_is_escaped() {
        let fx = Fixture::new();
        let r = ContributionRecord {
            author: "R&B Collective".into(),
            ..record(1, "story", "Costs $5 #1")
        };
        let doc = render_document(&fx.ctx(), &[latex_entry(&r, "x\n")]).unwrap();
        assert!(doc.latex.contains(r"\title{Costs \$5 \#1}"));
        assert!(doc.latex.contains(r"\author{R\&B Collective}"));
    }

    #[test]
    fn invalid_title_color_is_rejected() {
        let mut fx = Fixture::new();
        fx.issue.title_color = "Black}\\input{x".into();
        let err = render_document(&fx.ctx(), &[]).unwrap_err();
        assert!(matches!(err, JournalError::Config { .. }));
    }

    #[test]
    fn rendering_is_deterministic() {
        let fx = Fixture::new();
        let records = [record(2, "poem", "B"), record(1, "story", "A")];
        let entries: Vec<_> = records.iter().map(|r| latex_entry(r, "line\n\nline\n")).collect();

        let first = render_document(&fx.ctx(), &entries).unwrap();
        let mut reversed = entries.clone();
        reversed.reverse();
        let second = render_document(&fx.ctx(), &reversed).unwrap();

        assert_eq!(first.latex, second.latex);
        assert_eq!(first.sha256(), second.sha256());
        assert_eq!(first.sha256().len(), 64);
    }

    #[test]
    fn assemble_reads_fragments_from_disk() {
        use journalbuilder_convert::{Fragment, FragmentBody};

        let dir = tempfile::tempdir().unwrap();
        let mut set = FragmentSet::new();
        for (index, text) in [(2, "Second body.\n"), (1, "First body.\n")] {
            let temp = tempfile::Builder::new()
                .suffix(".latex")
                .tempfile_in(dir.path())
                .unwrap()
                .into_temp_path();
            std::fs::write(&temp, text).unwrap();
            set.insert(Fragment {
                record: record(index, "story", &format!("Piece {index}")),
                source: dir.path().join(format!("{index}.docx")),
                body: FragmentBody::Latex(temp),
            })
            .unwrap();
        }

        let fx = Fixture::new();
        let doc = assemble(&fx.ctx(), &set).unwrap();
        let first = doc.latex.find("First body.").unwrap();
        let second = doc.latex.find("Second body.").unwrap();
        assert!(first < second);
        assert_eq!(doc.included, vec![1, 2]);
    }

    #[test]
    fn write_to_persists_document() {
        let fx = Fixture::new();
        let doc = render_document(&fx.ctx(), &[]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issue.tex");
        doc.write_to(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.latex);
    }
}
