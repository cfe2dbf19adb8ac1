//! Typed LaTeX templates.
//!
//! Each block of the assembled document is a small record with a pure
//! `render` method. Free text coming from the metadata table or the command
//! line is escaped here; colors and image paths are validated by the caller
//! (see [`crate::escape`]).

use journalbuilder_shared::{CoverFit, MastheadConfig, PageConfig};

use crate::escape::escape_text;

/// Document class, packages, and page geometry.
#[derive(Debug, Clone, Copy)]
pub struct Preamble<'a> {
    pub page: &'a PageConfig,
}

impl Preamble<'_> {
    pub fn render(&self) -> String {
        let width = self.page.width_in;
        let height = self.page.height_in;
        format!(
            r"
% journal-style document, 12 point text
% openany: start each article on the next page, odd or even
\documentclass[12pt,journal,openany]{{paper}}
% skip space between paragraphs instead of indenting them
\usepackage{{parskip}}
\usepackage[paperwidth={width}in, paperheight={height}in]{{geometry}}
\usepackage[english]{{babel}}
\usepackage{{microtype}}
% dvips color names
\usepackage[dvipsnames]{{xcolor}}
% control over page headers
\usepackage{{fancyhdr}}
\pagestyle{{fancy}}
\usepackage[colorlinks,linkcolor=blue!50!black]{{hyperref}}
\usepackage{{graphicx}}
% boxes behind text
\usepackage[most]{{tcolorbox}}
"
        )
    }
}

/// Full-page cover art drawn behind the title page.
///
/// Rendered in two parts: the `\BackgroundPic` definition belongs in the
/// preamble, the shipout hook right after `\begin{document}`.
#[derive(Debug, Clone, Copy)]
pub struct CoverBackground<'a> {
    /// Image path, already checked with [`crate::escape::latex_path`].
    pub image: &'a str,
    pub fit: CoverFit,
}

impl CoverBackground<'_> {
    pub fn render_definition(&self) -> String {
        let fit = fit_directive(self.fit);
        let image = self.image;
        format!(
            r"
% cover art behind the title page
\usepackage{{transparent}}
\usepackage{{eso-pic}}
\newcommand\BackgroundPic{{%
\put(0,0){{%
\parbox[b][\paperheight]{{\paperwidth}}{{%
\vfill
\centering
{{\includegraphics[{fit},keepaspectratio,clip]{{{image}}}}}%
\vfill
}}}}}}
"
        )
    }

    pub fn render_shipout(&self) -> String {
        r"
% background picture on the title page
\AddToShipoutPicture*{\BackgroundPic}
"
        .to_string()
    }
}

/// `\includegraphics` size option for a cover fit.
pub fn fit_directive(fit: CoverFit) -> &'static str {
    match fit {
        CoverFit::Width => r"width=\paperwidth",
        CoverFit::Height => r"height=\paperheight",
    }
}

/// End of preamble.
pub fn render_begin_document() -> String {
    r"
%
% End of preamble
%
\begin{document}
"
    .to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct TitlePage<'a> {
    /// Heading lines, separated by a blank line on the page.
    pub heading_lines: &'a [String],
    /// Validated xcolor expression.
    pub color: &'a str,
    pub volume: &'a str,
    pub number: &'a str,
    pub issue_date: &'a str,
}

impl TitlePage<'_> {
    pub fn render(&self) -> String {
        let heading = self
            .heading_lines
            .iter()
            .map(|line| escape_text(line))
            .collect::<Vec<_>>()
            .join(r"\linebreak\linebreak ");
        let color = self.color;
        let volume = escape_text(self.volume);
        let number = escape_text(self.number);
        let issue_date = escape_text(self.issue_date);
        format!(
            r"
\begin{{titlepage}}
\begin{{tcolorbox}}
\begin{{center}}
\textbf{{\Large \color{{{color}}} {heading}}}
\end{{center}}
\end{{tcolorbox}}
\vfill
\begin{{tcolorbox}}
\begin{{center}}
{{\large Volume {volume}, Number {number}, {issue_date}}}
\end{{center}}
\end{{tcolorbox}}

\end{{titlepage}}
"
        )
    }
}

/// Copyright and editorial credits page.
#[derive(Debug, Clone, Copy)]
pub struct Masthead<'a> {
    pub config: &'a MastheadConfig,
    /// Copyright year.
    pub year: i32,
    pub cover_credit: Option<&'a str>,
}

impl Masthead<'_> {
    pub fn render(&self) -> String {
        let journal_title = escape_text(&self.config.journal_title);
        let tagline = escape_text(&self.config.tagline);
        let publisher = escape_text(&self.config.publisher);
        let editor = escape_text(&self.config.editor_in_chief);
        let representative = escape_text(&self.config.publishers_representative);
        let year = self.year;

        let contributing = if self.config.contributing_editors.is_empty() {
            String::new()
        } else {
            let names = self
                .config
                .contributing_editors
                .iter()
                .map(|name| escape_text(name))
                .collect::<Vec<_>>()
                .join(", ");
            format!("\\linebreak\n{{Contributing Editors: {names}}}\n")
        };

        let cover = match self.cover_credit {
            Some(credit) => format!(
                "{{Cover illustration: {}}}\n\\vfill\n",
                escape_text(credit)
            ),
            None => String::new(),
        };

        format!(
            r"
\thispagestyle{{empty}}
\begin{{center}}
{{\large {journal_title}}}
\linebreak
{{{tagline}}}
\linebreak
\linebreak
{{Copyright \copyright\ {year}, {publisher}}}
\vfill
{{Editor-in-chief: {editor}}}
{contributing}\vfill
{cover}{{Publisher's Representative: {representative}}}
\linebreak
{{\sc Published periodically by {publisher}.}}
\end{{center}}
%
% End of front matter
%
\setcounter{{page}}{{0}}
\newpage
"
        )
    }
}

/// Table of contents, filled in by the typesetter's second pass.
pub fn render_contents() -> String {
    r"
\pagestyle{empty}
\journalcontents
"
    .to_string()
}

/// Switch to article layout before the first contribution.
pub fn render_contributions_start() -> String {
    r"
\journalpart[]{}
\renewcommand*\rmdefault{tmr}
\pagestyle{fancy}
\fancyhf{}
"
    .to_string()
}

/// Title block and running headers for one contribution.
#[derive(Debug, Clone, Copy)]
pub struct ContributionHeader<'a> {
    pub index: u32,
    pub title: &'a str,
    pub author: &'a str,
}

/// Marker comment opening every contribution block.
pub const ARTICLE_MARKER: &str = "% ARTICLE ";

impl ContributionHeader<'_> {
    pub fn render(&self) -> String {
        let index = self.index;
        let title = escape_text(self.title);
        let author = escape_text(self.author);
        format!(
            r"

{ARTICLE_MARKER}{index}

\newpage
\title{{{title}}}
\author{{{author}}}
\shortauthor{{{author}}}
\maketitle
\bigskip
% running header carries the title
\fancyhead{{}}
\fancyhead[RE,LO]{{\textit{{{title}}}}}
\fancyhead[LE,RO]{{\thepage}}
"
        )
    }
}

/// A full-page illustration with its title as caption.
#[derive(Debug, Clone, Copy)]
pub struct Illustration<'a> {
    pub index: u32,
    pub title: &'a str,
    pub author: &'a str,
    /// Image path, already checked with [`crate::escape::latex_path`].
    pub image: &'a str,
}

impl Illustration<'_> {
    pub fn render(&self) -> String {
        let index = self.index;
        let title = escape_text(self.title);
        let author = escape_text(self.author);
        let image = self.image;
        format!(
            r"

{ARTICLE_MARKER}{index}

\newpage
\title{{{title}}}
\author{{{author}}}
\maketitle
\bigskip
\begin{{figure}}[b!]
\includegraphics[width=\linewidth]{{{image}}}
\caption{{{title}}}
\end{{figure}}
"
        )
    }
}

pub fn render_footer() -> String {
    r"
\end{document}
"
    .to_string()
}
