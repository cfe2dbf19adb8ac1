//! Application configuration for journalbuilder.
//!
//! User config lives at `~/.journalbuilder/journalbuilder.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "journalbuilder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".journalbuilder";

// ---------------------------------------------------------------------------
// Config structs (matching journalbuilder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page geometry.
    #[serde(default)]
    pub page: PageConfig,

    /// Fixed front-matter text.
    #[serde(default)]
    pub masthead: MastheadConfig,

    /// External converter and typesetter.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Defaults for per-issue options.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[page]` section. Sized for tablets, with LaTeX's default margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Paper width in inches.
    #[serde(default = "default_page_width")]
    pub width_in: f64,

    /// Paper height in inches.
    #[serde(default = "default_page_height")]
    pub height_in: f64,
}

impl PageConfig {
    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width_in / self.height_in
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width_in: default_page_width(),
            height_in: default_page_height(),
        }
    }
}

fn default_page_width() -> f64 {
    6.0
}
fn default_page_height() -> f64 {
    9.0
}

/// `[masthead]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MastheadConfig {
    /// Journal name as printed on the masthead.
    #[serde(default = "default_journal_title")]
    pub journal_title: String,

    /// Title page heading, one entry per line.
    #[serde(default = "default_title_page_lines")]
    pub title_page_lines: Vec<String>,

    /// Line under the journal name.
    #[serde(default = "default_tagline")]
    pub tagline: String,

    /// Copyright holder and publisher.
    #[serde(default = "default_publisher")]
    pub publisher: String,

    #[serde(default = "default_editor_in_chief")]
    pub editor_in_chief: String,

    #[serde(default = "default_contributing_editors")]
    pub contributing_editors: Vec<String>,

    #[serde(default = "default_publishers_representative")]
    pub publishers_representative: String,
}

impl Default for MastheadConfig {
    fn default() -> Self {
        Self {
            journal_title: default_journal_title(),
            title_page_lines: default_title_page_lines(),
            tagline: default_tagline(),
            publisher: default_publisher(),
            editor_in_chief: default_editor_in_chief(),
            contributing_editors: default_contributing_editors(),
            publishers_representative: default_publishers_representative(),
        }
    }
}

fn default_journal_title() -> String {
    "From the Valley of Heart's Delight".into()
}
fn default_title_page_lines() -> Vec<String> {
    vec!["From the".into(), "Valley of Heart's Delight".into()]
}
fn default_tagline() -> String {
    "A Literary Journal for the Adult Education Classes of the Silicon Valley".into()
}
fn default_publisher() -> String {
    "Adult Education Press".into()
}
fn default_editor_in_chief() -> String {
    "James Swenson".into()
}
fn default_contributing_editors() -> Vec<String> {
    vec!["John Doe".into(), "Jane Roe".into()]
}
fn default_publishers_representative() -> String {
    "William C. Janssen".into()
}

/// `[tools]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Document converter executable.
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Arguments placed before `--output=<fragment>` and the source path.
    #[serde(default = "default_converter_args")]
    pub converter_args: Vec<String>,

    /// Typesetter executable.
    #[serde(default = "default_typesetter")]
    pub typesetter: String,

    /// Arguments placed before `-jobname`, `-output-directory` and the document.
    #[serde(default = "default_typesetter_args")]
    pub typesetter_args: Vec<String>,

    /// Number of typesetter passes. Two resolve page cross-references.
    #[serde(default = "default_typeset_passes")]
    pub typeset_passes: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
            converter_args: default_converter_args(),
            typesetter: default_typesetter(),
            typesetter_args: default_typesetter_args(),
            typeset_passes: default_typeset_passes(),
        }
    }
}

fn default_converter() -> String {
    "pandoc".into()
}
fn default_converter_args() -> Vec<String> {
    vec!["--to=latex".into()]
}
fn default_typesetter() -> String {
    "pdflatex".into()
}
fn default_typesetter_args() -> Vec<String> {
    vec!["-interaction=nonstopmode".into(), "-halt-on-error".into()]
}
fn default_typeset_passes() -> u32 {
    2
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// dvips color name for the title page heading.
    #[serde(default = "default_title_color")]
    pub title_color: String,

    /// Contribution kinds to include. Empty means every kind.
    #[serde(default)]
    pub include_kinds: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            title_color: default_title_color(),
            include_kinds: Vec::new(),
        }
    }
}

fn default_title_color() -> String {
    "Black".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.journalbuilder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| JournalError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.journalbuilder/journalbuilder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JournalError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| JournalError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| JournalError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| JournalError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JournalError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("width_in"));
        assert!(toml_str.contains("pdflatex"));
        assert!(toml_str.contains("Adult Education Press"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.tools.typeset_passes, 2);
        assert_eq!(parsed.masthead.contributing_editors.len(), 2);
        assert_eq!(parsed.defaults.title_color, "Black");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[page]
width_in = 8.5
height_in = 11.0

[tools]
converter = "/opt/pandoc/bin/pandoc"

[defaults]
include_kinds = ["story", "poem"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.page.width_in, 8.5);
        assert_eq!(config.tools.converter, "/opt/pandoc/bin/pandoc");
        assert_eq!(config.tools.converter_args, vec!["--to=latex".to_string()]);
        assert_eq!(config.tools.typesetter, "pdflatex");
        assert_eq!(config.defaults.include_kinds, vec!["story", "poem"]);
        assert_eq!(config.masthead.editor_in_chief, "James Swenson");
    }

    #[test]
    fn page_aspect_ratio() {
        let page = PageConfig::default();
        assert!((page.aspect() - 6.0 / 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journalbuilder.toml");
        std::fs::write(&path, "[page]\nwidth_in = \"wide\"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
