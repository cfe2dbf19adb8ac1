//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use journalbuilder_core::pipeline::{BuildConfig, BuildResult, ProgressReporter, build_journal};
use journalbuilder_shared::{
    AppConfig, IssueInfo, KindFilter, SystemRunner, check_tool_available, init_config,
    load_config, load_config_from,
};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// journalbuilder — typeset a literary journal issue.
#[derive(Parser)]
#[command(
    name = "journalbuilder",
    version,
    about = "Build a typeset PDF journal issue from a contributions table.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.journalbuilder/journalbuilder.toml.
    #[arg(long, global = true, env = "JOURNALBUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert, assemble, and typeset an issue.
    Build(BuildArgs),

    /// Check that the converter and typesetter can be run.
    Check,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
pub(crate) struct BuildArgs {
    /// Spreadsheet (CSV) listing the issue's contributions.
    #[arg(long)]
    pub dbfile: PathBuf,

    /// Directory holding the contribution files (DOCX, RTF, ...).
    #[arg(long)]
    pub contribs: Option<PathBuf>,

    /// PDF file to write.
    #[arg(long)]
    pub output: PathBuf,

    /// Date string printed on the title page.
    #[arg(long)]
    pub issuedate: String,

    /// Volume of the journal.
    #[arg(long)]
    pub volume: String,

    /// Number within the volume.
    #[arg(long)]
    pub number: String,

    /// Image drawn behind the title page.
    #[arg(long)]
    pub coverart: Option<PathBuf>,

    /// Who gets credit for the cover art.
    #[arg(long)]
    pub covercredit: Option<String>,

    /// Title font color, a dvips color name (defaults to the config value).
    #[arg(long)]
    pub titlecolor: Option<String>,

    /// Only include these kinds (comma-separated, e.g. story,poem).
    #[arg(long, value_delimiter = ',')]
    pub only_kinds: Vec<String>,

    /// Keep the assembled .tex file next to the PDF.
    #[arg(long)]
    pub keep_latex: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "journalbuilder=info",
        1 => "journalbuilder=debug",
        _ => "journalbuilder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build(args) => cmd_build(args, config_path),
        Command::Check => cmd_check(config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(args: BuildArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;

    let kinds = if args.only_kinds.is_empty() {
        KindFilter::from_names(&config.defaults.include_kinds)
    } else {
        KindFilter::from_names(&args.only_kinds)
    };

    let build_config = BuildConfig {
        table: args.dbfile,
        contribs_dir: args.contribs,
        output: args.output,
        issue: IssueInfo {
            volume: args.volume,
            number: args.number,
            issue_date: args.issuedate,
            title_color: args
                .titlecolor
                .unwrap_or_else(|| config.defaults.title_color.clone()),
            cover_art: args.coverart,
            cover_credit: args.covercredit,
        },
        kinds,
        keep_latex: args.keep_latex,
        page: config.page,
        masthead: config.masthead,
        tools: config.tools,
        scratch_dir: None,
    };

    info!(
        table = %build_config.table.display(),
        output = %build_config.output.display(),
        kinds = ?build_config.kinds,
        "building issue"
    );

    let reporter = CliProgress::new();
    let result = build_journal(&build_config, &SystemRunner, &reporter);
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    let result = result?;

    // Print summary
    println!();
    println!("  Issue built successfully!");
    println!("  PDF:           {}", result.pdf_path.display());
    println!("  Contributions: {}", result.record_count);
    println!("  Included:      {}", result.included);
    if result.skipped > 0 {
        println!("  Skipped:       {}", result.skipped);
    }
    if let Some(path) = &result.latex_path {
        println!("  LaTeX:         {}", path.display());
    }
    println!("  SHA-256:       {}", result.latex_sha256);
    println!(
        "  Time:          {:.1}s",
        result.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

fn cmd_check(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let tools = [&config.tools.converter, &config.tools.typesetter];

    let mut missing = Vec::new();
    for program in tools {
        match check_tool_available(&SystemRunner, program) {
            Ok(version) => {
                info!(program = %program, version = %version, "tool found");
                println!("  {program:<10} {version}");
            }
            Err(e) => {
                warn!(program = %program, error = %e, "tool unavailable");
                println!("  {program:<10} not available ({e})");
                missing.push(program.as_str());
            }
        }
    }

    if !missing.is_empty() {
        return Err(eyre!("required tools unavailable: {}", missing.join(", ")));
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn contribution_converted(&self, title: &str, current: usize) {
        self.spinner
            .set_message(format!("Converted [{current}] {title}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
