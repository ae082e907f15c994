//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use serde::Serialize;
use sparkle_core::{
    EnhanceHandler, EnrichOptions, ValidationReport, ValidationThresholds, calculate_context_score,
    enrich_prompt_with, level_from_score, level_from_token_count, quick_enrich, validate_with,
};
use sparkle_extractor::{
    DocumentSnapshot, DocumentView, ExtractOptions, HtmlDocument, classify, detect_platform,
    scrape_page_context,
};
use sparkle_shared::{
    AppConfig, BehemothPrompt, Platform, SparkleError, init_config, load_config, load_config_from,
};
use tracing::{debug, info};
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Sparkle: ground short prompts in the page you are reading.
#[derive(Parser)]
#[command(
    name = "sparkle",
    version,
    about = "Enrich short prompts with persona, page context and platform guidance.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.sparkle/sparkle.toml.
    #[arg(long, global = true)]
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

/// Where the page content comes from.
#[derive(Args, Debug)]
pub(crate) struct PageArgs {
    /// HTML file holding the page.
    #[arg(long, conflicts_with = "snapshot")]
    pub html: Option<PathBuf>,

    /// JSON document snapshot holding the page.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Text the user has selected on the page.
    #[arg(long)]
    pub selection: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich a prompt with page context.
    Enrich {
        /// The user's request.
        text: String,

        /// URL of the page, used for classification and grounding.
        #[arg(long, required_unless_present = "quick")]
        url: Option<String>,

        #[command(flatten)]
        page: PageArgs,

        /// Target platform: chatgpt, claude, gemini or unknown.
        #[arg(short, long)]
        platform: Option<String>,

        /// Skip page context and use the generic persona.
        #[arg(long)]
        quick: bool,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report how much useful context a page offers.
    Score {
        /// URL of the page, used for classification.
        #[arg(long)]
        url: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the source type and chat platform of a URL.
    Classify {
        /// URL to classify.
        url: String,
    },

    /// Serve ENHANCE_PROMPT messages as JSON lines over stdin/stdout.
    Bridge,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sparkle=info",
        1 => "sparkle=debug",
        _ => "sparkle=trace",
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
        Command::Enrich {
            text,
            url,
            page,
            platform,
            quick,
            json,
        } => {
            if quick {
                return cmd_quick_enrich(&text, json);
            }
            let url = url.ok_or_else(|| eyre!("--url is required without --quick"))?;
            let config = resolve_config(config_path)?;
            cmd_enrich(&config, &text, &url, &page, platform.as_deref(), json)
        }
        Command::Score { url, page } => cmd_score(&resolve_config(config_path)?, &url, &page),
        Command::Classify { url } => cmd_classify(&url),
        Command::Bridge => cmd_bridge(&resolve_config(config_path)?),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(config_path)?),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Load the page as a document view, attaching the selection if given.
fn load_document(page: &PageArgs) -> Result<Box<dyn DocumentView>> {
    if let Some(path) = &page.html {
        let html = std::fs::read_to_string(path).map_err(|e| SparkleError::io(path, e))?;
        let mut doc = HtmlDocument::parse(&html);
        if let Some(selection) = &page.selection {
            doc = doc.with_selection(selection.clone());
        }
        debug!(path = %path.display(), "loaded HTML document");
        return Ok(Box::new(doc));
    }

    let mut snapshot = match &page.snapshot {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| SparkleError::io(path, e))?;
            serde_json::from_str::<DocumentSnapshot>(&raw).map_err(|e| {
                SparkleError::parse(format!("invalid snapshot {}: {e}", path.display()))
            })?
        }
        None => DocumentSnapshot::default(),
    };
    if page.selection.is_some() {
        snapshot.selection = page.selection.clone();
    }
    Ok(Box::new(snapshot))
}

fn check_url(url: &str) -> Result<()> {
    Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// JSON shape printed by `enrich --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrichOutput {
    prompt: BehemothPrompt,
    validation: ValidationReport,
}

fn cmd_quick_enrich(text: &str, json: bool) -> Result<()> {
    if text.is_empty() {
        return Err(eyre!("prompt text must not be empty"));
    }
    let enriched = quick_enrich(text);
    if json {
        println!("{}", serde_json::json!({ "enriched": enriched }));
    } else {
        println!("{enriched}");
    }
    Ok(())
}

fn cmd_enrich(
    config: &AppConfig,
    text: &str,
    url: &str,
    page: &PageArgs,
    platform: Option<&str>,
    json: bool,
) -> Result<()> {
    if text.is_empty() {
        return Err(eyre!("prompt text must not be empty"));
    }

    check_url(url)?;
    let doc = load_document(page)?;
    let context = scrape_page_context(doc.as_ref(), url, &ExtractOptions::from(config));

    let platform = platform
        .map(Platform::from)
        .unwrap_or(config.enrichment.default_platform);

    let prompt = enrich_prompt_with(text, context, platform, &EnrichOptions::from(config));
    let validation = validate_with(&prompt, &ValidationThresholds::from(config));

    info!(
        persona = prompt.persona.role,
        %platform,
        expansion_ratio = prompt.expansion_ratio,
        valid = validation.valid,
        "prompt enriched"
    );

    if json {
        let output = EnrichOutput { prompt, validation };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for issue in &validation.issues {
            eprintln!("warning: {issue}");
        }
        println!("{}", prompt.enriched);
    }
    Ok(())
}

fn cmd_score(config: &AppConfig, url: &str, page: &PageArgs) -> Result<()> {
    check_url(url)?;
    let doc = load_document(page)?;
    let context = scrape_page_context(doc.as_ref(), url, &ExtractOptions::from(config));
    let score = calculate_context_score(&context);

    println!("Title:          {}", context.title);
    println!("Source type:    {}", context.source_type);
    println!("Tokens:         {}", context.token_count);
    println!("Metadata keys:  {}", context.metadata.len());
    println!("Score:          {score}/100");
    println!("Level (tokens): {}", level_from_token_count(context.token_count));
    println!("Level (score):  {}", level_from_score(score));
    Ok(())
}

fn cmd_classify(url: &str) -> Result<()> {
    println!("Source type: {}", classify(url));
    println!("Platform:    {}", detect_platform(url));
    Ok(())
}

fn cmd_bridge(config: &AppConfig) -> Result<()> {
    let handler = EnhanceHandler::from(config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    info!("bridge ready");
    let mut served = 0usize;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handler.handle_json(&line)?;
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
        served += 1;
    }
    info!(served, "bridge input closed");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
