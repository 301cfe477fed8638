use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ngoscope_core::{
    Extraction, FetchConfig, FieldKind, FileOverrideStore, HttpFetcher, JsonConfig, JsonSink, Locale, OverrideStore,
    PdfTextDecoder, Pipeline, PipelineConfig, TextConfig, TextDecoder, convert_to_json, convert_to_jsonl,
    convert_to_text, local_url,
};
use owo_colors::OwoColorize;
use tokio::sync::Semaphore;
use tracing_subscriber::EnvFilter;

mod echo;
mod feedback;

use echo::{
    print_banner, print_batch_summary, print_error, print_info, print_record_summary, print_step, print_success,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Jsonl,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, jsonl, text", s)),
        }
    }
}

/// Extract organization records from NGO websites
#[derive(Parser, Debug)]
#[command(name = "ngoscope")]
#[command(author = "ngoscope contributors")]
#[command(version)]
#[command(about = "Extract organization records from NGO websites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding per-domain override files (default: ~/.config/ngoscope/overrides)
    #[arg(long, global = true, value_name = "DIR")]
    overrides_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one record per input URL or local HTML file
    Extract(ExtractArgs),

    /// Manage per-domain selector overrides
    Overrides {
        #[command(subcommand)]
        action: OverridesAction,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URLs to fetch or local HTML files
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Output format (json, jsonl, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Write one <domain>.json file per record into this directory
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Organizations processed concurrently
    #[arg(short, long, default_value = "4", value_name = "NUM")]
    jobs: usize,

    /// Timeout for rendering one page or fetching one document, in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum delay between two requests to the same host, in milliseconds
    #[arg(long, default_value = "1000", value_name = "MS")]
    delay_ms: u64,

    /// Ask the renderer to let client-side scripts run
    #[arg(long)]
    wait_for_js: bool,

    /// Sub-pages followed per organization
    #[arg(long, default_value = "3", value_name = "NUM")]
    max_subpages: usize,

    /// PDF reports decoded per organization
    #[arg(long, default_value = "1", value_name = "NUM")]
    max_pdfs: usize,

    /// JSON locale file with gazetteer and contact patterns (default: India)
    #[arg(long, value_name = "FILE")]
    locale: Option<PathBuf>,

    /// Prompt for selectors for fields left unresolved
    #[arg(short, long)]
    interactive: bool,

    /// Show where each value came from (text format only)
    #[arg(long)]
    provenance: bool,
}

#[derive(Subcommand, Debug)]
enum OverridesAction {
    /// Store a selector for one field of a domain
    Set {
        /// Domain the selector applies to (www. is ignored)
        domain: String,
        /// Field key, e.g. year_founded or contact_info.phone
        field: String,
        /// CSS selector
        selector: String,
    },

    /// Print the overrides that apply to a domain
    Show {
        /// Domain to look up
        domain: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ngoscope_core=debug,ngoscope=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn override_store(dir: Option<PathBuf>) -> anyhow::Result<FileOverrideStore> {
    let dir = match dir {
        Some(dir) => dir,
        None => FileOverrideStore::default_dir()
            .context("Cannot determine the config directory; pass --overrides-dir")?,
    };
    Ok(FileOverrideStore::new(dir))
}

/// The root URL for an input: URLs pass through, existing paths become `file://` URLs.
fn root_input(input: &str) -> anyhow::Result<String> {
    let lower = input.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("file://") {
        return Ok(input.to_string());
    }

    let path = Path::new(input);
    if path.exists() {
        let url = local_url(path).with_context(|| format!("Failed to resolve local file: {}", input))?;
        return Ok(url.to_string());
    }

    anyhow::bail!("Not a URL or an existing file: {}", input)
}

fn pipeline_config(args: &ExtractArgs) -> anyhow::Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .max_subpages(args.max_subpages)
        .max_pdfs(args.max_pdfs)
        .wait_for_js(args.wait_for_js)
        .render_timeout(Duration::from_secs(args.timeout));

    if let Some(path) = &args.locale {
        let locale = Locale::from_file(path).with_context(|| format!("Failed to load locale: {}", path.display()))?;
        builder = builder.locale(locale);
    }

    Ok(builder.build())
}

async fn extract(args: ExtractArgs, overrides_dir: Option<PathBuf>, verbose: bool) -> anyhow::Result<()> {
    let started = Instant::now();
    let total_steps = if args.interactive { 3 } else { 2 };

    let pipeline = Arc::new(Pipeline::with_config(pipeline_config(&args)?).context("Invalid pipeline configuration")?);
    let fetcher = Arc::new(
        HttpFetcher::new(FetchConfig {
            timeout: args.timeout,
            user_agent: args.user_agent.clone().unwrap_or_else(|| FetchConfig::default().user_agent),
            min_delay: Duration::from_millis(args.delay_ms),
        })
        .context("Failed to build HTTP client")?,
    );
    let store = Arc::new(override_store(overrides_dir)?);
    let decoder: Arc<dyn TextDecoder> = Arc::new(PdfTextDecoder);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    if verbose {
        print_step(1, total_steps, &format!("Extracting {} organization(s), {} at a time", args.inputs.len(), args.jobs));
    }

    let mut handles = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let input = input.clone();
        let pipeline = pipeline.clone();
        let fetcher = fetcher.clone();
        let store = store.clone();
        let decoder = decoder.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let root = root_input(&input)?;
            let extraction = pipeline
                .run(&root, fetcher.as_ref(), decoder, store.as_ref())
                .await
                .with_context(|| format!("Failed to extract {}", input))?;
            anyhow::Ok(extraction)
        }));
    }

    let mut extractions: Vec<Extraction> = Vec::new();
    let mut failed = 0;
    for (input, handle) in args.inputs.iter().zip(handles) {
        match handle.await.context("Extraction task panicked")? {
            Ok(extraction) => {
                if verbose {
                    print_record_summary(&extraction.record);
                }
                for failure in &extraction.context.failures {
                    tracing::info!(input = %input, failure = %failure, "source skipped");
                }
                extractions.push(extraction);
            }
            Err(e) => {
                print_error(&format!("{:#}", e));
                failed += 1;
            }
        }
    }

    if args.interactive {
        if verbose {
            print_step(2, total_steps, "Reviewing unresolved fields");
        }
        let mut reviewed = Vec::with_capacity(extractions.len());
        for extraction in extractions {
            reviewed.push(feedback::review(&pipeline, store.as_ref(), extraction)?);
        }
        extractions = reviewed;
    }

    if verbose {
        print_step(total_steps, total_steps, "Writing output");
    }
    write_output(&args, &extractions)?;

    if verbose {
        print_batch_summary(started.elapsed(), extractions.len(), failed);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} input(s) failed", failed, args.inputs.len());
    }
    Ok(())
}

fn write_output(args: &ExtractArgs, extractions: &[Extraction]) -> anyhow::Result<()> {
    if let Some(dir) = &args.out_dir {
        let sink = JsonSink::new(dir);
        for extraction in extractions {
            let path = sink
                .write(&extraction.record)
                .with_context(|| format!("Failed to write record for {}", extraction.record.website_url))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        return Ok(());
    }

    let records: Vec<_> = extractions.iter().map(|e| e.record.clone()).collect();
    let output = match args.format {
        OutputFormat::Json => {
            let config = JsonConfig { pretty: true };
            let documents = records
                .iter()
                .map(|record| convert_to_json(record, &config))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to serialize records")?;
            documents.join("\n")
        }
        OutputFormat::Jsonl => convert_to_jsonl(&records).context("Failed to serialize records")?,
        OutputFormat::Text => {
            let config = TextConfig { show_provenance: args.provenance };
            records.iter().map(|record| convert_to_text(record, &config)).collect::<Vec<_>>().join("\n\n")
        }
    };

    if !output.is_empty() {
        println!("{}", output.trim_end());
    }
    Ok(())
}

fn overrides(action: OverridesAction, overrides_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let store = override_store(overrides_dir)?;

    match action {
        OverridesAction::Set { domain, field, selector } => {
            let field = FieldKind::from_str(&field).with_context(|| format!("Unknown field: {}", field))?;
            store
                .save(&domain, field, &selector)
                .with_context(|| format!("Failed to save override for {}", domain))?;
            let path = store.path_for(&domain)?;
            print_success(&format!("Saved {} for {} in {}", field.key(), domain, path.display().bright_white()));
        }
        OverridesAction::Show { domain } => {
            let found = store.lookup(&domain).with_context(|| format!("Failed to read overrides for {}", domain))?;
            if found.is_empty() {
                print_info(&format!("No overrides for {}", domain));
            } else {
                print!("{}", found.to_directive_string());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Extract(args) => extract(args, cli.overrides_dir, cli.verbose).await,
        Command::Overrides { action } => overrides(action, cli.overrides_dir),
    }
}
