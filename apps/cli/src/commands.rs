//! CLI definition, tracing setup, and the recommendation loop.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use ao3recs_archive::{Archive, HttpFetcher};
use ao3recs_core::{RecommendationSink, Recommender};
use ao3recs_shared::{AppConfig, ArchiveConfig, RecommendConfig, Recommendation, load_config_from};

const PROMPT: &str = "Enter a URL for a work on AO3 or type 'exit()' to quit the program";
const EXIT_COMMAND: &str = "exit()";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ao3recs: find works similar to one you liked on the archive.
#[derive(Parser)]
#[command(
    name = "ao3recs",
    version,
    about = "Recommend fan works similar to a given work.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Work URLs to recommend from. Without any, URLs are read from a prompt.
    pub urls: Vec<String>,

    /// TOML config file. Nothing is loaded without it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Archive root to crawl.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Stop the co-bookmarker search after this many recommendations.
    #[arg(long)]
    pub co_bookmarker_cap: Option<usize>,

    /// Number of recommendations the tag-similarity search aims for.
    #[arg(long)]
    pub tag_search_quota: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// How recommendations are printed.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Recommendation output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ao3recs=warn",
        1 => "ao3recs=info",
        2 => "ao3recs=debug",
        _ => "ao3recs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
// Configuration
// ---------------------------------------------------------------------------

/// Defaults, then the `--config` file, then individual flags.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => AppConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.archive.base_url = base_url.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.archive.timeout_secs = secs;
    }
    if let Some(cap) = cli.co_bookmarker_cap {
        config.recommend.co_bookmarker_cap = cap;
    }
    if let Some(quota) = cli.tag_search_quota {
        config.recommend.tag_search_quota = quota;
    }

    Ok(config)
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Recommend from each URL given on the command line, or prompt for URLs
/// until `exit()` or end of input.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let archive_config = ArchiveConfig::try_from(&config)?;
    let fetcher = HttpFetcher::new(&archive_config)?;
    let mut recommender = Recommender::new(
        Archive::from_config(fetcher, &archive_config),
        RecommendConfig::from(&config),
    );
    let mut printer = Printer::new(cli.output);

    info!(base_url = %archive_config.base_url, "archive configured");

    if !cli.urls.is_empty() {
        let mut failed = 0;
        for url in &cli.urls {
            if !recommend_one(&mut recommender, url, &mut printer).await {
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(eyre!("{failed} of {} runs failed", cli.urls.len()));
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{PROMPT}");
        print!(">>> ");
        std::io::stdout().flush().wrap_err("failed to write prompt")?;

        let Some(line) = lines.next_line().await.wrap_err("failed to read input")? else {
            println!();
            break;
        };
        let input = line.trim();
        if input == EXIT_COMMAND {
            break;
        }
        if input.is_empty() {
            continue;
        }
        recommend_one(&mut recommender, input, &mut printer).await;
    }

    Ok(())
}

/// Run once for `url`, reporting failure instead of returning it.
async fn recommend_one(
    recommender: &mut Recommender<HttpFetcher>,
    url: &str,
    printer: &mut Printer,
) -> bool {
    match recommender.recommend(url, printer).await {
        Ok(report) => {
            info!(
                seed = %report.seed_id,
                total = report.total(),
                counts = ?report.counts,
                "run finished"
            );
            if report.total() == 0 {
                eprintln!("No recommendations found for \"{}\".", report.seed_title);
            }
            true
        }
        Err(e) => {
            error!(error = %e, url, "recommendation run failed");
            eprintln!("Could not recommend from {url}: {e}");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Prints recommendations to stdout as they arrive.
struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl RecommendationSink for Printer {
    fn emit(&mut self, recommendation: Recommendation) {
        match self.format {
            OutputFormat::Text => println!("{}", format_text(&recommendation)),
            OutputFormat::Json => match serde_json::to_string(&recommendation) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(
                    error = %e,
                    id = %recommendation.work.id,
                    "could not serialize recommendation"
                ),
            },
        }
    }
}

fn format_text(recommendation: &Recommendation) -> String {
    let work = &recommendation.work;
    format!(
        "URL:\t\t{}\nTITLE:\t\t{}\nAUTHOR(S):\t{}\nFANDOM(S):\t{}\nSUMMARY:\n{}\n",
        work.url,
        work.title,
        work.authors.join(", "),
        work.fandoms.join(", "),
        work.summary,
    )
}
