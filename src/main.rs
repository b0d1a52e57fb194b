use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use raiplaysound_rss::config::Config;
use raiplaysound_rss::feed::{DirectorySink, FeedSink, HttpFetcher, WriterSink};
use raiplaysound_rss::traverse::{TraversalOptions, Traverser};
use raiplaysound_rss::util::parse_node_url;
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Fatal,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical | LogLevel::Fatal => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "raiplaysound-rss",
    about = "Genera un RSS da un programma di RaiPlaySound.",
    after_help = "Info su https://github.com/timendum/raiplaysound/"
)]
struct Args {
    /// URL di un podcast (o playlist) su raiplaysound.
    url: String,

    /// Elabora il podcast anche se sembra un film.
    #[arg(long)]
    film: bool,

    /// Elabora il podcast anche se sembra un programma radio/tv.
    #[arg(long)]
    programma: bool,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(short, long = "loglevel", value_enum, default_value = "error")]
    loglevel: LogLevel,

    /// Config file (default: ~/.config/raiplaysound-rss/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write each feed to DIR/<name>.xml instead of standard output
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr: stdout carries the feed documents
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.loglevel.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let mut options = config.traversal_options();
    if args.programma {
        options.skip_programs = false;
    }
    if args.film {
        options.skip_films = false;
    }

    let root = parse_node_url(&args.url)
        .with_context(|| format!("Invalid programme URL: {}", args.url))?;

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")?;
    let fetcher = HttpFetcher::new(client)
        .with_timeout(config.request_timeout())
        .with_max_response_bytes(config.max_response_bytes);

    match args.output_dir {
        Some(dir) => {
            let mut sink = DirectorySink::new(dir);
            run(&fetcher, &mut sink, options, root).await?;
            for path in sink.written() {
                println!("{}", path.display());
            }
        }
        None => {
            let mut sink = WriterSink::stdout();
            run(&fetcher, &mut sink, options, root).await?;
        }
    }

    Ok(())
}

async fn run<S: FeedSink>(
    fetcher: &HttpFetcher,
    sink: &mut S,
    options: TraversalOptions,
    root: Url,
) -> Result<()> {
    let feeds = Traverser::new(fetcher, sink, options)
        .process(root.clone())
        .await
        .with_context(|| format!("Failed to generate feeds for {}", root))?;

    let emitted = feeds.iter().filter(|f| !f.items.is_empty()).count();
    tracing::info!(url = %root, nodes = feeds.len(), emitted = emitted, "Done");
    if emitted == 0 {
        tracing::warn!(url = %root, "No feed with episodes was produced");
    }
    Ok(())
}
