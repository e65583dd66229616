/*
zennscope - main.rs
Command line entry point: runs the digest pipeline directly or serves the tools over HTTP.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use zennscope::report::{generate_filename, generate_report, save_report};
use zennscope::{list_tools, server, FeedClient, Summarizer, ToolBox};

#[derive(Parser, Debug)]
#[command(name = "zennscope", about = "Topic article digests with LLM summaries")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the tools over HTTP
    Serve,
    /// Print the tool list with argument schemas
    Tools,
    /// Call a tool with JSON arguments
    Call {
        name: String,
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Fetch, summarize and render a report for a topic
    Search {
        topic: String,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        max_articles: Option<usize>,
        /// Write the report to this file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Write the report into the configured output directory
        #[arg(long)]
        save: bool,
    },
    /// Summarize a single article page
    Summarize {
        url: String,
        #[arg(long)]
        length: Option<usize>,
    },
    /// List the current trending articles
    Trending {
        #[arg(long, default_value_t = 10)]
        max_articles: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging goes to stderr so command output stays clean on stdout
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let config = load_config(args.config.as_deref()).await?;

    match args.command {
        Command::Serve => {
            let toolbox = Arc::new(ToolBox::from_config(&config)?);
            server::launch(toolbox, &config.server).await?;
        }
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&list_tools())?);
        }
        Command::Call { name, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let toolbox = ToolBox::from_config(&config)?;
            let output = toolbox.call_tool(&name, arguments).await;
            if output.is_error {
                anyhow::bail!(output.text);
            }
            println!("{}", output.text);
        }
        Command::Search {
            topic,
            period,
            max_articles,
            output,
            save,
        } => {
            let summarizer = Summarizer::from_config(&config)?;
            let period = period.unwrap_or_else(|| config.summary.default_period.clone());
            let max_articles = max_articles.unwrap_or(config.summary.default_articles);

            let result = summarizer.process_topic(&topic, &period, max_articles).await?;

            let destination = output.or_else(|| {
                save.then(|| PathBuf::from(&config.report.output_dir).join(generate_filename(&topic)))
            });
            match destination {
                Some(path) => {
                    if !save_report(&result, &path) {
                        anyhow::bail!("failed to write report to {}", path.display());
                    }
                    println!("Report saved: {}", path.display());
                }
                None => println!("{}", generate_report(&result)),
            }
        }
        Command::Summarize { url, length } => {
            let summarizer = Summarizer::from_config(&config)?;
            let length = length.unwrap_or(config.summary.summary_length);
            match summarizer.summarize_url(&url, length).await? {
                Some(summary) => println!("{}", summary),
                None => anyhow::bail!("could not retrieve the article content: {}", url),
            }
        }
        Command::Trending { max_articles } => {
            let client = FeedClient::new(&config.feed, &config.scraping.user_agent)?;
            let articles = client.fetch_trending(max_articles).await;
            if articles.is_empty() {
                error!("no trending articles retrieved");
            }
            for (i, article) in articles.iter().enumerate() {
                println!("{}. {} ({})\n   {}", i + 1, article.title, article.author, article.url);
            }
        }
    }

    Ok(())
}

/// `config.default.toml` merged with `--config` or `./config.toml` when present.
async fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = match explicit {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            anyhow::bail!("Config file not found: {}", p.display());
        }
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = Config::load_with_defaults(Some(&default_path), override_path.as_deref())
        .await
        .context("failed to load configuration")?;
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");
    Ok(config)
}
