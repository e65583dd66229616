//! Tool-style command surface: three named operations with JSON arguments.
//!
//! Every call produces a text payload. Failures are reported inside the payload
//! (`An error occurred: ...`) and never escape as `Err` or a panic.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use common::{Config, SummaryConfig};

use crate::error::{DigestError, Result};
use crate::processing::Summarizer;
use crate::report::{generate_report, write_report_file};

pub const SEARCH_ARTICLES: &str = "search_articles";
pub const SUMMARIZE_ARTICLE: &str = "summarize_article";
pub const SAVE_REPORT: &str = "save_report";

/// Name, description and JSON schema of one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

pub fn list_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: SEARCH_ARTICLES,
            description: "Fetch recent articles for a topic, summarize each one and return a Markdown report.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "description": "Topic to search, e.g. \"react\""},
                    "period": {"type": "string", "enum": ["today", "week", "month"], "default": "week"},
                    "max_articles": {"type": "integer", "minimum": 1, "default": 10},
                    "output_path": {"type": "string", "description": "Also save the report to this file"}
                },
                "required": ["topic"]
            }),
        },
        ToolSpec {
            name: SUMMARIZE_ARTICLE,
            description: "Fetch one article page and summarize its content.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "summary_length": {"type": "integer", "minimum": 1, "default": 300}
                },
                "required": ["url"]
            }),
        },
        ToolSpec {
            name: SAVE_REPORT,
            description: "Write report text to a file.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "path": {"type": "string"},
                    "overwrite": {"type": "boolean", "default": false}
                },
                "required": ["content", "path"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    topic: String,
    period: Option<String>,
    max_articles: Option<i64>,
    output_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummarizeArgs {
    url: String,
    summary_length: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SaveArgs {
    content: String,
    path: String,
    #[serde(default)]
    overwrite: bool,
}

/// Dispatches tool calls onto the summarizer pipeline and the report writer.
pub struct ToolBox {
    summarizer: Arc<Summarizer>,
    settings: SummaryConfig,
}

impl ToolBox {
    pub fn new(summarizer: Summarizer, settings: SummaryConfig) -> Self {
        Self {
            summarizer: Arc::new(summarizer),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Summarizer::from_config(config)?, config.summary.clone()))
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutput {
        info!(tool = name, "tool call");
        let outcome = match name {
            SEARCH_ARTICLES => self.search_articles(arguments).await,
            SUMMARIZE_ARTICLE => self.summarize_article(arguments).await,
            SAVE_REPORT => self.save_report(arguments),
            other => return ToolOutput::error(format!("Unknown tool: {}", other)),
        };

        match outcome {
            Ok(text) => ToolOutput::text(text),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                ToolOutput::error(format!("An error occurred: {}", e))
            }
        }
    }

    async fn search_articles(&self, arguments: Value) -> Result<String> {
        let args: SearchArgs = parse_args(arguments)?;
        let max_articles = match args.max_articles {
            Some(n) if n >= 1 && n as u64 <= self.settings.max_articles as u64 => n as usize,
            _ => self.settings.default_articles,
        };
        let period = args
            .period
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_period.clone());

        let result = self
            .summarizer
            .process_topic(&args.topic, &period, max_articles)
            .await?;
        let report = generate_report(&result);

        let mut text = if result.articles.is_empty() {
            format!("No articles found for topic '{}'.\n\n{}", result.topic, report)
        } else {
            format!(
                "Report generated for '{}' ({} articles).\n\n{}",
                result.topic, result.total_articles, report
            )
        };

        if let Some(path) = args.output_path.filter(|p| !p.trim().is_empty()) {
            match write_report_file(Path::new(&path), &report, true) {
                Ok(saved) => text.push_str(&format!("\n\nSaved to: {}", saved.display())),
                Err(e) => {
                    warn!(path = %path, error = %e, "could not save search report");
                    text.push_str(&format!("\n\nCould not save the report: {}", e));
                }
            }
        }

        Ok(text)
    }

    async fn summarize_article(&self, arguments: Value) -> Result<String> {
        let args: SummarizeArgs = parse_args(arguments)?;
        if args.url.trim().is_empty() {
            return Err(DigestError::InvalidArgument("url cannot be empty".to_string()));
        }
        let length = match args.summary_length {
            Some(n) if n >= 1 => n as usize,
            _ => self.settings.summary_length,
        };

        match self.summarizer.summarize_url(&args.url, length).await? {
            Some(summary) => Ok(format!("Article summary: {}\n\n{}", args.url, summary)),
            None => Ok(format!("Could not retrieve the article content: {}", args.url)),
        }
    }

    fn save_report(&self, arguments: Value) -> Result<String> {
        let args: SaveArgs = parse_args(arguments)?;
        if args.path.trim().is_empty() {
            return Err(DigestError::InvalidArgument("path cannot be empty".to_string()));
        }

        match write_report_file(Path::new(&args.path), &args.content, args.overwrite) {
            Ok(saved) => Ok(format!("Report saved: {}", saved.display())),
            Err(DigestError::AlreadyExists(path)) => Ok(format!(
                "File already exists: {}. Pass overwrite=true to replace it.",
                path.display()
            )),
            Err(e) => Err(e),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| DigestError::InvalidArgument(format!("invalid tool arguments: {}", e)))
}
