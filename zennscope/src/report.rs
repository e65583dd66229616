//! Markdown rendering of a [`ProcessingResult`] and report persistence.

use chrono::{DateTime, Local};
use std::fmt::{self, Write as _};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{DigestError, Result};
use crate::models::{Period, ProcessedArticle, ProcessingResult};

pub const REPORT_TITLE: &str = "# Zenn Article Summary Report";
/// Placeholder for fields the feed did not provide
pub const UNKNOWN: &str = "unknown";
/// Returned instead of a report when formatting fails
pub const ERROR_REPORT: &str = "# Error\n\nAn error occurred while generating the report.";
pub const FILENAME_PREFIX: &str = "zenn_report";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the report stamped with the current local time.
pub fn generate_report(result: &ProcessingResult) -> String {
    generate_report_at(result, Local::now())
}

/// Renders the report with an explicit generation time. Output is a pure function
/// of the arguments.
pub fn generate_report_at(result: &ProcessingResult, generated_at: DateTime<Local>) -> String {
    match render(result, generated_at) {
        Ok(report) => {
            info!(topic = %result.topic, length = report.len(), "report generated");
            report
        }
        Err(e) => {
            error!(topic = %result.topic, error = %e, "report generation failed");
            ERROR_REPORT.to_string()
        }
    }
}

fn render(result: &ProcessingResult, generated_at: DateTime<Local>) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    write_header(&mut out, result, generated_at)?;
    out.push_str("\n\n");
    write_articles(&mut out, &result.articles)?;
    out.push_str("\n\n");
    write_footer(&mut out, result)?;
    Ok(out)
}

fn write_header(out: &mut String, result: &ProcessingResult, generated_at: DateTime<Local>) -> fmt::Result {
    writeln!(out, "{}", REPORT_TITLE)?;
    writeln!(out)?;
    writeln!(out, "**Search topic**: {}", or_unknown(&result.topic))?;
    writeln!(out, "**Period**: {}", Period::parse(&result.period).label())?;
    writeln!(out, "**Generated at**: {}", generated_at.format(TIMESTAMP_FORMAT))?;
    writeln!(out, "**Articles**: {}", result.total_articles)?;
    writeln!(out)?;
    write!(out, "---")
}

fn write_articles(out: &mut String, articles: &[ProcessedArticle]) -> fmt::Result {
    if articles.is_empty() {
        return write!(out, "## Results\n\nNo articles were found.");
    }

    for (i, processed) in articles.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let article = &processed.article;
        writeln!(out, "## {}. {}", i + 1, or_unknown(&article.title))?;
        writeln!(out)?;
        writeln!(out, "- **Author**: {}", or_unknown(&article.author))?;
        writeln!(out, "- **Published**: {}", or_unknown(&article.published_at))?;
        if let Some(likes) = article.liked_count {
            writeln!(out, "- **Likes**: {}", likes)?;
        }
        writeln!(out, "- **URL**: {}", or_unknown(&article.url))?;
        writeln!(out)?;
        writeln!(out, "**Summary**:")?;
        writeln!(out, "{}", or_unknown(&processed.summary))?;
        writeln!(out)?;
        write!(out, "---")?;
    }
    Ok(())
}

fn write_footer(out: &mut String, result: &ProcessingResult) -> fmt::Result {
    writeln!(out, "**Processing time**: {:.1}s", result.processing_time)?;
    write!(
        out,
        "**Average summary length**: {} characters",
        average_summary_length(&result.articles)
    )
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        UNKNOWN
    } else {
        value
    }
}

/// Mean summary length in characters, rounded down; 0 without articles.
pub fn average_summary_length(articles: &[ProcessedArticle]) -> usize {
    if articles.is_empty() {
        return 0;
    }
    let total: usize = articles.iter().map(|a| a.summary.chars().count()).sum();
    total / articles.len()
}

/// Renders `result` and writes it to `file_path`, creating missing directories.
/// Returns `false` on any failure.
pub fn save_report(result: &ProcessingResult, file_path: impl AsRef<Path>) -> bool {
    let path = file_path.as_ref();
    let report = generate_report(result);

    match write_report_file(path, &report, true) {
        Ok(written) => {
            info!(path = %written.display(), bytes = report.len(), "report saved");
            true
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "report save failed");
            false
        }
    }
}

/// Writes `content` as UTF-8 to `path`, creating parent directories. With
/// `overwrite == false` an existing file is left untouched and
/// `DigestError::AlreadyExists` is returned.
pub fn write_report_file(path: &Path, content: &str, overwrite: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DigestError::Persistence {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // create_new makes the existence check and the write one step
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let persistence = |source: io::Error| DigestError::Persistence {
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(path).map_err(|source| match source.kind() {
        io::ErrorKind::AlreadyExists => DigestError::AlreadyExists(path.to_path_buf()),
        _ => persistence(source),
    })?;
    file.write_all(content.as_bytes()).map_err(persistence)?;

    Ok(path.to_path_buf())
}

/// `zenn_report_<topic>_<YYYYmmdd_HHMMSS>.md`, keeping only alphanumerics, `-` and `_`
/// from the topic.
pub fn generate_filename(topic: &str) -> String {
    let safe_topic: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}_{}.md", FILENAME_PREFIX, safe_topic, timestamp)
}
