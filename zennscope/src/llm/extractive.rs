// Extractive summarizer: leading sentences of the article, no network involved.
use tracing::debug;

use super::LlmProvider;
use crate::error::{DigestError, Result};

pub struct ExtractiveProvider;

#[async_trait::async_trait]
impl LlmProvider for ExtractiveProvider {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, content: &str, max_length: usize) -> Result<String> {
        let summary = extractive_summary(content, max_length);
        if summary.is_empty() {
            return Err(DigestError::Summarization("no sentences to extract".to_string()));
        }
        debug!(chars = summary.chars().count(), "extractive summary built");
        Ok(summary)
    }
}

/// Whole sentences from the start of `text` until `max_length` characters would be
/// exceeded. A first sentence longer than the budget is cut with an ellipsis.
fn extractive_summary(text: &str, max_length: usize) -> String {
    let sentences: Vec<&str> = text
        .split_inclusive(['.', '!', '?', '。'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let mut summary = String::new();
    let mut length = 0;
    for sentence in sentences {
        let sentence_length = sentence.chars().count();
        let separator = usize::from(!summary.is_empty());
        if length + separator + sentence_length > max_length {
            if summary.is_empty() {
                summary = truncate(sentence, max_length);
            }
            break;
        }
        if separator == 1 {
            summary.push(' ');
        }
        summary.push_str(sentence);
        length += separator + sentence_length;
    }
    summary
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
