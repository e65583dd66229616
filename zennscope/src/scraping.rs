use reqwest::Client;
use scraper::{ElementRef, Html};
use std::time::Duration;
use tracing::{info, warn};

use common::ScrapingConfig;

use crate::error::{DigestError, Result};

/// Elements whose text never counts as article body.
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

/// Fetches article pages and reduces them to plain text.
pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new(config: &ScrapingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DigestError::Config(format!("failed to build reqwest client: {}", e)))?;

        Ok(Self { client })
    }

    /// Visible text of the page at `url`, or an empty string on any failure.
    pub async fn extract_content(&self, url: &str) -> String {
        match self.fetch_page(url).await {
            Ok(html) => {
                let text = html_to_text(&html);
                info!(url, chars = text.chars().count(), "extracted article text");
                text
            }
            Err(e) => {
                warn!(url, error = %e, "content extraction failed");
                String::new()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Fetch(format!("article fetch failed with status: {}", status)));
        }

        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| DigestError::Fetch(format!("article body is not valid UTF-8: {}", e)))
    }
}

/// Text content of an HTML document without script, style and page chrome,
/// whitespace collapsed to single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.root_element(), &mut text);
    collapse_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
