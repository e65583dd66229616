use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use common::Config;

use crate::error::{DigestError, Result};
use crate::ingestion::{ArticleSource, FeedClient};
use crate::llm::{create_llm_provider, LlmProvider};
use crate::models::{sort_by_liked_count, Article, Period, ProcessedArticle, ProcessingResult};
use crate::scraping::ContentExtractor;

/// Summary used when an article page yields no text
pub const CONTENT_UNAVAILABLE: &str = "Failed to retrieve the article body.";
/// Summary used when the LLM backend fails
pub const SUMMARY_FAILED: &str = "An error occurred while generating the summary.";

pub const DEFAULT_PERIOD: &str = "week";
pub const DEFAULT_MAX_ARTICLES: usize = 10;
pub const DEFAULT_SUMMARY_LENGTH: usize = 300;

/// Drives fetch → extract → summarize for one topic, one article at a time.
pub struct Summarizer {
    source: Arc<dyn ArticleSource>,
    extractor: ContentExtractor,
    llm: Arc<dyn LlmProvider>,
    summary_length: usize,
    sort_by_popularity: bool,
}

impl Summarizer {
    pub fn new(source: Arc<dyn ArticleSource>, extractor: ContentExtractor, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            source,
            extractor,
            llm,
            summary_length: DEFAULT_SUMMARY_LENGTH,
            sort_by_popularity: true,
        }
    }

    /// Feed client, content extractor and LLM provider as described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = FeedClient::new(&config.feed, &config.scraping.user_agent)?;
        let extractor = ContentExtractor::new(&config.scraping)?;
        let llm = create_llm_provider(&config.llm)?;
        info!(adapter = %config.llm.adapter, provider = llm.name(), "summarization backend ready");

        Ok(Self::new(Arc::new(source), extractor, llm)
            .with_summary_length(config.summary.summary_length)
            .with_popularity_sort(config.summary.sort_by_popularity))
    }

    pub fn with_summary_length(mut self, summary_length: usize) -> Self {
        self.summary_length = summary_length;
        self
    }

    /// Order fetched articles by like count (descending, stable) before summarizing.
    pub fn with_popularity_sort(mut self, enabled: bool) -> Self {
        self.sort_by_popularity = enabled;
        self
    }

    pub async fn process_topic_with_defaults(&self, topic: &str) -> Result<ProcessingResult> {
        self.process_topic(topic, DEFAULT_PERIOD, DEFAULT_MAX_ARTICLES).await
    }

    /// Fetches up to `max_articles` articles and summarizes each of them.
    ///
    /// Fails only on a blank topic. Per-article problems end up as placeholder
    /// summaries, so the batch always completes.
    pub async fn process_topic(&self, topic: &str, period: &str, max_articles: usize) -> Result<ProcessingResult> {
        if topic.trim().is_empty() {
            return Err(DigestError::InvalidArgument("topic cannot be empty".to_string()));
        }

        info!(topic, period, max_articles, "starting topic processing");
        let started = Instant::now();

        let mut articles = self
            .source
            .fetch_articles(topic, &Period::parse(period), max_articles)
            .await;
        articles.truncate(max_articles);
        if self.sort_by_popularity {
            sort_by_liked_count(&mut articles);
        }

        let mut processed = Vec::with_capacity(articles.len());
        for article in articles {
            let summary = self.summarize_article(&article).await;
            processed.push(ProcessedArticle { article, summary });
        }

        let processing_time = started.elapsed().as_secs_f64();
        info!(
            topic,
            processing_time,
            articles = processed.len(),
            "topic processing completed"
        );

        Ok(ProcessingResult::new(topic, period, processed, processing_time))
    }

    /// Summary for a single page. `Ok(None)` when the page has no extractable text.
    pub async fn summarize_url(&self, url: &str, max_length: usize) -> Result<Option<String>> {
        let content = self.extractor.extract_content(url).await;
        if content.is_empty() {
            return Ok(None);
        }
        self.llm.summarize(&content, max_length).await.map(Some)
    }

    async fn summarize_article(&self, article: &Article) -> String {
        let content = self.extractor.extract_content(&article.url).await;
        if content.is_empty() {
            warn!(url = %article.url, "no article body, using placeholder summary");
            return CONTENT_UNAVAILABLE.to_string();
        }

        match self.llm.summarize(&content, self.summary_length).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                warn!(url = %article.url, provider = self.llm.name(), "empty summary returned");
                SUMMARY_FAILED.to_string()
            }
            Err(e) => {
                warn!(
                    url = %article.url,
                    title = %article.title,
                    provider = self.llm.name(),
                    error = %e,
                    "article summarization failed"
                );
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
