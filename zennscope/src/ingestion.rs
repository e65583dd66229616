use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use common::FeedConfig;

use crate::error::{DigestError, Result};
use crate::models::{Article, Period};
use crate::scraping::collapse_whitespace;

/// Anything that can hand the pipeline a list of articles for a topic.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, topic: &str, period: &Period, max_articles: usize) -> Vec<Article>;
}

/// Client for item-based (RSS 2.0) topic and trending feeds.
pub struct FeedClient {
    client: Client,
    base_url: String,
    trending_url: String,
}

impl FeedClient {
    /// `user_agent` is shared with the article page extractor (`scraping.user_agent`).
    pub fn new(config: &FeedConfig, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DigestError::Config(format!("failed to build reqwest client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            trending_url: config.trending_url.clone(),
        })
    }

    /// `<base_url>/<topic>/feed`, with the topic encoded as a single path segment.
    pub fn topic_feed_url(&self, topic: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DigestError::Config(format!("invalid feed base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| DigestError::Config(format!("feed base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(topic.trim())
            .push("feed");
        Ok(url)
    }

    /// Latest items of a topic feed, at most `max_items`. Never fails: transport or
    /// document errors give an empty list.
    pub async fn fetch_feed(&self, topic: &str, max_items: usize) -> Vec<Article> {
        self.fetch_topic(topic, max_items, None).await
    }

    /// Like `fetch_feed`, keeping only items published inside the period window.
    pub async fn fetch_feed_for_period(&self, topic: &str, period: &Period, max_items: usize) -> Vec<Article> {
        self.fetch_topic(topic, max_items, Some(period.cutoff(Utc::now()))).await
    }

    pub async fn fetch_trending(&self, max_items: usize) -> Vec<Article> {
        if max_items == 0 {
            return Vec::new();
        }
        let url = self.trending_url.clone();
        self.fetch_url(&url, max_items, None).await
    }

    async fn fetch_topic(&self, topic: &str, max_items: usize, cutoff: Option<DateTime<Utc>>) -> Vec<Article> {
        if max_items == 0 {
            return Vec::new();
        }
        match self.topic_feed_url(topic) {
            Ok(url) => self.fetch_url(url.as_str(), max_items, cutoff).await,
            Err(e) => {
                warn!(topic, error = %e, "could not build feed URL");
                Vec::new()
            }
        }
    }

    async fn fetch_url(&self, url: &str, max_items: usize, cutoff: Option<DateTime<Utc>>) -> Vec<Article> {
        info!(url, max_items, "fetching feed");
        match self.download(url).await {
            Ok(body) => {
                let articles = parse_feed(&body, max_items, cutoff);
                info!(url, count = articles.len(), "feed parsed");
                articles
            }
            Err(e) => {
                warn!(url, error = %e, "feed fetch failed");
                Vec::new()
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Fetch(format!("feed fetch failed with status: {}", status)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ArticleSource for FeedClient {
    async fn fetch_articles(&self, topic: &str, period: &Period, max_articles: usize) -> Vec<Article> {
        self.fetch_feed_for_period(topic, period, max_articles).await
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:creator", alias = "creator")]
    creator: Option<String>,
    author: Option<String>,
    description: Option<String>,
}

/// Parses an RSS document item by item. A malformed item is logged and skipped;
/// a document-level error stops parsing and keeps what was already collected.
pub fn parse_feed(xml: &str, max_items: usize, cutoff: Option<DateTime<Utc>>) -> Vec<Article> {
    let mut reader = Reader::from_str(xml);
    let mut articles = Vec::new();

    while articles.len() < max_items {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.local_name().as_ref() == b"item" => {
                let name = start.name().as_ref().to_vec();
                let span = match reader.read_to_end(QName(&name)) {
                    Ok(span) => span,
                    Err(e) => {
                        warn!(error = %e, "unterminated feed item, stopping");
                        break;
                    }
                };
                let inner = &xml[span.start as usize..span.end as usize];

                match parse_item(inner) {
                    Ok(article) if is_within(&article.published_at, cutoff) => articles.push(article),
                    Ok(article) => debug!(title = %article.title, "item outside requested period"),
                    Err(e) => warn!(error = %e, "skipping malformed feed item"),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, parsed = articles.len(), "feed document is malformed");
                break;
            }
        }
    }

    articles
}

fn parse_item(inner: &str) -> Result<Article> {
    let raw: RawItem = quick_xml::de::from_str(&format!("<item>{}</item>", inner))
        .map_err(|e| DigestError::Fetch(format!("malformed feed item: {}", e)))?;

    let text = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

    Ok(Article {
        title: text(raw.title),
        url: text(raw.link),
        published_at: text(raw.pub_date),
        author: text(raw.creator.or(raw.author)),
        description: raw.description.as_deref().map(description_text).unwrap_or_default(),
        liked_count: None,
    })
}

/// Reduces description markup to plain text; falls back to dropping angle brackets.
fn description_text(raw: &str) -> String {
    if !raw.contains('<') {
        return collapse_whitespace(raw);
    }
    match html2text::from_read(raw.as_bytes(), 1000) {
        Ok(text) => collapse_whitespace(&text),
        Err(e) => {
            debug!(error = %e, "description markup conversion failed");
            let stripped: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
            collapse_whitespace(&stripped)
        }
    }
}

/// Accepts RFC 2822 (RSS), RFC 3339 (Atom) and a leading `YYYY-MM-DD`.
pub fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

// Unparseable dates are kept rather than silently dropped.
fn is_within(published_at: &str, cutoff: Option<DateTime<Utc>>) -> bool {
    match (cutoff, parse_published(published_at)) {
        (Some(cutoff), Some(published)) => published >= cutoff,
        _ => true,
    }
}
