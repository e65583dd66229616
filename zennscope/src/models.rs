use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One normalized feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Feed-native date text, kept verbatim
    pub published_at: String,
    pub author: String,
    pub description: String,
    /// Popularity count when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_count: Option<u32>,
}

impl Article {
    pub fn likes(&self) -> u32 {
        self.liked_count.unwrap_or(0)
    }
}

/// An article after it went through the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub summary: String,
}

/// Outcome of one `process_topic` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub topic: String,
    pub period: String,
    pub articles: Vec<ProcessedArticle>,
    /// Wall-clock seconds spent on the whole batch
    pub processing_time: f64,
    pub total_articles: usize,
}

impl ProcessingResult {
    pub fn new(
        topic: impl Into<String>,
        period: impl Into<String>,
        articles: Vec<ProcessedArticle>,
        processing_time: f64,
    ) -> Self {
        let total_articles = articles.len();
        Self {
            topic: topic.into(),
            period: period.into(),
            articles,
            processing_time: processing_time.max(0.0),
            total_articles,
        }
    }
}

/// Stable sort by like count, most liked first. Equal counts keep fetch order.
pub fn sort_by_liked_count(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.likes().cmp(&a.likes()));
}

/// Time window requested by a caller. Parsing never fails: unknown values are kept
/// as `Unspecified` and behave like a week when filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    Unspecified(String),
}

impl Period {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Period::Today,
            "week" => Period::Week,
            "month" => Period::Month,
            _ => Period::Unspecified(value.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "past week",
            Period::Month => "past month",
            Period::Unspecified(_) => "unspecified",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Period::Today => Duration::days(1),
            Period::Week | Period::Unspecified(_) => Duration::weeks(1),
            Period::Month => Duration::days(30),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liked(title: &str, likes: Option<u32>) -> Article {
        Article {
            title: title.to_string(),
            liked_count: likes,
            ..Default::default()
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut articles = vec![
            liked("a", Some(3)),
            liked("b", None),
            liked("c", Some(10)),
            liked("d", Some(3)),
            liked("e", Some(0)),
        ];
        sort_by_liked_count(&mut articles);

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "d", "b", "e"]);
    }

    #[test]
    fn period_labels_are_total() {
        assert_eq!(Period::parse("today").label(), "today");
        assert_eq!(Period::parse("week").label(), "past week");
        assert_eq!(Period::parse("Month").label(), "past month");
        assert_eq!(Period::parse("").label(), "unspecified");
        assert_eq!(Period::parse("fortnight").label(), "unspecified");
    }

    #[test]
    fn unknown_period_filters_like_a_week() {
        let now = Utc::now();
        assert_eq!(Period::parse("year").cutoff(now), now - Duration::weeks(1));
        assert_eq!(Period::Month.cutoff(now), now - Duration::days(30));
        assert_eq!(Period::Today.cutoff(now), now - Duration::days(1));
    }

    #[test]
    fn result_counts_articles() {
        let processed = ProcessedArticle {
            article: liked("x", None),
            summary: "s".to_string(),
        };
        let result = ProcessingResult::new("rust", "week", vec![processed], 1.25);
        assert_eq!(result.total_articles, 1);
        assert_eq!(result.articles.len(), 1);
    }
}
