// Library interface for zennscope modules
// This allows tests and the binary to import modules

pub mod error;
pub mod ingestion;
pub mod llm;
pub mod models;
pub mod processing;
pub mod report;
pub mod scraping;
pub mod server;
pub mod tools;

pub use error::DigestError;
pub use ingestion::{ArticleSource, FeedClient};
pub use models::{Article, Period, ProcessedArticle, ProcessingResult};
pub use processing::Summarizer;
pub use scraping::ContentExtractor;
pub use tools::{list_tools, ToolBox, ToolOutput};
