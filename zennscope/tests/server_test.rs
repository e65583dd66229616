use std::sync::Arc;

use common::{Config, FeedConfig, LlmConfig, ServerConfig};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use zennscope::server::build_rocket;
use zennscope::ToolBox;

async fn client() -> Client {
    let config = Config {
        feed: FeedConfig {
            base_url: "http://127.0.0.1:9/topics".to_string(),
            trending_url: "http://127.0.0.1:9/feed".to_string(),
            timeout_seconds: 2,
        },
        llm: LlmConfig {
            adapter: "extractive".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let toolbox = Arc::new(ToolBox::from_config(&config).unwrap());
    Client::tracked(build_rocket(toolbox, &ServerConfig::default()))
        .await
        .unwrap()
}

#[rocket::async_test]
async fn test_health() {
    let client = client().await;
    let response = client.get("/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[rocket::async_test]
async fn test_tool_listing() {
    let client = client().await;
    let response = client.get("/tools").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["search_articles", "summarize_article", "save_report"]);
}

#[rocket::async_test]
async fn test_tool_call_results_are_text_content() {
    let client = client().await;

    let response = client
        .post("/tools/unknown_tool")
        .header(ContentType::JSON)
        .body("{}")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["is_error"], true);
    assert_eq!(body["content"][0]["type"], "text");
    assert_eq!(body["content"][0]["text"], "Unknown tool: unknown_tool");

    let response = client
        .post("/tools/search_articles")
        .header(ContentType::JSON)
        .body(r#"{"topic": ""}"#)
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["is_error"], true);
    assert!(body["content"][0]["text"].as_str().unwrap().starts_with("An error occurred"));
}
