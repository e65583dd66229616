use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zennscope::llm::remote::RemoteLlmProvider;
use zennscope::llm::{LlmProvider, LlmRequest};
use zennscope::DigestError;

#[tokio::test]
async fn test_remote_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer fake-api-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "model": "gpt-4o-mini",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "This is a test response"
                    },
                    "finish_reason": "stop"
                }],
                "usage": {
                    "prompt_tokens": 10,
                    "completion_tokens": 5,
                    "total_tokens": 15
                }
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test prompt".to_string(),
        max_tokens: Some(100),
        temperature: Some(0.7),
        timeout_seconds: Some(10),
    };

    let response = provider.generate(request).await.unwrap();
    assert_eq!(response.content, "This is a test response");
    assert_eq!(response.usage.prompt_tokens, 10);
    assert_eq!(response.usage.completion_tokens, 5);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.model, "gpt-4o-mini");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_summarize_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::Regex("about 200 characters".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "  Server Components render on the server and stream HTML.  "
                    }
                }]
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let summary = provider
        .summarize("React Server Components explained at length.", 200)
        .await
        .unwrap();
    assert_eq!(summary, "Server Components render on the server and stream HTML.");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_error_handling() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let err = provider.summarize("Some content.", 100).await.unwrap_err();
    assert!(matches!(err, DigestError::Summarization(_)));
    assert!(err.to_string().contains("429"));
    assert!(err.to_string().contains("Rate limit exceeded"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_without_choices() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model": "gpt-4o-mini", "choices": []}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let err = provider.summarize("Some content.", 100).await.unwrap_err();
    assert!(err.to_string().contains("no choices"));
}

#[tokio::test]
async fn test_remote_provider_empty_content_is_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    assert!(provider.summarize("Some content.", 100).await.is_err());
}

#[tokio::test]
async fn test_remote_provider_unreachable() {
    let provider = RemoteLlmProvider::new("http://127.0.0.1:9", "fake-api-key", "gpt-4o-mini")
        .with_defaults(5, 0.1);

    let err = provider.summarize("Some content.", 100).await.unwrap_err();
    assert!(matches!(err, DigestError::Summarization(_)));
}

#[tokio::test]
async fn test_remote_provider_times_out_on_stalled_body() {
    // Sends complete headers, then a fraction of the promised body, then stalls
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"choices\": [")
            .await;
        let _ = socket.flush().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let provider = RemoteLlmProvider::new(format!("http://{}/", addr), "fake-api-key", "gpt-4o-mini")
        .with_defaults(1, 0.1);

    let result = tokio::time::timeout(Duration::from_secs(5), provider.summarize("Some content.", 100))
        .await
        .expect("summarize should finish within its configured timeout");
    let err = result.unwrap_err();
    assert!(matches!(err, DigestError::Summarization(_)));
    assert!(err.to_string().contains("timed out"));
}
