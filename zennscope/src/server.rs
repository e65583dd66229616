use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::Serialize;
use serde_json::{json, Value};

use common::ServerConfig;

use crate::tools::{list_tools, ToolBox, ToolSpec};

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub toolbox: Arc<ToolBox>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: i64,
}

#[derive(Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

/// Response body of a tool call, shaped like an MCP `CallToolResult`.
#[derive(Serialize)]
struct ToolCallResponse {
    content: Vec<TextContent>,
    is_error: bool,
}

#[get("/health")]
async fn health(state: &State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    })
}

#[get("/tools")]
async fn tools() -> Json<Vec<ToolSpec>> {
    Json(list_tools())
}

/// Calls a tool. A missing or non-JSON body is treated as empty arguments.
#[post("/tools/<name>", data = "<arguments>")]
async fn call_tool(state: &State<AppState>, name: &str, arguments: Option<Json<Value>>) -> Json<ToolCallResponse> {
    let arguments = arguments.map(|a| a.into_inner()).unwrap_or_else(|| json!({}));
    let output = state.toolbox.call_tool(name, arguments).await;

    Json(ToolCallResponse {
        content: vec![TextContent {
            kind: "text",
            text: output.text,
        }],
        is_error: output.is_error,
    })
}

/// Rocket instance with the tool routes mounted, bound per `[server]`.
pub fn build_rocket(toolbox: Arc<ToolBox>, server: &ServerConfig) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    let state = AppState {
        started_at: Utc::now(),
        toolbox,
    };

    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![health, tools, call_tool])
}

/// Runs the HTTP tool server until Rocket shuts down (SIGINT/SIGTERM).
pub async fn launch(toolbox: Arc<ToolBox>, server: &ServerConfig) -> Result<()> {
    tracing::info!(bind = %server.bind, port = server.port, "starting Rocket HTTP server");
    build_rocket(toolbox, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
