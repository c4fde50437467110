mod console;

use std::sync::Arc;

use anyhow::{bail, Context};
use api_router::{api_routes_v1, api_state::ApiState};
use axum::{extract::FromRef, Router};
use clap::{Parser, Subcommand};
use common::utils::config::get_config;
use retrieval_pipeline::ChatAssistant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "dashboard-assistant",
    about = "Answers questions about the airport analytics dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the chat API under /api/v1
    Serve {
        /// Overrides `http_port` from the configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer one question and exit
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Read questions from stdin, one per line
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = get_config().context("Failed to load configuration")?;
    let assistant = Arc::new(ChatAssistant::from_config(&config)?);

    match cli.command {
        Command::Serve { port } => serve(assistant, port.unwrap_or(config.http_port)).await,
        Command::Ask { question } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                bail!("question must not be empty");
            }
            println!("{}", assistant.answer(question.trim()).await);
            Ok(())
        }
        Command::Chat => console::run_chat(assistant).await,
    }
}

async fn serve(assistant: Arc<ChatAssistant>, port: u16) -> anyhow::Result<()> {
    // Questions that arrive before this finishes wait for it.
    let corpus = Arc::clone(assistant.corpus());
    tokio::spawn(async move {
        corpus.ready().await;
    });

    let app = app(ApiState::with_assistant(assistant));

    let serve_address = format!("0.0.0.0:{port}");
    info!("Starting server listening on {serve_address}");
    let listener = tokio::net::TcpListener::bind(&serve_address)
        .await
        .with_context(|| format!("Failed to bind {serve_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(api_state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes_v1())
        .with_state(AppState { api_state })
}

#[derive(Clone, FromRef)]
struct AppState {
    api_state: ApiState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use clap::CommandFactory;
    use common::utils::config::AppConfig;
    use tower::ServiceExt;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_ask_words() {
        let cli = Cli::try_parse_from(["dashboard-assistant", "ask", "busiest", "hour?"])
            .expect("parse");
        match cli.command {
            Command::Ask { question } => assert_eq!(question.join(" "), "busiest hour?"),
            other => panic!("expected ask, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["dashboard-assistant", "ask"]).is_err());
    }

    #[tokio::test]
    async fn smoke_api_is_nested_under_v1() {
        let state = ApiState::new(&AppConfig::default()).expect("api state");
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "ok");
    }
}
