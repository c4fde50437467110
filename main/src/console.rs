use std::sync::Arc;

use common::conversation::{ConversationSink, Sender};
use retrieval_pipeline::ChatAssistant;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing::error;

/// Prints conversation lines to stdout.
pub struct StdoutSink;

pub fn render_line(text: &str, sender: Sender) -> String {
    format!("[{sender}] {text}")
}

impl ConversationSink for StdoutSink {
    fn display(&self, text: &str, sender: Sender) {
        println!("{}", render_line(text, sender));
    }
}

/// Reads questions from stdin until EOF.
///
/// Every line is answered on its own task, so replies can arrive out of order.
pub async fn run_chat(assistant: Arc<ChatAssistant>) -> anyhow::Result<()> {
    let corpus = Arc::clone(assistant.corpus());
    tokio::spawn(async move {
        corpus.ready().await;
    });

    let sink = Arc::new(StdoutSink);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        let assistant = Arc::clone(&assistant);
        let sink = Arc::clone(&sink);
        in_flight.spawn(async move {
            assistant.submit(&line, sink.as_ref()).await;
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!("Question task failed: {e}");
        }
    }

    Ok(())
}
