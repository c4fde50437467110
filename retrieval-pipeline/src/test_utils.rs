//! Helpers for exercising the pipeline against local HTTP servers.
#![allow(clippy::expect_used)]

use std::{net::SocketAddr, sync::Mutex};

use axum::Router;
use common::conversation::{ConversationSink, Sender};
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral localhost port for the rest of the test.
pub async fn spawn_mock_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener
        .local_addr()
        .expect("Failed to read mock server address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    addr
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    listener
        .local_addr()
        .expect("Failed to read probe address")
}

/// Sink that remembers everything it was asked to display.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(String, Sender)>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<(String, Sender)> {
        self.entries
            .lock()
            .expect("RecordingSink lock poisoned")
            .clone()
    }
}

impl ConversationSink for RecordingSink {
    fn display(&self, text: &str, sender: Sender) {
        self.entries
            .lock()
            .expect("RecordingSink lock poisoned")
            .push((text.to_owned(), sender));
    }
}
