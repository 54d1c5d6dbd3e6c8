//! Throwaway upstream servers for exercising the outbound HTTP clients.

use std::sync::{Arc, Mutex};

use axum::{
    http::{HeaderMap, Uri},
    routing::{post, MethodRouter},
    Json, Router,
};
use serde_json::Value;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("upstream server");
    });
    format!("http://{}", addr)
}

/// A request as seen by a fake upstream
#[derive(Debug, Clone)]
pub struct Recorded {
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Captured(Arc<Mutex<Option<Recorded>>>);

impl Captured {
    pub fn take(&self) -> Option<Recorded> {
        self.0.lock().unwrap().take()
    }

    fn record(&self, recorded: Recorded) {
        *self.0.lock().unwrap() = Some(recorded);
    }
}

/// POST handler that records the JSON body it receives and answers with `reply`.
pub fn capture_json(captured: &Captured, reply: Value) -> MethodRouter {
    let sink = captured.clone();
    post(move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
        let sink = sink.clone();
        let reply = reply.clone();
        async move {
            sink.record(Recorded { uri, headers, body });
            Json(reply)
        }
    })
}
