//! In-process stand-in for the Telegram Bot API.

use std::sync::{Arc, Mutex};

use {
    axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
    serde_json::{Value, json},
    tokio::{sync::oneshot, task::JoinHandle},
};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Bot API method as it appears in the path, e.g. `SendMessage`.
    pub method: String,
    /// Raw request body, JSON or multipart.
    pub body: String,
}

#[derive(Clone)]
struct ApiState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    fail: bool,
}

pub struct MockTelegramApi {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    base_url: reqwest::Url,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

async fn api_handler(State(state): State<ApiState>, uri: Uri, body: Bytes) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    state
        .requests
        .lock()
        .expect("lock requests")
        .push(CapturedRequest {
            method,
            body: String::from_utf8_lossy(&body).to_string(),
        });

    if state.fail {
        return Json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }));
    }
    Json(json!({
        "ok": true,
        "result": {
            "message_id": 1,
            "date": 0,
            "chat": { "id": -1009, "type": "channel", "title": "Destination" },
            "text": "ok"
        }
    }))
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        Self::spawn(false).await
    }

    /// Every call answers with a Bot API error.
    pub async fn start_failing() -> Self {
        Self::spawn(true).await
    }

    async fn spawn(fail: bool) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/{*path}", post(api_handler))
            .with_state(ApiState {
                requests: Arc::clone(&requests),
                fail,
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        let base_url = reqwest::Url::parse(&format!("http://{addr}/")).expect("parse api url");
        Self {
            requests,
            base_url,
            shutdown_tx,
            server,
        }
    }

    pub fn bot(&self) -> teloxide::Bot {
        teloxide::Bot::new("test-token").set_api_url(self.base_url.clone())
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("lock requests").clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        self.server.await.expect("join mock server");
    }
}
