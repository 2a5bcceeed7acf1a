#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use leadform::adapters::api_handler::ApiState;
use leadform::config::Settings;
use serde_json::Value;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

/// App over an in-memory store with the default form seeded
pub async fn test_app() -> (Router, ApiState) {
    test_app_with(Settings::default()).await
}

pub async fn test_app_with(settings: Settings) -> (Router, ApiState) {
    let state = leadform::build_state(&settings).await.unwrap();
    let app = leadform::create_app(state.clone(), &settings);
    (app, state)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

pub async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn send_text(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

/// Webhook endpoint on a random local port that forwards every JSON body it receives
pub struct WebhookReceiver {
    pub addr: SocketAddr,
    pub url: String,
    received: mpsc::UnboundedReceiver<Value>,
}

impl WebhookReceiver {
    pub async fn start() -> Self {
        let (tx, received) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    StatusCode::OK
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        WebhookReceiver {
            addr,
            url: format!("http://{}/hook", addr),
            received,
        }
    }

    pub async fn next(&mut self) -> Value {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.received.recv())
            .await
            .expect("webhook was not called")
            .expect("webhook channel closed")
    }

    pub fn try_next(&mut self) -> Option<Value> {
        self.received.try_recv().ok()
    }
}
