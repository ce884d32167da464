// Shared helpers for tests that need a backend to talk to

use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{ClientConfig, Environment};
use crate::http::HttpClient;

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Mock backend crashed");
    });

    format!("http://{}", addr)
}

/// Base URL of a local port nothing listens on
pub async fn unreachable_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve a port");
    let addr = listener.local_addr().expect("Reserved port has no address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .expect("Invalid test base URL")
        .with_environment(Environment::Development)
        .with_request_timeout(Some(Duration::from_secs(5)))
}

pub fn test_client(base_url: &str) -> HttpClient {
    HttpClient::new(&test_config(base_url)).expect("Failed to build test client")
}

/// Authorization headers seen by a mock backend, in arrival order
#[derive(Clone, Default)]
pub struct SeenAuth(Arc<Mutex<Vec<Option<String>>>>);

impl SeenAuth {
    pub fn record(&self, headers: &axum::http::HeaderMap) {
        let value = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(value);
    }

    pub fn all(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Option<String>> {
        self.0.lock().unwrap().last().cloned()
    }
}
