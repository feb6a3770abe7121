//! Serving over a real socket.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use dispatch_gateway::lifecycle::build_dispatcher;
use dispatch_gateway::{GatewayConfig, HttpServer, Shutdown};

#[tokio::test]
async fn test_serves_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = GatewayConfig::default();
    let server = HttpServer::new(config.clone(), build_dispatcher(&config));
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=utf-8"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));

    let response = client
        .get(format!("http://{addr}/widgets/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
