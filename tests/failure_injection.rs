//! Failure injection tests: unreachable, truncating and slow backends.

use axum::{routing::get, Router};
use std::time::Duration;

mod common;

#[tokio::test]
async fn unreachable_backend_yields_502_with_cors() {
    let backend = common::unused_addr().await;
    let proxy = common::start_proxy(backend).await;
    let client = common::client();

    for method in [reqwest::Method::GET, reqwest::Method::POST] {
        let res = client
            .request(method, proxy.url("/api/status"))
            .body("{}")
            .send()
            .await
            .expect("proxy must answer, not hang");

        assert_eq!(res.status(), 502);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        let body = res.text().await.unwrap();
        assert!(body.starts_with("Proxy error: "), "body was {body:?}");
        assert!(body.to_lowercase().contains("refused"), "body should name the cause: {body:?}");
    }
}

#[tokio::test]
async fn backend_dropping_mid_body_aborts_client_stream() {
    let (backend, accepted) = common::start_raw_backend(
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\npartial",
    )
    .await;
    let proxy = common::start_proxy(backend).await;

    let res = common::client().get(proxy.url("/api/results")).send().await.unwrap();

    // Headers were already relayed, so the status cannot change.
    assert_eq!(res.status(), 200);
    assert!(res.bytes().await.is_err(), "truncated body must surface as an error");
    assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_backend_response_yields_502() {
    let (backend, _) = common::start_raw_backend(b"this is not http\r\n\r\n").await;
    let proxy = common::start_proxy(backend).await;

    let res = common::client().get(proxy.url("/api/status")).send().await.unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");
}

#[tokio::test]
async fn response_deadline_maps_to_504() {
    let app = Router::new().route(
        "/api/analyze-sentiment",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "late"
        }),
    );
    let backend = common::start_axum_backend(app).await;
    let proxy = common::start_proxy_with(backend, |config| config.timeouts.response_secs = 1).await;

    let res = common::client()
        .get(proxy.url("/api/analyze-sentiment"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn no_deadline_by_default() {
    let app = Router::new().route(
        "/api/simulate-conversations",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            "done"
        }),
    );
    let backend = common::start_axum_backend(app).await;
    let proxy = common::start_proxy(backend).await;

    let res = common::client()
        .get(proxy.url("/api/simulate-conversations"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");
}

#[tokio::test]
async fn shutdown_stops_the_server() {
    let backend = common::unused_addr().await;
    let proxy = common::start_proxy(backend).await;

    proxy.shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), proxy.handle)
        .await
        .expect("server should stop promptly")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn malformed_inbound_request_is_rejected_without_backend() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let (backend, accepted) = common::start_raw_backend(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
    let proxy = common::start_proxy(backend).await;

    let mut socket = tokio::net::TcpStream::connect(proxy.addr).await.unwrap();
    socket.write_all(b"GET /api/status HTTP/1.1\r\nbroken header line\r\n\r\n").await.unwrap();

    let mut reply = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(5), socket.read_to_end(&mut reply)).await;

    // hyper rejects unparseable requests before the handler runs, so this 400
    // carries no CORS headers; browsers never produce such requests.

    assert!(reply.starts_with(b"HTTP/1.1 400"), "got {:?}", String::from_utf8_lossy(&reply));
    assert_eq!(accepted.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn client_disconnect_closes_backend_connection() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Backend that reads the request, never answers, and reports EOF.
    let backend_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = backend_listener.local_addr().unwrap();
    let (accepted_tx, accepted_rx) = tokio::sync::oneshot::channel();
    let (closed_tx, closed_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = backend_listener.accept().await.unwrap();
        let _ = accepted_tx.send(());
        let mut buf = [0u8; 1024];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = closed_tx.send(());
    });

    let proxy = common::start_proxy(backend).await;

    let mut client = tokio::net::TcpStream::connect(proxy.addr).await.unwrap();
    client
        .write_all(b"GET /api/status HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), accepted_rx)
        .await
        .expect("request should reach the backend")
        .unwrap();

    drop(client);

    tokio::time::timeout(Duration::from_secs(5), closed_rx)
        .await
        .expect("backend connection should close after the client leaves")
        .unwrap();
}
