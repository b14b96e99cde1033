use fileserve::config::{AppState, Config, RouteConfig, SourceConfig};
use fileserve::http::CacheControl;
use fileserve::server::{self, ServerExit, ShutdownHandle, ShutdownReason};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn test_config() -> Config {
    let mut cfg = Config::load_from("does-not-exist/config").unwrap();
    cfg.logging.access_log = false;
    cfg.routes = vec![RouteConfig {
        path: "/hello".into(),
        source: SourceConfig::Data {
            content: "hello world".into(),
        },
        content_type: Some("text/plain".into()),
        cache_control: Some(CacheControl {
            max_age: Some(60),
            ..Default::default()
        }),
        disposition: None,
    }];
    cfg
}

async fn send(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_over_tcp_until_restart() {
    let state = Arc::new(AppState::new(&test_config()).unwrap());
    let listener = server::create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(ShutdownHandle::new());

    let server_task = tokio::spawn(server::start_server_loop(
        listener,
        state,
        Arc::clone(&shutdown),
    ));

    let full = send(
        addr,
        "GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(full.starts_with("HTTP/1.1 200 OK"), "{full}");
    assert!(full.contains("cache-control: public, max-age=60"));
    assert!(full.ends_with("hello world"));

    let partial = send(
        addr,
        "GET /hello HTTP/1.1\r\nHost: localhost\r\nRange: bytes=6-\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(partial.starts_with("HTTP/1.1 206 Partial Content"), "{partial}");
    assert!(partial.contains("content-range: bytes 6-10/11"));
    assert!(partial.ends_with("world"));

    let missing = send(
        addr,
        "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    shutdown.trigger(ShutdownReason::Restart);
    let exit = tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exit, ServerExit::Restart);
}
