//! `HttpTransport` against a local socket that cuts a success response short.
//!
//! Runs on the real clock: nothing here sleeps, and a resent request would
//! show up in the server's request count.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use verdant_core::LocationIndex;
use verdant_core::config::{AssistantConfig, VerdantConfig};
use verdant_llm::{AssistantClient, ErrorKind, GenerateRequest, HttpTransport, OutboundRequest, Transport};

/// Announces 500 body bytes, delivers 13, then closes.
const TRUNCATED_SUCCESS: &[u8] = b"HTTP/1.1 200 OK\r\n\
content-type: application/json\r\n\
content-length: 500\r\n\
connection: close\r\n\
\r\n\
{\"candidates\"";

/// Read one request (head plus `content-length` body bytes).
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return Ok(());
            }
        }
    }
}

/// Serves [`TRUNCATED_SUCCESS`] to every request and counts the requests.
async fn truncated_success_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                if read_request(&mut stream).await.is_ok() {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _ = stream.write_all(TRUNCATED_SUCCESS).await;
                    let _ = stream.shutdown().await;
                }
            });
        }
    });
    (format!("http://{addr}/generate"), requests)
}

#[tokio::test]
async fn cut_short_body_still_reports_the_status() {
    let (url, requests) = truncated_success_server().await;
    let transport = HttpTransport::new(Duration::from_secs(5));
    let request = OutboundRequest {
        url,
        api_key: "k".to_string(),
        body: GenerateRequest::new("hi", &AssistantConfig::default()),
    };

    let resp = transport.send(&request).await.expect("status line arrived");
    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreadable_success_is_format_error_and_sent_once() {
    let (url, requests) = truncated_success_server().await;
    let mut config = VerdantConfig::default();
    config.assistant.endpoint = url;
    config.assistant.api_key = Some("test-key".to_string());
    config.assistant.request_timeout_ms = 5_000;
    let client = AssistantClient::http(&config, LocationIndex::empty());

    let err = client.send_message("hello").await.expect_err("unreadable body");

    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(requests.load(Ordering::SeqCst), 1);
    let metrics = client.metrics();
    assert_eq!(metrics.dispatches, 1);
    assert_eq!(metrics.retries_network, 0);
    assert_eq!(metrics.failures.format, 1);
}
