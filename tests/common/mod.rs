//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use request_relay::config::RelayConfig;
use request_relay::notify::{NotificationMessage, Notifier, NotifyError};
use request_relay::security::{Clock, MemoryStore, RateLimiter, SystemClock};
use request_relay::{HttpServer, Shutdown};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Notifier that keeps every message it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationMessage>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A relay running on an ephemeral port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self) -> String {
        format!("http://{}/api/request", self.addr)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay with the given notifier and clock.
pub async fn start_relay_with(
    mut config: RelayConfig,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> RunningRelay {
    config.rate_limit.sweep_interval_secs = 0;
    let limiter = Arc::new(RateLimiter::with_parts(
        &config.rate_limit,
        Arc::new(MemoryStore::new()),
        clock,
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_parts(config, notifier, limiter);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningRelay { addr, shutdown }
}

/// Start a relay on the system clock.
pub async fn start_relay(config: RelayConfig, notifier: Arc<dyn Notifier>) -> RunningRelay {
    start_relay_with(config, notifier, Arc::new(SystemClock)).await
}

/// A request received by the mail API stub.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// Start a mail API stub answering every request with `status` and
/// recording what it received.
pub async fn start_mail_api(status: u16) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let sink = sink.clone();
            tokio::spawn(async move {
                if let Some(request) = read_request(&mut socket).await {
                    sink.lock().unwrap().push(request);
                }
                let status_text = match status {
                    200 => "200 OK",
                    401 => "401 Unauthorized",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let body = if status == 200 { "{\"queued\":true}" } else { "mail service down" };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, captured)
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
    Some(CapturedRequest { head, body })
}

/// Client that never pools connections, so each request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn valid_submission() -> serde_json::Value {
    serde_json::json!({
        "name": "Ann",
        "email": "ann@example.com",
        "phone": "12345678901"
    })
}
