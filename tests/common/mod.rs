//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use collections_gateway::config::GatewayConfig;
use collections_gateway::http::HttpServer;
use collections_gateway::lifecycle::Shutdown;
use collections_gateway::registry::{ServiceDescriptor, ServiceRegistry};

/// Descriptor pointing at a local mock backend.
#[allow(dead_code)]
pub fn descriptor(name: &str, addr: SocketAddr) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.into(),
        protocol: "http".into(),
        host: addr.ip().to_string(),
        port: addr.port(),
    }
}

/// Start a gateway on `addr` and return its shutdown handle.
pub async fn start_gateway(
    config: GatewayConfig,
    registry: ServiceRegistry,
    addr: SocketAddr,
) -> Shutdown {
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, registry);
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

/// Start a backend that echoes the request line target back as the body.
///
/// A request for `GET /x/y?q=1` yields the body `GET /x/y?q=1`, which lets
/// tests assert the exact URL the gateway rewrote to.
#[allow(dead_code)]
pub async fn start_echo_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let head = match read_head(&mut socket).await {
                            Some(head) => head,
                            None => return,
                        };
                        let request_line = head.lines().next().unwrap_or("").to_string();
                        let body = request_line
                            .rsplit_once(' ')
                            .map(|(left, _)| left.to_string())
                            .unwrap_or(request_line);
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that echoes one request header's value back as the body.
#[allow(dead_code)]
pub async fn start_header_echo_backend(addr: SocketAddr, header: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let head = match read_head(&mut socket).await {
                            Some(head) => head,
                            None => return,
                        };
                        let prefix = format!("{}:", header);
                        let body = head
                            .lines()
                            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
                            .and_then(|line| line.split_once(':').map(|(_, v)| v.trim().to_string()))
                            .unwrap_or_default();
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that only counts connections and responds 200.
///
/// Used to assert that the gateway made no outbound attempt.
#[allow(dead_code)]
pub async fn start_counting_backend(addr: SocketAddr) -> Arc<AtomicU32> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let count = Arc::new(AtomicU32::new(0));
    let counter = count.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let response_str =
                            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    count
}

/// Start a backend that reads the request and then resets the connection.
///
/// SO_LINGER of zero makes the close emit RST instead of FIN, so the
/// gateway's outbound leg observes ECONNRESET.
#[allow(dead_code)]
pub async fn start_rst_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 256];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.set_linger(Some(Duration::from_secs(0)));
                        drop(socket);
                    });
                }
                Err(_) => break,
            }
        }
    });
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = vec![0u8; 8192];
    let mut read_total = 0;
    loop {
        match socket.read(&mut buf[read_total..]).await {
            Ok(0) => break,
            Ok(n) => {
                read_total += n;
                if buf[..read_total].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
                if read_total == buf.len() {
                    break;
                }
            }
            Err(_) => return None,
        }
    }
    Some(String::from_utf8_lossy(&buf[..read_total]).to_string())
}
