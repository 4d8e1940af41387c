// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop for the file server.
///
/// Returns once `shutdown` completes. Connections already being served keep
/// running on their own tasks.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = &mut shutdown => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::static_files::StaticRoot;
    use crate::server::create_listener;
    use std::net::SocketAddr;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn raw_request(addr: SocketAddr, request: &str) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        buf
    }

    fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
        let pos = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = String::from_utf8(raw[..pos].to_vec()).unwrap();
        (head, raw[pos + 4..].to_vec())
    }

    /// Read one response off a keep-alive stream, sized by `Content-Length`
    async fn read_one_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let (head, _) = split_response(&buf);
                let length: usize = head
                    .lines()
                    .find_map(|l| {
                        let l = l.to_ascii_lowercase();
                        l.strip_prefix("content-length:").map(|v| v.trim().parse().unwrap())
                    })
                    .unwrap();
                if buf.len() >= pos + 4 + length {
                    return (head, buf[pos + 4..pos + 4 + length].to_vec());
                }
            }
            let n = stream.read(&mut chunk).await.unwrap();
            assert_ne!(n, 0, "connection closed early");
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn test_keep_alive_outlives_read_timeout() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("src");
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("index.html"), "<h1>hi</h1>").unwrap();

        let mut config = Config::load_from("definitely-missing-lanserve-config").unwrap();
        config.logging.access_log = false;
        config.performance.read_timeout = 1;
        let root = StaticRoot::new(&base, config.server.index_file.clone());
        let state = Arc::new(AppState::new(config, root));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(start_server_loop(listener, state, async {
            let _ = stop_rx.await;
        }));

        // Three requests on one connection span longer than the read timeout
        let mut stream = TcpStream::connect(addr).await.unwrap();
        for _ in 0..3 {
            stream
                .write_all(b"GET / HTTP/1.1\r\nHost: lan\r\n\r\n")
                .await
                .unwrap();
            let (head, body) = read_one_response(&mut stream).await;
            assert!(head.starts_with("HTTP/1.1 200"), "{head}");
            assert_eq!(body, b"<h1>hi</h1>");
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("src");
        std::fs::create_dir_all(base.join("assets")).unwrap();
        std::fs::write(base.join("index.html"), "<h1>hi</h1>").unwrap();
        let logo: Vec<u8> = (0..=255u8).collect();
        std::fs::write(base.join("assets/logo.png"), &logo).unwrap();

        let mut config = Config::load_from("definitely-missing-lanserve-config").unwrap();
        config.logging.access_log = false;
        let root = StaticRoot::new(&base, config.server.index_file.clone());
        let state = Arc::new(AppState::new(config, root));

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(start_server_loop(listener, state, async {
            let _ = stop_rx.await;
        }));

        let raw = raw_request(addr, "GET / HTTP/1.1\r\nHost: lan\r\nConnection: close\r\n\r\n").await;
        let (head, body) = split_response(&raw);
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert_eq!(body, b"<h1>hi</h1>");

        let raw = raw_request(
            addr,
            "GET /assets/logo.png HTTP/1.1\r\nHost: lan\r\nConnection: close\r\n\r\n",
        )
        .await;
        let (head, body) = split_response(&raw);
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert!(head.to_ascii_lowercase().contains("content-type: image/png"));
        assert_eq!(body, logo);

        let raw = raw_request(
            addr,
            "GET /missing.js HTTP/1.1\r\nHost: lan\r\nConnection: close\r\n\r\n",
        )
        .await;
        let (head, _) = split_response(&raw);
        assert!(head.starts_with("HTTP/1.1 404"), "{head}");

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
