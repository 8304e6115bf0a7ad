//! TCP liveness responder
//!
//! Some hosting platforms terminate a process whose health probe never
//! answers. This responder accepts every connection, writes one fixed
//! HTTP 200 response and closes. No routing, no state.

use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{info, warn};

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: text/plain\r\n\
Content-Length: 14\r\n\
Connection: close\r\n\
\r\n\
Bot is running";

/// Bind the liveness listener.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(host: &str, port: u16) -> io::Result<TcpListener> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("Health check listening on {}:{}", host, port);
    Ok(listener)
}

/// Answer every accepted connection with a fixed 200 response, forever.
pub async fn serve(listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((mut socket, _)) => {
                tokio::spawn(async move {
                    if let Err(err) = socket.write_all(RESPONSE).await {
                        warn!(error = %err, "health probe write failed");
                    }
                    let _ = socket.shutdown().await;
                });
            }
            Err(err) => {
                warn!(error = %err, "health probe accept failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_probe_gets_fixed_200() {
        let listener = bind("127.0.0.1", 0).await.expect("bind health listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(serve(listener));

        let mut stream = TcpStream::connect(addr).await.expect("connect probe");
        let mut reply = String::new();
        stream
            .read_to_string(&mut reply)
            .await
            .expect("read probe reply");

        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.ends_with("Bot is running"));
    }
}
