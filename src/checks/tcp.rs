//! Ping-style TCP reachability check.

use crate::check::Check;
use crate::status::Status;
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::warn;

/// Checks that a TCP connection to the given address can be established.
///
/// A successful connect only proves the dependency is reachable and
/// accepting connections; it says nothing about application-level health.
/// The connect attempt is bounded by the owning component's timeout.
pub struct TcpCheck {
    addr: String,
}

impl TcpCheck {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Check for TcpCheck {
    async fn status(&self) -> Status {
        match TcpStream::connect(&self.addr).await {
            Ok(_) => Status::Up,
            Err(e) => {
                warn!("TCP check for {} failed: {}", self.addr, e);
                Status::Down
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn up_when_listener_accepts() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });

        let check = TcpCheck::new(addr.to_string());
        assert_eq!(check.status().await, Status::Up);
    }

    #[tokio::test]
    async fn down_when_connection_refused() {
        // Bind and immediately drop to find a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let check = TcpCheck::new(addr.to_string());
        assert_eq!(check.status().await, Status::Down);
    }
}
