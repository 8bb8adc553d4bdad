//! Connector abstraction for reaching a peer.
//!
//! Negotiation needs two sockets per attempt, one dialed and one accepted,
//! so the connector exposes both directions. Implementations may use TCP,
//! Bluetooth RFCOMM, or an in-memory pipe.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Opens sockets toward one specific peer.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Connector: Send + Sync {
    type Socket: AsyncRead + AsyncWrite + Send + Unpin;

    /// Open an outgoing socket to the peer.
    async fn dial(&self) -> std::io::Result<Self::Socket>;

    /// Wait for the peer to open a socket toward us.
    async fn accept(&self) -> std::io::Result<Self::Socket>;
}

#[async_trait]
impl<T: Connector + ?Sized> Connector for &T {
    type Socket = T::Socket;

    async fn dial(&self) -> std::io::Result<Self::Socket> {
        (**self).dial().await
    }

    async fn accept(&self) -> std::io::Result<Self::Socket> {
        (**self).accept().await
    }
}

/// An in-memory connector for testing.
///
/// Each dial materializes a fresh duplex pipe and hands the far end to the
/// peer's accept queue.
pub mod memory {
    use super::*;
    use tokio::io::DuplexStream;
    use tokio::sync::{mpsc, Mutex};

    const PIPE_CAPACITY: usize = 64 * 1024;

    /// One side of a simulated link between two devices.
    pub struct MemoryConnector {
        peer: mpsc::Sender<DuplexStream>,
        incoming: Mutex<mpsc::Receiver<DuplexStream>>,
    }

    impl MemoryConnector {
        /// Create both sides of a link.
        pub fn pair() -> (MemoryConnector, MemoryConnector) {
            let (a_tx, a_rx) = mpsc::channel(8);
            let (b_tx, b_rx) = mpsc::channel(8);
            (
                MemoryConnector {
                    peer: b_tx,
                    incoming: Mutex::new(a_rx),
                },
                MemoryConnector {
                    peer: a_tx,
                    incoming: Mutex::new(b_rx),
                },
            )
        }
    }

    #[async_trait]
    impl Connector for MemoryConnector {
        type Socket = DuplexStream;

        async fn dial(&self) -> std::io::Result<Self::Socket> {
            let (near, far) = tokio::io::duplex(PIPE_CAPACITY);
            self.peer.send(far).await.map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer connector dropped")
            })?;
            Ok(near)
        }

        async fn accept(&self) -> std::io::Result<Self::Socket> {
            self.incoming.lock().await.recv().await.ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer connector dropped")
            })
        }
    }
}
