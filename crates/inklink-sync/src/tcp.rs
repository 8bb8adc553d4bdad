//! TCP connector.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};

use crate::connector::Connector;

/// Connects to one peer over TCP while listening for it to connect back.
pub struct TcpConnector {
    listener: TcpListener,
    peer: SocketAddr,
}

impl TcpConnector {
    /// Bind the local listener and remember the peer's address.
    pub async fn bind(local: SocketAddr, peer: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(local).await?;
        Ok(Self { listener, peer })
    }

    /// The bound listener address, useful when binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Socket = TcpStream;

    async fn dial(&self) -> std::io::Result<TcpStream> {
        let stream = TcpStream::connect(self.peer).await?;
        // Frames are small and ack-paced; never batch them.
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    async fn accept(&self) -> std::io::Result<TcpStream> {
        let (stream, _addr) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_dial_reaches_accept_over_loopback() {
        let placeholder: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let a = TcpConnector::bind("127.0.0.1:0".parse().unwrap(), placeholder)
            .await
            .unwrap();
        let b = TcpConnector::bind("127.0.0.1:0".parse().unwrap(), a.local_addr().unwrap())
            .await
            .unwrap();

        let (dialed, accepted) = tokio::join!(b.dial(), a.accept());
        let mut dialed = dialed.unwrap();
        let mut accepted = accepted.unwrap();

        dialed.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        accepted.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }
}
