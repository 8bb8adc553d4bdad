//! Connection negotiation.
//!
//! Both devices dial and listen at the same time, so an attempt can end with
//! zero, one, or two live sockets. Two sockets are collapsed to one by a
//! coin-flip protocol: each round, every device draws a random bit, sends it
//! on the socket it dialed, and reads the peer's bit from the socket it
//! accepted. The lower bit keeps its dialed socket, the higher keeps its
//! accepted one, and both land on the same underlying connection. Tied
//! rounds repeat up to a bound, after which device identities decide.

use std::cmp::Ordering;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

use inklink_core::DeviceId;

use crate::cancel::CancelToken;
use crate::connector::Connector;

/// Tuning for a negotiation attempt.
#[derive(Debug, Clone)]
pub struct NegotiateConfig {
    /// How long to wait for an inbound connection.
    pub accept_timeout: Duration,
    /// Coin-flip rounds before falling back to device identities.
    pub coin_flip_max_rounds: u32,
}

impl Default for NegotiateConfig {
    fn default() -> Self {
        Self {
            accept_timeout: Duration::from_secs(30),
            coin_flip_max_rounds: 16,
        }
    }
}

/// Errors that can occur while negotiating a connection.
#[derive(Debug, Error)]
pub enum NegotiateError {
    /// Neither direction produced a socket.
    #[error("no connection: dial failed ({dial}), accept failed ({accept})")]
    NoConnection {
        dial: std::io::Error,
        accept: std::io::Error,
    },

    /// A live socket failed during the tie-break exchange.
    #[error("tie-break I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Both devices claim the same identity, so no tie can ever break.
    #[error("peer claims our own device id {0}")]
    IdentityTie(DeviceId),

    /// Negotiation was cancelled locally.
    #[error("negotiation cancelled")]
    Cancelled,
}

/// Runs negotiation attempts against one peer.
pub struct Negotiator<C> {
    connector: C,
    device: DeviceId,
    config: NegotiateConfig,
}

impl<C: Connector> Negotiator<C> {
    pub fn new(connector: C, device: DeviceId, config: NegotiateConfig) -> Self {
        Self {
            connector,
            device,
            config,
        }
    }

    /// Produce exactly one session socket to `peer`, or an error.
    pub async fn connect(
        &self,
        peer: DeviceId,
        cancel: &CancelToken,
    ) -> Result<C::Socket, NegotiateError> {
        let attempt = async {
            tokio::join!(self.connector.dial(), async {
                match timeout(self.config.accept_timeout, self.connector.accept()).await {
                    Ok(res) => res,
                    Err(_) => Err(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "no inbound connection",
                    )),
                }
            })
        };

        let (dialed, accepted) = tokio::select! {
            pair = attempt => pair,
            _ = cancel.cancelled() => return Err(NegotiateError::Cancelled),
        };

        match (dialed, accepted) {
            (Err(dial), Err(accept)) => Err(NegotiateError::NoConnection { dial, accept }),
            (Ok(socket), Err(e)) => {
                tracing::debug!(error = %e, "accept lost the race, keeping dialed socket");
                Ok(socket)
            }
            (Err(e), Ok(socket)) => {
                tracing::debug!(error = %e, "dial lost the race, keeping accepted socket");
                Ok(socket)
            }
            // The tie-break blocks on peer I/O, so stop() must unblock it
            // too. Dropping the raced future closes both sockets.
            (Ok(dialed), Ok(accepted)) => tokio::select! {
                socket = self.tie_break(dialed, accepted, peer) => socket,
                _ = cancel.cancelled() => Err(NegotiateError::Cancelled),
            },
        }
    }

    /// Collapse two live sockets to one. See the module docs for the scheme.
    async fn tie_break(
        &self,
        mut dialed: C::Socket,
        mut accepted: C::Socket,
        peer: DeviceId,
    ) -> Result<C::Socket, NegotiateError> {
        for round in 0..self.config.coin_flip_max_rounds {
            let mine: u8 = rand::thread_rng().gen_range(0..=1);
            dialed.write_all(&[mine]).await?;
            dialed.flush().await?;
            let mut theirs = [0u8; 1];
            accepted.read_exact(&mut theirs).await?;
            tracing::trace!(round, mine, theirs = theirs[0], "coin flip");

            match mine.cmp(&theirs[0]) {
                Ordering::Less => {
                    tracing::debug!(round, "won the flip, keeping dialed socket");
                    return Ok(discard(accepted, dialed).await);
                }
                Ordering::Greater => {
                    tracing::debug!(round, "lost the flip, keeping accepted socket");
                    return Ok(discard(dialed, accepted).await);
                }
                Ordering::Equal => continue,
            }
        }

        // Every round tied. Identities order the devices the same way the
        // coin bits would have.
        match self.device.cmp(&peer) {
            Ordering::Less => Ok(discard(accepted, dialed).await),
            Ordering::Greater => Ok(discard(dialed, accepted).await),
            Ordering::Equal => Err(NegotiateError::IdentityTie(peer)),
        }
    }
}

async fn discard<S: AsyncWriteExt + Unpin>(mut loser: S, winner: S) -> S {
    let _ = loser.shutdown().await;
    winner
}
