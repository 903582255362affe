//! TCP transport for the line protocol.

use std::net::SocketAddr;
use std::time::Duration;

use log::{info, trace};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use super::{encode_request, Channel, Outcome, Symbol};
use crate::config::MAX_RESPONSE_BYTES;
use crate::error_handling::{ChannelError, InitializationError};

/// One persistent connection to the probed service.
///
/// The connection is opened once per discovery run and closed when the channel
/// is dropped, whether the run succeeded or not.
pub struct TcpChannel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    timeout: Option<Duration>,
}

impl TcpChannel {
    /// Connects to `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ConnectError` if the address cannot be
    /// resolved or the connection is refused.
    pub async fn connect(
        address: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, InitializationError> {
        let connect_error = |source| InitializationError::ConnectError {
            address: address.to_string(),
            source,
        };
        info!("Connecting to {}", address);
        let stream = TcpStream::connect(address).await.map_err(connect_error)?;
        let channel = Self::from_stream(stream, timeout).map_err(connect_error)?;
        info!("Connected to {}", channel.peer);
        Ok(channel)
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream, timeout: Option<Duration>) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            timeout,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn exchange(&mut self, request: &[u8]) -> Result<Outcome, ChannelError> {
        if !self.reader.buffer().is_empty() {
            return Err(unsolicited(self.reader.buffer()));
        }
        self.writer.write_all(request).await?;

        let mut line = Vec::with_capacity(2);
        let read = (&mut self.reader)
            .take(MAX_RESPONSE_BYTES)
            .read_until(b'\n', &mut line)
            .await?;

        if read == 0 {
            return Err(ChannelError::Closed);
        }
        if line.last() != Some(&b'\n') && (read as u64) < MAX_RESPONSE_BYTES {
            // EOF in the middle of a line
            return Err(ChannelError::Closed);
        }
        // One request, one line: anything behind it would answer a later probe
        if !self.reader.buffer().is_empty() {
            return Err(unsolicited(self.reader.buffer()));
        }
        Outcome::decode(&line)
    }
}

fn unsolicited(extra: &[u8]) -> ChannelError {
    ChannelError::Protocol(format!(
        "unexpected bytes after response: {:?}",
        String::from_utf8_lossy(extra)
    ))
}

impl<S: Symbol> Channel<S> for TcpChannel {
    async fn probe(&mut self, symbol: &S) -> Result<Outcome, ChannelError> {
        let request = encode_request(symbol);
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(request.as_bytes()))
                .await
                .map_err(|_| ChannelError::Timeout(limit))??,
            None => self.exchange(request.as_bytes()).await?,
        };
        trace!("{} -> {}: {}", symbol, self.peer, outcome);
        Ok(outcome)
    }
}
