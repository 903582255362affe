// Shared test helpers: in-process services speaking the line protocol and a
// timed token-bucket channel.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::Instant;

use bucket_probe::oracle::ReferenceOracle;
use bucket_probe::{Channel, ChannelError, Outcome};

/// Starts a service answering from a `ReferenceOracle` built from `groups`.
///
/// Each connection gets a fresh oracle. Unknown symbols are rejected, as the
/// real service does. Returns the address and a counter of accepted connections.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_oracle_server(groups: Vec<Vec<char>>) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut oracle =
                ReferenceOracle::new(groups.clone()).expect("Invalid ground-truth groups");
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut lines = BufReader::new(read_half).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let outcome = match line.chars().next() {
                        Some(symbol) => oracle.probe(&symbol).await.unwrap_or(Outcome::Rejected),
                        None => Outcome::Rejected,
                    };
                    if write_half.write_all(outcome.encode()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (addr, connections)
}

/// Starts a service answering `reply` to every request line.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_scripted_server(reply: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut lines = BufReader::new(read_half).lines();
                while let Ok(Some(_)) = lines.next_line().await {
                    if write_half.write_all(reply).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

/// Returns a free local address with nothing listening on it.
#[allow(dead_code)] // Used by other test files
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    listener.local_addr().expect("Listener has no address")
}

/// Delays every probe of the wrapped channel by `latency`, like a network
/// round trip.
#[allow(dead_code)] // Used by other test files
pub struct Delayed<C> {
    pub inner: C,
    pub latency: Duration,
}

impl<C: Channel<char> + Send> Channel<char> for Delayed<C> {
    async fn probe(&mut self, symbol: &char) -> Result<Outcome, ChannelError> {
        tokio::time::sleep(self.latency).await;
        self.inner.probe(symbol).await
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Token buckets on the tokio clock, one per group.
///
/// Each bucket holds at most `rate` tokens, starts full and regains one token
/// every `1/rate` seconds. Levels are kept in token-nanoseconds so refill is
/// exact under a paused clock.
#[allow(dead_code)] // Used by other test files
pub struct SimulatedBuckets {
    group_of: HashMap<char, usize>,
    levels: Vec<u128>,
    updated: Vec<Instant>,
    rate: u128,
}

#[allow(dead_code)] // Used by other test files
impl SimulatedBuckets {
    pub fn new(groups: &[Vec<char>], rate: u32) -> Self {
        let rate = u128::from(rate);
        let mut group_of = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for symbol in group {
                group_of.insert(*symbol, index);
            }
        }
        let now = Instant::now();
        Self {
            group_of,
            levels: vec![rate * NANOS_PER_SEC; groups.len()],
            updated: vec![now; groups.len()],
            rate,
        }
    }
}

impl Channel<char> for SimulatedBuckets {
    async fn probe(&mut self, symbol: &char) -> Result<Outcome, ChannelError> {
        let Some(&group) = self.group_of.get(symbol) else {
            return Ok(Outcome::Rejected);
        };
        let now = Instant::now();
        let elapsed = now.duration_since(self.updated[group]).as_nanos();
        let capacity = self.rate * NANOS_PER_SEC;
        self.levels[group] = (self.levels[group] + elapsed * self.rate).min(capacity);
        self.updated[group] = now;

        if self.levels[group] >= NANOS_PER_SEC {
            self.levels[group] -= NANOS_PER_SEC;
            Ok(Outcome::Accepted)
        } else {
            Ok(Outcome::Rejected)
        }
    }
}
