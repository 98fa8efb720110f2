use crate::context::DialContext;
use crate::counters::TransferCounters;
use crate::error::DialError;
use crate::tcp::stream::CountingStream;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, error, trace};

/// Address families accepted by [`ContextDialer::dial_context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Tcp4,
    Tcp6,
}

impl Network {
    pub fn parse(network: &str) -> Result<Self, DialError> {
        match network {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            _ => Err(DialError::UnknownNetwork(network.to_string())),
        }
    }

    fn accepts(self, address: &SocketAddr) -> bool {
        match self {
            Network::Tcp => true,
            Network::Tcp4 => address.is_ipv4(),
            Network::Tcp6 => address.is_ipv6(),
        }
    }
}

/// Dials plain TCP connections whose traffic is counted.
///
/// There is no way to abort a dial other than dropping the future; use
/// [`ContextDialer`] when a deadline is needed.
#[derive(Debug, Clone)]
pub struct StreamDialer {
    counters: Arc<TransferCounters>,
}

impl StreamDialer {
    pub fn new(counters: Arc<TransferCounters>) -> Self {
        Self { counters }
    }

    pub fn counters(&self) -> &Arc<TransferCounters> {
        &self.counters
    }

    /// Connects to `address` (`host:port`).
    pub async fn dial(&self, address: &str) -> Result<CountingStream<TcpStream>, DialError> {
        trace!("Dialing TCP address: {address}...");
        let stream = match TcpStream::connect(address).await {
            Ok(stream) => stream,
            Err(error) => {
                error!("Failed to connect to: {address}, error: {error}");
                return Err(DialError::Io(error));
            }
        };

        debug!("Connected to: {address}");
        Ok(CountingStream::new(stream, self.counters.clone()))
    }
}

/// Dials TCP connections whose traffic is counted, honoring a [`DialContext`].
#[derive(Debug, Clone)]
pub struct ContextDialer {
    counters: Arc<TransferCounters>,
}

impl ContextDialer {
    pub fn new(counters: Arc<TransferCounters>) -> Self {
        Self { counters }
    }

    pub fn counters(&self) -> &Arc<TransferCounters> {
        &self.counters
    }

    /// Connects to `address` over `network` (`tcp`, `tcp4` or `tcp6`).
    ///
    /// Resolved addresses of the requested family are tried in order until
    /// one connects. Fails with [`DialError::Canceled`] or
    /// [`DialError::DeadlineExceeded`] if `context` fires first.
    pub async fn dial_context(
        &self,
        context: &DialContext,
        network: &str,
        address: &str,
    ) -> Result<CountingStream<TcpStream>, DialError> {
        let network = Network::parse(network)?;
        trace!("Dialing {network:?} address: {address}...");
        let result = context.run(connect_any(network, address)).await;
        let stream = match result {
            Ok(stream) => stream,
            Err(error) => {
                error!("Failed to connect to: {address}, error: {error}");
                return Err(error);
            }
        };

        debug!("Connected to: {address}");
        Ok(CountingStream::new(stream, self.counters.clone()))
    }
}

async fn connect_any(network: Network, address: &str) -> Result<TcpStream, DialError> {
    let candidates = lookup_host(address)
        .await?
        .filter(|candidate| network.accepts(candidate))
        .collect::<Vec<_>>();

    let mut last_error = None;
    for candidate in candidates {
        match TcpStream::connect(candidate).await {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                trace!("Failed to connect to: {candidate}, error: {error}");
                last_error = Some(error);
            }
        }
    }

    match last_error {
        Some(error) => Err(DialError::Io(error)),
        None => Err(DialError::NoSuitableAddress(address.to_string())),
    }
}
