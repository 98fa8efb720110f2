use crate::context::DialContext;
use crate::counters::TransferCounters;
use crate::error::DialError;
use crate::quic::config::QuicConfig;
use crate::quic::connection::CountingQuicConnection;
use crate::tls::config::TlsConfig;
use quinn::crypto::rustls::QuicClientConfig as QuinnQuicClientConfig;
use quinn::{ClientConfig, Connection, Endpoint};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::lookup_host;
use tracing::{debug, error, trace};

/// Dials QUIC connections whose datagram traffic is counted.
#[derive(Debug, Clone)]
pub struct QuicDialer {
    counters: Arc<TransferCounters>,
}

impl QuicDialer {
    pub fn new(counters: Arc<TransferCounters>) -> Self {
        Self { counters }
    }

    pub fn counters(&self) -> &Arc<TransferCounters> {
        &self.counters
    }

    /// Opens a QUIC connection to `address` (`host:port`), sending 0-RTT
    /// data when a resumable session for the server exists and waiting for
    /// the full handshake otherwise.
    ///
    /// `_network` is part of the signature HTTP/3 transports expect and is
    /// ignored: the address family comes from resolving `address`.
    pub async fn dial_early(
        &self,
        context: &DialContext,
        _network: &str,
        address: &str,
        tls_config: &TlsConfig,
        quic_config: &QuicConfig,
    ) -> Result<CountingQuicConnection, DialError> {
        trace!("Dialing QUIC address: {address}...");
        let result = context
            .run(connect_early(address, tls_config, quic_config))
            .await;
        let (connection, endpoint) = match result {
            Ok(connected) => connected,
            Err(error) => {
                error!("Failed to connect to: {address}, error: {error}");
                return Err(error);
            }
        };

        debug!(
            "Connected to: {address} ({})",
            connection.remote_address()
        );
        Ok(CountingQuicConnection::new(
            connection,
            endpoint,
            self.counters.clone(),
        ))
    }
}

async fn connect_early(
    address: &str,
    tls_config: &TlsConfig,
    quic_config: &QuicConfig,
) -> Result<(Connection, Endpoint), DialError> {
    let server_address = lookup_host(address)
        .await?
        .next()
        .ok_or_else(|| DialError::NoSuitableAddress(address.to_string()))?;
    let server_name = match quic_config.server_name.is_empty() {
        true => host_of(address)?.to_string(),
        false => quic_config.server_name.clone(),
    };

    let client_config = configure(tls_config, quic_config)?;
    let client_address = bind_address(&quic_config.client_address, &server_address)?;
    let endpoint = Endpoint::client(client_address)?;
    let connecting = endpoint.connect_with(client_config, server_address, &server_name)?;
    let connection = match connecting.into_0rtt() {
        Ok((connection, _)) => {
            trace!("Using 0-RTT connection to: {server_address}");
            connection
        }
        Err(connecting) => connecting.await?,
    };
    Ok((connection, endpoint))
}

fn configure(tls_config: &TlsConfig, quic_config: &QuicConfig) -> Result<ClientConfig, DialError> {
    let crypto = tls_config.client_config(&quic_config.alpn())?;
    let crypto = QuinnQuicClientConfig::try_from(crypto).map_err(|error| {
        error!("Failed to create QUIC client configuration: {error}");
        DialError::InvalidConfiguration(error.to_string())
    })?;

    let mut client_config = ClientConfig::new(Arc::new(crypto));
    client_config.transport_config(Arc::new(quic_config.transport_config()?));
    Ok(client_config)
}

fn bind_address(client_address: &str, server_address: &SocketAddr) -> Result<SocketAddr, DialError> {
    if !client_address.is_empty() {
        return client_address
            .parse()
            .map_err(|_| DialError::InvalidAddress(client_address.to_string()));
    }

    Ok(match server_address {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    })
}

/// Host part of `host:port`, without IPv6 brackets.
fn host_of(address: &str) -> Result<&str, DialError> {
    let (host, _) = address
        .rsplit_once(':')
        .ok_or_else(|| DialError::InvalidAddress(address.to_string()))?;
    let host = host
        .strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(DialError::InvalidAddress(address.to_string()));
    }
    Ok(host)
}
