use crate::error::DialError;
use quinn::{IdleTimeout, TransportConfig, VarInt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

/// Configuration for QUIC dials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QuicConfig {
    /// The local address to bind the UDP socket to. The unspecified address
    /// of the server's family is used when empty.
    pub client_address: String,
    /// The TLS server name. The host part of the dialed address is used when empty.
    pub server_name: String,
    /// The ALPN protocols to offer.
    pub alpn_protocols: Vec<String>,
    /// The maximum number of concurrent bidirectional streams.
    pub max_concurrent_bidi_streams: u64,
    /// The size of the datagram send buffer.
    pub datagram_send_buffer_size: u64,
    /// The size of the datagram receive buffer, 0 disables datagrams.
    pub datagram_receive_buffer_size: u64,
    /// The initial MTU.
    pub initial_mtu: u16,
    /// The send window.
    pub send_window: u64,
    /// The receive window.
    pub receive_window: u64,
    /// The keep alive interval in milliseconds, 0 disables keep alive.
    pub keep_alive_interval: u64,
    /// The maximum idle timeout in milliseconds, 0 disables the timeout.
    pub max_idle_timeout: u64,
}

impl Default for QuicConfig {
    fn default() -> QuicConfig {
        QuicConfig {
            client_address: String::new(),
            server_name: String::new(),
            alpn_protocols: vec!["h3".to_string()],
            max_concurrent_bidi_streams: 100,
            datagram_send_buffer_size: 1024 * 1024,
            datagram_receive_buffer_size: 1024 * 1024,
            initial_mtu: 1200,
            send_window: 8 * 1024 * 1024,
            receive_window: 8 * 1024 * 1024,
            keep_alive_interval: 0,
            max_idle_timeout: 30_000,
        }
    }
}

impl QuicConfig {
    pub(crate) fn alpn(&self) -> Vec<Vec<u8>> {
        self.alpn_protocols
            .iter()
            .map(|protocol| protocol.as_bytes().to_vec())
            .collect()
    }

    /// Converts the settings into a quinn transport configuration, checking
    /// that every value is within the range QUIC allows.
    pub fn transport_config(&self) -> Result<TransportConfig, DialError> {
        let max_concurrent_bidi_streams = VarInt::from_u64(self.max_concurrent_bidi_streams)
            .map_err(|_| {
                error!(
                    "Invalid 'max_concurrent_bidi_streams': {}",
                    self.max_concurrent_bidi_streams
                );
                DialError::InvalidConfiguration("max_concurrent_bidi_streams".to_string())
            })?;

        let receive_window = VarInt::from_u64(self.receive_window).map_err(|_| {
            error!("Invalid 'receive_window': {}", self.receive_window);
            DialError::InvalidConfiguration("receive_window".to_string())
        })?;

        let mut transport = TransportConfig::default();
        transport.initial_mtu(self.initial_mtu);
        transport.send_window(self.send_window);
        transport.receive_window(receive_window);
        transport.datagram_send_buffer_size(self.datagram_send_buffer_size as usize);
        transport.datagram_receive_buffer_size(match self.datagram_receive_buffer_size {
            0 => None,
            size => Some(size as usize),
        });
        transport.max_concurrent_bidi_streams(max_concurrent_bidi_streams);
        if self.keep_alive_interval > 0 {
            transport.keep_alive_interval(Some(Duration::from_millis(self.keep_alive_interval)));
        }
        if self.max_idle_timeout > 0 {
            let max_idle_timeout = IdleTimeout::try_from(Duration::from_millis(self.max_idle_timeout))
                .map_err(|_| {
                    error!("Invalid 'max_idle_timeout': {}", self.max_idle_timeout);
                    DialError::InvalidConfiguration("max_idle_timeout".to_string())
                })?;
            transport.max_idle_timeout(Some(max_idle_timeout));
        } else {
            transport.max_idle_timeout(None);
        }

        Ok(transport)
    }
}

/// Builder for the QUIC configuration.
/// Allows configuring QUIC dials with custom settings or using defaults:
/// - `client_address`: Default is empty (unspecified address).
/// - `server_name`: Default is empty (host of the dialed address).
/// - `alpn_protocols`: Default is ["h3"].
/// - `max_concurrent_bidi_streams`: Default is 100.
/// - `datagram_send_buffer_size`: Default is 1 MiB.
/// - `datagram_receive_buffer_size`: Default is 1 MiB.
/// - `initial_mtu`: Default is 1200.
/// - `send_window`: Default is 8 MiB.
/// - `receive_window`: Default is 8 MiB.
/// - `keep_alive_interval`: Default is 0 (disabled).
/// - `max_idle_timeout`: Default is 30000 ms.
#[derive(Debug, Default)]
pub struct QuicConfigBuilder {
    config: QuicConfig,
}

impl QuicConfigBuilder {
    pub fn new() -> Self {
        QuicConfigBuilder::default()
    }

    /// Sets the local address to bind to.
    pub fn with_client_address(mut self, client_address: String) -> Self {
        self.config.client_address = client_address;
        self
    }

    /// Sets the TLS server name.
    pub fn with_server_name(mut self, server_name: String) -> Self {
        self.config.server_name = server_name;
        self
    }

    /// Sets the ALPN protocols to offer.
    pub fn with_alpn_protocols(mut self, alpn_protocols: Vec<String>) -> Self {
        self.config.alpn_protocols = alpn_protocols;
        self
    }

    /// Sets the maximum number of concurrent bidirectional streams.
    pub fn with_max_concurrent_bidi_streams(mut self, max_concurrent_bidi_streams: u64) -> Self {
        self.config.max_concurrent_bidi_streams = max_concurrent_bidi_streams;
        self
    }

    /// Sets the size of the datagram send buffer.
    pub fn with_datagram_send_buffer_size(mut self, datagram_send_buffer_size: u64) -> Self {
        self.config.datagram_send_buffer_size = datagram_send_buffer_size;
        self
    }

    /// Sets the size of the datagram receive buffer.
    pub fn with_datagram_receive_buffer_size(mut self, datagram_receive_buffer_size: u64) -> Self {
        self.config.datagram_receive_buffer_size = datagram_receive_buffer_size;
        self
    }

    /// Sets the initial MTU.
    pub fn with_initial_mtu(mut self, initial_mtu: u16) -> Self {
        self.config.initial_mtu = initial_mtu;
        self
    }

    /// Sets the send window.
    pub fn with_send_window(mut self, send_window: u64) -> Self {
        self.config.send_window = send_window;
        self
    }

    /// Sets the receive window.
    pub fn with_receive_window(mut self, receive_window: u64) -> Self {
        self.config.receive_window = receive_window;
        self
    }

    /// Sets the keep alive interval in milliseconds.
    pub fn with_keep_alive_interval(mut self, keep_alive_interval: u64) -> Self {
        self.config.keep_alive_interval = keep_alive_interval;
        self
    }

    /// Sets the maximum idle timeout in milliseconds.
    pub fn with_max_idle_timeout(mut self, max_idle_timeout: u64) -> Self {
        self.config.max_idle_timeout = max_idle_timeout;
        self
    }

    /// Builds the QUIC configuration.
    pub fn build(self) -> QuicConfig {
        self.config
    }
}
