//! Byte-counting dialers for load-generating HTTP clients.
//!
//! A client creates one [`TransferCounters`] per run and hands it to the
//! dialer matching its transport. Every connection opened through that dialer
//! adds what it reads and writes to the shared counters.

pub mod context;
pub mod counters;
pub mod error;
pub mod quic;
pub mod tcp;
pub mod tls;

pub use context::DialContext;
pub use counters::{TransferCounters, TransferSnapshot};
pub use error::{DialError, MessageError, TlsConfigError};
pub use quic::config::{QuicConfig, QuicConfigBuilder};
pub use quic::connection::CountingQuicConnection;
pub use quic::dialer::QuicDialer;
pub use tcp::dialer::{ContextDialer, Network, StreamDialer};
pub use tcp::stream::CountingStream;
pub use tls::config::{ClientCertificate, TlsConfig};
pub use tls::options::{TlsOptions, TlsOptionsBuilder};

use std::sync::Arc;

/// Plain TCP dialer bound to `counters`.
pub fn stream_dialer(counters: Arc<TransferCounters>) -> StreamDialer {
    StreamDialer::new(counters)
}

/// Context-aware TCP dialer bound to `counters`.
pub fn context_dialer(counters: Arc<TransferCounters>) -> ContextDialer {
    ContextDialer::new(counters)
}

/// QUIC early-connection dialer bound to `counters`.
pub fn quic_dialer(counters: Arc<TransferCounters>) -> QuicDialer {
    QuicDialer::new(counters)
}
