use quinn::{ConnectError, ConnectionError, SendDatagramError};
use std::io;
use thiserror::Error;

/// Failure to turn certificate and key files into a TLS configuration.
#[derive(Debug, Error)]
pub enum TlsConfigError {
    #[error("Both certificate and key paths must be set, got certificate: '{cert_path}', key: '{key_path}'")]
    IncompleteKeyPair { cert_path: String, key_path: String },
    #[error("Cannot read file: {path}")]
    CannotReadFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid certificate in: {path}")]
    InvalidCertificate {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("No certificate found in: {0}")]
    MissingCertificate(String),
    #[error("Invalid private key in: {path}")]
    InvalidPrivateKey {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("No private key found in: {0}")]
    MissingPrivateKey(String),
    #[error("Key pair rejected")]
    KeyPairRejected(#[source] rustls::Error),
    #[error("Invalid TLS configuration")]
    InvalidConfiguration(#[source] rustls::Error),
}

/// Failure to establish a connection.
///
/// Errors coming from the underlying transport are carried as they are.
#[derive(Debug, Error)]
pub enum DialError {
    #[error("IO error")]
    Io(#[from] io::Error),
    #[error("Context canceled")]
    Canceled,
    #[error("Context deadline exceeded")]
    DeadlineExceeded,
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("No suitable address found for: {0}")]
    NoSuitableAddress(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("TLS configuration error")]
    Tls(#[from] TlsConfigError),
    #[error("QUIC connect error")]
    QuicConnect(#[from] ConnectError),
    #[error("QUIC connection error")]
    QuicConnection(#[from] ConnectionError),
}

impl DialError {
    /// Whether the dial stopped because its context fired.
    pub fn is_context_error(&self) -> bool {
        matches!(self, DialError::Canceled | DialError::DeadlineExceeded)
    }
}

/// Failure of a QUIC datagram (message) operation.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Send datagram error")]
    Send(#[from] SendDatagramError),
    #[error("Receive datagram error")]
    Receive(#[from] ConnectionError),
}
