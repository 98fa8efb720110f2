use serde::{Deserialize, Serialize};

/// TLS settings supplied by the host's configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsOptions {
    /// Path to a PEM encoded client certificate chain. Empty for none.
    pub cert_path: String,
    /// Path to the PEM encoded private key matching `cert_path`. Empty for none.
    pub key_path: String,
    /// Skip verification of the server certificate chain.
    pub insecure: bool,
}

impl TlsOptions {
    pub fn has_client_certificate(&self) -> bool {
        !self.cert_path.is_empty() && !self.key_path.is_empty()
    }
}

/// Builder for [`TlsOptions`]. Defaults:
/// - `cert_path`: empty
/// - `key_path`: empty
/// - `insecure`: false
#[derive(Debug, Default)]
pub struct TlsOptionsBuilder {
    options: TlsOptions,
}

impl TlsOptionsBuilder {
    pub fn new() -> Self {
        TlsOptionsBuilder::default()
    }

    /// Sets both the certificate and the private key paths.
    pub fn with_client_certificate(mut self, cert_path: &str, key_path: &str) -> Self {
        self.options.cert_path = cert_path.to_string();
        self.options.key_path = key_path.to_string();
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.options.insecure = insecure;
        self
    }

    pub fn build(self) -> TlsOptions {
        self.options
    }
}
