use crate::error::TlsConfigError;
use crate::tls::options::TlsOptions;
use crate::tls::verifier::SkipServerVerification;
use rustls::client::Resumption;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};
use std::fs;
use std::sync::Arc;
use tracing::{debug, error};

/// Client certificate chain with its private key.
#[derive(Debug)]
pub struct ClientCertificate {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl Clone for ClientCertificate {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl ClientCertificate {
    /// Loads a PEM certificate chain and a PEM private key (PKCS#8, PKCS#1
    /// or SEC1) from disk.
    pub fn load(cert_path: &str, key_path: &str) -> Result<Self, TlsConfigError> {
        let cert_pem = read_file(cert_path)?;
        let chain = rustls_pemfile::certs(&mut cert_pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TlsConfigError::InvalidCertificate {
                path: cert_path.to_string(),
                source,
            })?;
        if chain.is_empty() {
            return Err(TlsConfigError::MissingCertificate(cert_path.to_string()));
        }

        let key_pem = read_file(key_path)?;
        let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
            .map_err(|source| TlsConfigError::InvalidPrivateKey {
                path: key_path.to_string(),
                source,
            })?
            .ok_or_else(|| TlsConfigError::MissingPrivateKey(key_path.to_string()))?;

        Ok(Self { chain, key })
    }

    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    pub fn key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, TlsConfigError> {
    fs::read(path).map_err(|source| TlsConfigError::CannotReadFile {
        path: path.to_string(),
        source,
    })
}

/// TLS settings shared by every connection of a client.
///
/// Holds at most one client certificate. Rustls configurations derived from
/// it share one session store, so later QUIC dials can resume and send early
/// data.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    certificate: Option<ClientCertificate>,
    insecure_skip_verify: bool,
    resumption: Resumption,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            certificate: None,
            insecure_skip_verify: false,
            resumption: Resumption::default(),
        }
    }
}

impl TlsConfig {
    /// Builds the configuration, loading a client certificate when both
    /// paths are set. Setting only one of them is an error.
    pub fn build(cert_path: &str, key_path: &str, insecure: bool) -> Result<Self, TlsConfigError> {
        let certificate = match (cert_path.is_empty(), key_path.is_empty()) {
            (true, true) => None,
            (false, false) => Some(ClientCertificate::load(cert_path, key_path)?),
            _ => {
                error!("Client certificate requires both certificate and key paths.");
                return Err(TlsConfigError::IncompleteKeyPair {
                    cert_path: cert_path.to_string(),
                    key_path: key_path.to_string(),
                });
            }
        };

        let config = Self {
            certificate,
            insecure_skip_verify: insecure,
            resumption: Resumption::default(),
        };

        if config.certificate.is_some() {
            // Rustls rejects unusable or mismatched keys here rather than on
            // the first handshake.
            config.client_config(&[])?;
        }

        debug!(
            "Built TLS configuration, client certificate: {}, insecure: {}",
            config.certificate.is_some(),
            insecure
        );
        Ok(config)
    }

    pub fn from_options(options: &TlsOptions) -> Result<Self, TlsConfigError> {
        Self::build(&options.cert_path, &options.key_path, options.insecure)
    }

    /// Zero or one client certificates.
    pub fn certificates(&self) -> &[ClientCertificate] {
        self.certificate.as_slice()
    }

    pub fn insecure_skip_verify(&self) -> bool {
        self.insecure_skip_verify
    }

    /// Derives a rustls client configuration advertising `alpn_protocols`.
    pub fn client_config(&self, alpn_protocols: &[Vec<u8>]) -> Result<ClientConfig, TlsConfigError> {
        let provider = crypto_provider();
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(TlsConfigError::InvalidConfiguration)?;

        let builder = if self.insecure_skip_verify {
            builder
                .dangerous()
                .with_custom_certificate_verifier(SkipServerVerification::new(provider))
        } else {
            let roots = RootCertStore {
                roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            };
            builder.with_root_certificates(roots)
        };

        let mut config = match &self.certificate {
            Some(certificate) => builder
                .with_client_auth_cert(certificate.chain.clone(), certificate.key.clone_key())
                .map_err(TlsConfigError::KeyPairRejected)?,
            None => builder.with_no_client_auth(),
        };
        config.alpn_protocols = alpn_protocols.to_vec();
        config.enable_early_data = true;
        config.resumption = self.resumption.clone();
        Ok(config)
    }
}

/// The process default provider, or ring when the host has not installed one.
/// The process default is never changed.
fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider()))
}
