use std::fmt;
use std::io;
use std::net::TcpStream;
use std::sync::Arc;

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::ring;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme};
use sha1::{Digest, Sha1};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::constants::{HTTPS_PORT, HTTPS_SCHEME};

#[derive(Debug, Error)]
pub enum ThumbprintError {
    #[error("unable to parse OIDC issuer's url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("OIDC issuer's url {0:?} has no usable host")]
    InvalidHost(String),
    #[error("connecting to issuer OIDC ({address})")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("TLS handshake with issuer OIDC ({address})")]
    Handshake {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("building TLS client configuration")]
    Tls(#[from] rustls::Error),
    #[error("unable to get OIDC issuer's certificate")]
    NoCertificates,
    #[error("thumbprint resolution task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// Turns an OIDC issuer URL into the thumbprint IAM expects
#[async_trait]
pub trait ThumbprintResolver: Send + Sync {
    async fn resolve(&self, issuer_url: &str) -> Result<String, ThumbprintError>;
}

/// Resolves thumbprints by dialing the issuer over TLS
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsThumbprintResolver;

#[async_trait]
impl ThumbprintResolver for TlsThumbprintResolver {
    async fn resolve(&self, issuer_url: &str) -> Result<String, ThumbprintError> {
        let endpoint = IssuerEndpoint::parse(issuer_url)?;
        tokio::task::spawn_blocking(move || fetch_root_thumbprint(&endpoint)).await?
    }
}

/// Host and port the issuer is dialed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerEndpoint {
    pub host: String,
    pub port: u16,
}

impl IssuerEndpoint {
    pub fn parse(issuer_url: &str) -> Result<Self, ThumbprintError> {
        let url = Url::parse(issuer_url).map_err(|source| ThumbprintError::InvalidUrl {
            url: issuer_url.to_string(),
            source,
        })?;

        if url.scheme() != HTTPS_SCHEME {
            return Err(ThumbprintError::UnsupportedScheme(url.scheme().to_string()));
        }

        // IPv6 literals come back bracketed
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ThumbprintError::InvalidHost(issuer_url.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(HTTPS_PORT),
        })
    }
}

impl fmt::Display for IssuerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// SHA-1 of a DER certificate, lowercase hex
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha1::digest(der))
}

/// Thumbprint of the last certificate in the presented chain
pub fn root_thumbprint(chain: &[CertificateDer<'_>]) -> Result<String, ThumbprintError> {
    chain
        .last()
        .map(|root| fingerprint(root.as_ref()))
        .ok_or(ThumbprintError::NoCertificates)
}

fn fetch_root_thumbprint(endpoint: &IssuerEndpoint) -> Result<String, ThumbprintError> {
    let address = endpoint.to_string();
    info!("Retrieving OIDC issuer certificate chain from {}", address);

    let server_name = ServerName::try_from(endpoint.host.clone())
        .map_err(|_| ThumbprintError::InvalidHost(endpoint.host.clone()))?;
    let mut conn = ClientConnection::new(client_config()?, server_name)?;

    let mut sock = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).map_err(
        |source| ThumbprintError::Connect {
            address: address.clone(),
            source,
        },
    )?;

    while conn.is_handshaking() {
        conn.complete_io(&mut sock)
            .map_err(|source| ThumbprintError::Handshake {
                address: address.clone(),
                source,
            })?;
    }

    let chain = conn.peer_certificates().unwrap_or_default();
    debug!("Issuer presented {} certificate(s)", chain.len());
    let thumbprint = root_thumbprint(chain)?;

    conn.send_close_notify();
    // Best effort: the thumbprint is already in hand
    conn.complete_io(&mut sock).ok();

    info!("Resolved OIDC issuer thumbprint: {}", thumbprint);
    Ok(thumbprint)
}

/// TLS client that completes the handshake against any certificate
fn client_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let provider = Arc::new(ring::default_provider());
    let verifier = AcceptAnyCertificate {
        schemes: provider
            .signature_verification_algorithms
            .supported_schemes(),
    };

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();

    Ok(Arc::new(config))
}

/// Only the chain's bytes matter here, never its trust
#[derive(Debug)]
struct AcceptAnyCertificate {
    schemes: Vec<SignatureScheme>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}
