use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, ring};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No certificates found in {0}")]
    NoCertificates(PathBuf),
    #[error("No private key found in {0}")]
    NoPrivateKey(PathBuf),
    #[error("Invalid server name '{0}'")]
    InvalidServerName(String),
    #[error("Failed to build certificate verifier: {0}")]
    Verifier(#[from] rustls::client::VerifierBuilderError),
    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] rustls::Error),
}

/// How the client authenticates the collector and itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Accept any server certificate and present none.
    SkipVerify,
    /// Verify the server and present a client certificate.
    Verify {
        cert_file: PathBuf,
        key_file: PathBuf,
        /// Name the server certificate must be valid for, in place of the URL host
        server_name: Option<String>,
    },
}

pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Builds a client-certificate TLS configuration owned by a single client.
///
/// Server certificates are checked against the webpki root store. When
/// `server_name` is set the certificate must be valid for that name instead
/// of the host in the collector URL.
pub fn client_config(
    cert_file: &Path,
    key_file: &Path,
    server_name: Option<&str>,
) -> Result<ClientConfig, TlsError> {
    let certs = load_certificates(cert_file)?;
    let key = load_private_key(key_file)?;

    let provider = Arc::new(ring::default_provider());
    let verifier = server_verifier(provider.clone(), server_name)?;

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_client_auth_cert(certs, key)?;

    Ok(config)
}

/// Trust anchors for the collector: the platform trust store plus the bundled
/// webpki roots.
pub fn root_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();

    let native = rustls_native_certs::load_native_certs();
    for error in &native.errors {
        warn!(error = %error, "Failed to load some platform root certificates");
    }
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    debug!(added, ignored, "Loaded platform root certificates");

    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

fn server_verifier(
    provider: Arc<CryptoProvider>,
    server_name: Option<&str>,
) -> Result<Arc<dyn ServerCertVerifier>, TlsError> {
    let webpki =
        WebPkiServerVerifier::builder_with_provider(Arc::new(root_store()), provider).build()?;

    match server_name.filter(|name| !name.is_empty()) {
        Some(name) => {
            let expected = ServerName::try_from(name.to_string())
                .map_err(|_| TlsError::InvalidServerName(name.to_string()))?;
            Ok(Arc::new(ExpectedServerName {
                inner: webpki,
                server_name: expected,
            }))
        }
        None => Ok(webpki),
    }
}

/// Runs standard webpki verification against a fixed name.
#[derive(Debug)]
struct ExpectedServerName {
    inner: Arc<WebPkiServerVerifier>,
    server_name: ServerName<'static>,
}

impl ServerCertVerifier for ExpectedServerName {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.inner.verify_server_cert(
            end_entity,
            intermediates,
            &self.server_name,
            ocsp_response,
            now,
        )
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
