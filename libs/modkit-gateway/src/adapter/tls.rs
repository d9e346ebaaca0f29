//! Connector construction for the `verify` option

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};

use crate::config::TlsVerification;
use crate::error::AdapterError;

/// Use the process-wide provider if one is installed, aws-lc-rs otherwise
fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// HTTP/HTTPS connector for one `(verify, connect_timeout)` combination
pub fn build_https_connector(
    verification: &TlsVerification,
    connect_timeout: Option<Duration>,
) -> Result<HttpsConnector<HttpConnector>, AdapterError> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(connect_timeout);

    let provider = crypto_provider();
    let builder = match verification {
        TlsVerification::Enabled => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider)
            .map_err(|e| AdapterError::Tls(Box::new(e)))?,
        TlsVerification::Disabled => {
            tracing::warn!("TLS certificate verification is disabled for this adapter");
            HttpsConnectorBuilder::new().with_tls_config(insecure_client_config(provider)?)
        }
        TlsVerification::CaBundle(path) => {
            HttpsConnectorBuilder::new().with_tls_config(ca_bundle_client_config(path, provider)?)
        }
    };

    Ok(builder
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(http))
}

fn ca_bundle_client_config(
    path: &Path,
    provider: Arc<CryptoProvider>,
) -> Result<ClientConfig, AdapterError> {
    let certs = CertificateDer::pem_file_iter(path)
        .and_then(Iterator::collect::<Result<Vec<_>, _>>)
        .map_err(|e| {
            AdapterError::Tls(format!("failed to read CA bundle {}: {e}", path.display()).into())
        })?;

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if ignored > 0 {
        tracing::warn!(
            added,
            ignored,
            bundle = %path.display(),
            "some CA bundle certificates could not be parsed"
        );
    }
    if added == 0 {
        return Err(AdapterError::Tls(
            format!("no valid CA certificates in bundle {}", path.display()).into(),
        ));
    }

    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| AdapterError::Tls(Box::new(e)))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

fn insecure_client_config(provider: Arc<CryptoProvider>) -> Result<ClientConfig, AdapterError> {
    let verifier = Arc::new(AcceptAnyServerCert {
        provider: Arc::clone(&provider),
    });
    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| AdapterError::Tls(Box::new(e)))?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth())
}

/// Accepts any certificate; handshake signatures are still checked
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
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
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
