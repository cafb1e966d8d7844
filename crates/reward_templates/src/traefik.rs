//! Reverse-proxy dynamic TLS configuration.
//!
//! This document is not template driven: it lists one certificate entry per
//! `*.crt.pem` file found in the application's certificate directory, plus
//! the default certificate of the service domain.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::TemplateResult;

/// Directory the certificate directory is mounted at inside the proxy.
pub const CERTS_MOUNT: &str = "/etc/ssl/certs";

const CERT_SUFFIX: &str = ".crt.pem";
const KEY_SUFFIX: &str = ".key.pem";

/// A certificate/key file pair as seen from inside the proxy container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRef {
    pub cert_file: String,
    pub key_file: String,
}

impl CertificateRef {
    /// Files `<name>.crt.pem` / `<name>.key.pem` under [`CERTS_MOUNT`].
    pub fn for_name(name: &str) -> Self {
        Self {
            cert_file: format!("{}/{}{}", CERTS_MOUNT, name, CERT_SUFFIX),
            key_file: format!("{}/{}{}", CERTS_MOUNT, name, KEY_SUFFIX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsStore {
    pub default_certificate: CertificateRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsStores {
    pub default: TlsStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub stores: TlsStores,
    pub certificates: Vec<CertificateRef>,
}

/// Root of the dynamic configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicConfig {
    pub tls: TlsConfig,
}

impl DynamicConfig {
    /// Configuration with `service_domain` as default certificate and one
    /// entry per certificate name, in the given order.
    pub fn new<I, S>(service_domain: &str, certificate_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tls: TlsConfig {
                stores: TlsStores {
                    default: TlsStore {
                        default_certificate: CertificateRef::for_name(service_domain),
                    },
                },
                certificates: certificate_names
                    .into_iter()
                    .map(|name| CertificateRef::for_name(name.as_ref()))
                    .collect(),
            },
        }
    }

    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Certificate names (file name minus `.crt.pem`) in `certs_dir`, sorted.
///
/// A missing directory yields no names.
pub fn discover_certificates(certs_dir: &Path) -> TemplateResult<Vec<String>> {
    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&certs_dir.to_string_lossy()),
        CERT_SUFFIX
    );

    let mut names: Vec<String> = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| {
            let file_name = path.file_name()?.to_string_lossy().into_owned();
            let name = file_name.strip_suffix(CERT_SUFFIX)?.to_string();
            trace!("Certificate file name: {}", file_name);
            Some(name)
        })
        .collect();
    names.sort();

    debug!("Available certificates: {:?}", names);
    Ok(names)
}
