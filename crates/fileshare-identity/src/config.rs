//! Identity bootstrap configuration.

use std::{path::PathBuf, time::Duration};

/// Private key file name inside the certificates directory.
pub const KEY_FILE_NAME: &str = "rsa.key";

/// Certificate file name inside the certificates directory.
pub const CERT_FILE_NAME: &str = "rsa.crt";

/// Fixed distinguished-name fields of the installation certificate.
///
/// The common name is always the installation's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFields {
    /// C
    pub country: String,
    /// ST
    pub state: String,
    /// L
    pub locality: String,
    /// O
    pub organization: String,
    /// OU
    pub organizational_unit: String,
}

impl Default for SubjectFields {
    fn default() -> Self {
        Self {
            country: "CZ".to_string(),
            state: "JMK".to_string(),
            locality: "Brno".to_string(),
            organization: "VUT".to_string(),
            organizational_unit: "FEKT".to_string(),
        }
    }
}

impl SubjectFields {
    /// `-subj` argument for `openssl req`, with `common_name` escaped.
    pub fn openssl_subject(&self, common_name: &str) -> String {
        format!(
            "/C={}/ST={}/L={}/O={}/OU={}/CN={}",
            escape_rdn(&self.country),
            escape_rdn(&self.state),
            escape_rdn(&self.locality),
            escape_rdn(&self.organization),
            escape_rdn(&self.organizational_unit),
            escape_rdn(common_name),
        )
    }
}

/// Escape separators so a value cannot introduce extra subject fields.
///
/// `openssl -subj` splits RDNs on `/` and multi-valued RDNs on `+`.
fn escape_rdn(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '/' | '+' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Parameters for generating the installation identity.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Path or name of the `openssl` binary
    pub openssl: PathBuf,
    /// RSA modulus size
    pub key_bits: u32,
    /// Certificate validity
    pub validity_days: u32,
    /// Fixed subject fields
    pub subject: SubjectFields,
    /// Limit for one run of the external tool
    pub tool_timeout: Duration,
    /// How long to wait for a concurrent bootstrap of the same directory
    pub lock_timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            openssl: PathBuf::from("openssl"),
            key_bits: 4096,
            validity_days: 3650,
            subject: SubjectFields::default(),
            tool_timeout: Duration::from_secs(120),
            lock_timeout: Duration::from_secs(300),
        }
    }
}
