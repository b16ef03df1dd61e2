//! Certificate source
//!
//! Where the HTTPS listener's certificate comes from. `None` carries the reason
//! HTTPS is off so the deployment summary can report it.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum CertificateSource {
    /// HTTP-only deployment
    None { reason: String },
    /// A previously issued certificate, referenced by an external identifier
    Imported { reference: String },
    /// A new certificate validated by DNS ownership proof
    Issued {
        domain: String,
        alternative_names: Vec<String>,
        hosted_zone: Option<String>,
    },
    /// Review deployment served by the base environment's HTTPS listener
    Inherited { base_environment: String },
}

impl CertificateSource {
    pub fn is_https(&self) -> bool {
        !matches!(self, CertificateSource::None { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            CertificateSource::None { .. } => "none",
            CertificateSource::Imported { .. } => "imported",
            CertificateSource::Issued { .. } => "issued",
            CertificateSource::Inherited { .. } => "inherited",
        }
    }
}
