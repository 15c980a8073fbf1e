use serde::{Deserialize, Serialize};

/// Request body sent to the certificates and users collections.
///
/// When only creating a user account, `certificate_id` and `csr` are left out.
///
/// # Example JSON
///
/// ```json
/// {
///   "user": "peace",
///   "certificateId": "hella",
///   "csr": "-----BEGIN CERTIFICATE REQUEST-----..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaServerBody {
    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
}

impl CaServerBody {
    /// Body for creating a user account.
    pub fn user(user: &str) -> Self {
        Self {
            user: user.to_owned(),
            certificate_id: None,
            csr: None,
        }
    }

    /// Body for creating a certificate from a CSR.
    pub fn certificate(user: &str, certificate_id: &str, csr: &str) -> Self {
        Self {
            user: user.to_owned(),
            certificate_id: Some(certificate_id.to_owned()),
            csr: Some(csr.to_owned()),
        }
    }
}
