use serde::{Deserialize, Serialize};

/// Certificate resource returned by the ca-server.
///
/// Only [`certificate`](Self::certificate) is used by the provisioning workflow.
///
/// # Example JSON
///
/// ```json
/// {
///   "user_id": "peace",
///   "certificate_id": "hella",
///   "csr": "whoa",
///   "certificate": "-----BEGIN CERTIFICATE-----...",
///   "created_at": "2023-01-27T20:12:52.000Z",
///   "updated_at": "2023-01-27T20:12:52.000Z"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaServerResponse {
    #[serde(rename = "user_id")]
    pub user: String,
    pub certificate_id: String,
    pub csr: String,
    pub certificate: String,
    pub created_at: String,
    pub updated_at: String,
}
