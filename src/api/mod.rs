//! JSON payloads exchanged with the ca-server.
//!
//! Provided to aid debugging and for building custom [`Transport`](crate::Transport)s.

use std::fmt;

mod body;
mod response;

pub use self::{body::CaServerBody, response::CaServerResponse};

/// HTTP methods understood by the ca-server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestMethod {
    Get,
    Post,
    Put,
}

impl RestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestMethod::Get => "GET",
            RestMethod::Post => "POST",
            RestMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        match method {
            RestMethod::Get => reqwest::Method::GET,
            RestMethod::Post => reqwest::Method::POST,
            RestMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// Kind of certificate resource addressed on the ca-server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateType {
    /// The CA's own trust anchor. Read only.
    Root,

    /// A certificate issued for a user or installation.
    User,

    /// Any other certificate kept in the certificates collection.
    Other,
}
