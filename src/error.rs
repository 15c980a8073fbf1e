use std::fmt;

use reqwest::StatusCode;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the CA client and the provisioning workflow.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// One or more inputs needed to talk to the CA were absent.
    #[error("missing {}. object: {object}", MissingFields(.fields))]
    MissingField {
        fields: Vec<MissingField>,
        object: String,
    },

    /// The requested method is not supported for the resource.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// The CA answered with a status outside of `200..=299`.
    #[error("{operation} failed with status {}; response from CA: {response}", .status.as_u16())]
    Transport {
        status: StatusCode,
        url: String,
        operation: Operation,
        response: String,
    },

    /// The response body was neither a certificate envelope nor a JSON string.
    #[error("could not decode response from {url}: {source}; body: {body}")]
    Decoding {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The entity already holds both certificates.
    #[error("duplicate request: {message}")]
    DuplicateRequest { message: String },

    /// A configured URL could not be turned into an absolute URL.
    #[error("could not create a url for {url}: {reason}")]
    Configuration { url: String, reason: String },

    /// A request body could not be serialized.
    #[error("could not encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl Error {
    /// HTTP status of a [`Error::Transport`] failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, Error::MissingField { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

/// Input required by the workflow before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    AccountId,
    CertificateId,
    Csr,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingField::AccountId => "account id",
            MissingField::CertificateId => "certificate id",
            MissingField::Csr => "csr",
        })
    }
}

struct MissingFields<'a>(&'a [MissingField]);

impl fmt::Display for MissingFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Logical CA call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchRootCertificate,
    FetchCertificate,
    CreateCertificate,
    UpdateCertificate,
    VerifyAccount,
    CreateAccount,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::FetchRootCertificate => "fetching root certificate",
            Operation::FetchCertificate => "fetching certificate",
            Operation::CreateCertificate => "creating certificate",
            Operation::UpdateCertificate => "updating certificate",
            Operation::VerifyAccount => "verifying account",
            Operation::CreateAccount => "creating account",
        })
    }
}
