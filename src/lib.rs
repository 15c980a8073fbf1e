//! Provisioning certificates for users and installations from a [ca-server].
//!
//! The ca-server signs CSRs and keeps the issued certificates, the accounts they belong to and its
//! own root certificate. This crate decides what to ask it for: it makes sure the account exists,
//! fetches or creates the certificate and fetches the root certificate. No cryptography happens
//! here; certificates and CSRs are opaque strings.
//!
//! # Usage
//!
//! 1. Build a [`Configuration`] from the ca-server URL and the credential to send.
//! 2. Create a [`CaClient`] from it.
//! 3. Implement [`Certificatable`] for the record that holds the certificate.
//! 4. Call [`CaClient::get_certificates`] (get or create) or
//!    [`CaClient::request_new_certificates`] (always issue a new one, e.g. after expiry).
//!
//! The returned [`Certificates`] are not written back into the record; store them yourself.
//!
//! ```no_run
//! # use ca_provision::{CaClient, Certificatable, Configuration};
//! # #[derive(Debug)]
//! # struct Installation;
//! # impl Certificatable for Installation {
//! #     fn certificate_id(&self) -> Option<&str> { Some("hella") }
//! #     fn csr(&self) -> Option<&str> { Some("whoa") }
//! #     fn certificate(&self) -> Option<&str> { None }
//! #     fn root_certificate(&self) -> Option<&str> { None }
//! # }
//! # async fn run() -> ca_provision::Result<()> {
//! let config = Configuration::builder("https://ca.example.com")
//!     .basic_auth("user", "password")
//!     .build()?;
//! let client = CaClient::new(config)?;
//!
//! let certs = client
//!     .get_certificates(Some("user-id"), &Installation)
//!     .await?;
//!
//! println!("{}", certs.certificate);
//! # Ok(())
//! # }
//! ```
//!
//! # Root Certificate
//!
//! Failing to fetch the root certificate never fails a workflow call. The root certificate is
//! then `None` and a previously obtained one can be kept.
//!
//! # Retries
//!
//! Nothing is retried. Each failed request is reported once and the caller decides whether to
//! run the whole call again.
//!
//! [ca-server]: https://github.com/netreconlab/ca-server

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod client;
mod config;
mod entity;
mod error;
mod provision;
mod req;
mod trans;

pub mod api;

#[cfg(test)]
mod test;

pub use crate::{
    client::CaClient,
    config::{
        Configuration, ConfigurationBuilder, DEFAULT_CERTIFICATES_PATH,
        DEFAULT_ROOT_CERTIFICATE_PATH, DEFAULT_USERS_PATH,
    },
    entity::{Certificatable, Certificates},
    error::{Error, MissingField, Operation, Result},
    provision::{GetCertificatesOptions, OnExisting},
    trans::{CaRequest, CaResponse, HttpTransport, Transport},
};
