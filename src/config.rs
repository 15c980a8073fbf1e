use std::fmt;

use base64::prelude::*;
use reqwest::{header::HeaderValue, Url};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Default ca-server path for the root certificate.
pub const DEFAULT_ROOT_CERTIFICATE_PATH: &str = "/ca_certificate";

/// Default ca-server path for the certificates collection.
pub const DEFAULT_CERTIFICATES_PATH: &str = "/certificates/";

/// Default ca-server path for the users collection.
pub const DEFAULT_USERS_PATH: &str = "/appusers/";

/// Endpoints and credential used to reach a ca-server.
///
/// The three URLs are derived once from a base URL and a path suffix each. A configuration is
/// immutable; to point a client somewhere else, build a new configuration and a new client.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    root_certificate_url: Url,
    certificates_url: Url,
    users_url: Url,
    authorization: Zeroizing<String>,
}

impl Configuration {
    /// Creates a configuration using the default paths.
    ///
    /// `authorization` is sent verbatim as the `Authorization` header of every request.
    pub fn new(ca_url: &str, authorization: impl Into<String>) -> Result<Self> {
        Self::builder(ca_url).authorization(authorization).build()
    }

    /// Starts building a configuration for the ca-server at `ca_url`.
    pub fn builder(ca_url: &str) -> ConfigurationBuilder {
        ConfigurationBuilder::new(ca_url)
    }

    /// Full URL of the root certificate.
    pub fn root_certificate_url(&self) -> &Url {
        &self.root_certificate_url
    }

    /// Full URL of the certificates collection.
    pub fn certificates_url(&self) -> &Url {
        &self.certificates_url
    }

    /// Full URL of the users collection.
    pub fn users_url(&self) -> &Url {
        &self.users_url
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("root_certificate_url", &self.root_certificate_url.as_str())
            .field("certificates_url", &self.certificates_url.as_str())
            .field("users_url", &self.users_url.as_str())
            .field("authorization", &"<redacted>")
            .finish()
    }
}

/// Builder for [`Configuration`].
#[derive(Clone)]
pub struct ConfigurationBuilder {
    ca_url: String,
    root_certificate_path: String,
    certificates_path: String,
    users_path: String,
    authorization: Zeroizing<String>,
}

impl ConfigurationBuilder {
    fn new(ca_url: &str) -> Self {
        ConfigurationBuilder {
            ca_url: ca_url.to_owned(),
            root_certificate_path: DEFAULT_ROOT_CERTIFICATE_PATH.to_owned(),
            certificates_path: DEFAULT_CERTIFICATES_PATH.to_owned(),
            users_path: DEFAULT_USERS_PATH.to_owned(),
            authorization: Zeroizing::new(String::new()),
        }
    }

    pub fn root_certificate_path(mut self, path: &str) -> Self {
        self.root_certificate_path = path.to_owned();
        self
    }

    pub fn certificates_path(mut self, path: &str) -> Self {
        self.certificates_path = path.to_owned();
        self
    }

    pub fn users_path(mut self, path: &str) -> Self {
        self.users_path = path.to_owned();
        self
    }

    /// Sets the raw `Authorization` header value.
    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Zeroizing::new(authorization.into());
        self
    }

    /// Sets a `Basic` authorization header from a username and password.
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let credentials = Zeroizing::new(format!("{username}:{password}"));
        let encoded = BASE64_STANDARD.encode(credentials.as_bytes());
        self.authorization(format!("Basic {encoded}"))
    }

    pub fn build(self) -> Result<Configuration> {
        HeaderValue::from_str(&self.authorization).map_err(|err| Error::Configuration {
            url: self.ca_url.clone(),
            reason: format!("invalid authorization header: {err}"),
        })?;

        Ok(Configuration {
            root_certificate_url: join(&self.ca_url, &self.root_certificate_path)?,
            certificates_url: join(&self.ca_url, &self.certificates_path)?,
            users_url: join(&self.ca_url, &self.users_path)?,
            authorization: self.authorization,
        })
    }
}

fn join(ca_url: &str, path: &str) -> Result<Url> {
    let full = format!("{ca_url}{path}");

    let url = Url::parse(&full).map_err(|err| Error::Configuration {
        url: full.clone(),
        reason: err.to_string(),
    })?;

    // resource ids get appended as path segments later on
    if url.cannot_be_a_base() {
        return Err(Error::Configuration {
            url: full,
            reason: "url cannot carry path segments".to_owned(),
        });
    }

    Ok(url)
}

/// Appends `id` to `url` as a single path segment, replacing a trailing empty segment.
pub(crate) fn append_path_segment(url: &Url, id: &str) -> Url {
    let mut url = url.clone();

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(id);
    }

    url
}
