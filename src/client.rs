use std::{fmt, sync::Arc};

use crate::{
    api::{CaServerBody, CertificateType, RestMethod},
    config::{append_path_segment, Configuration},
    error::{Error, Operation, Result},
    req::{prepare_request, read_certificate, req_handle_error},
    trans::{HttpTransport, Transport},
};

pub(crate) struct ClientInner<T> {
    pub config: Configuration,
    pub transport: T,
}

/// Client for a [ca-server].
///
/// Holds the [`Configuration`] and the [`Transport`] used for every call. Cloning is cheap and
/// clones share both; calls on different clones may run concurrently.
///
/// The provisioning workflow ([`get_certificates`], [`request_new_certificates`]) is built on the
/// lower level calls found here.
///
/// [ca-server]: https://github.com/netreconlab/ca-server
/// [`get_certificates`]: CaClient::get_certificates()
/// [`request_new_certificates`]: CaClient::request_new_certificates()
pub struct CaClient<T = HttpTransport> {
    pub(crate) inner: Arc<ClientInner<T>>,
}

impl CaClient<HttpTransport> {
    /// Creates a client talking HTTP through [`HttpTransport`].
    pub fn new(config: Configuration) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> CaClient<T> {
    pub fn with_transport(config: Configuration, transport: T) -> Self {
        CaClient {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Fetches the CA's root certificate.
    pub async fn fetch_root_certificate(&self) -> Result<String> {
        self.restful_certificates(RestMethod::Get, None, CertificateType::Root, None)
            .await
    }

    /// Fetches (`GET`), creates (`POST`) or updates (`PUT`) a user certificate.
    ///
    /// With a `certificate_id` the request targets that certificate, otherwise the collection.
    pub async fn fetch_or_create_user_certificate(
        &self,
        method: RestMethod,
        body: Option<&CaServerBody>,
        certificate_id: Option<&str>,
    ) -> Result<String> {
        self.restful_certificates(method, body, CertificateType::User, certificate_id)
            .await
    }

    /// Calls the certificates API and returns the certificate from the response.
    ///
    /// The root certificate can only be read; any other method fails with
    /// [`Error::InvalidOperation`] before a request is made.
    pub async fn restful_certificates(
        &self,
        method: RestMethod,
        body: Option<&CaServerBody>,
        certificate_type: CertificateType,
        certificate_id: Option<&str>,
    ) -> Result<String> {
        if certificate_type == CertificateType::Root && method != RestMethod::Get {
            return Err(Error::InvalidOperation {
                message: "Can only GET Root certificate from CA.".to_owned(),
            });
        }

        let config = &self.inner.config;

        let url = match (certificate_type, certificate_id) {
            (CertificateType::Root, _) => config.root_certificate_url().clone(),
            (_, Some(id)) => append_path_segment(config.certificates_url(), id),
            (_, None) => config.certificates_url().clone(),
        };

        let operation = match (certificate_type, method) {
            (CertificateType::Root, _) => Operation::FetchRootCertificate,
            (_, RestMethod::Get) => Operation::FetchCertificate,
            (_, RestMethod::Post) => Operation::CreateCertificate,
            (_, RestMethod::Put) => Operation::UpdateCertificate,
        };

        let req = prepare_request(config, url.clone(), method, body)?;

        log::debug!("Call endpoint: {method} {url}");
        if let Some(body) = &req.body {
            log::trace!("Request body: {body}");
        }

        let res = self.inner.transport.send(req).await?;
        log::trace!("Response: {}", res.describe());

        let res = req_handle_error(res, &url, operation)?;
        read_certificate(&res, &url)
    }

    /// Checks that the ca-server knows the account `id`.
    pub async fn verify_account_exists(&self, id: &str) -> Result<()> {
        self.restful_app_users(RestMethod::Get, None, Some(id)).await
    }

    /// Creates the account `id` on the ca-server.
    pub async fn create_account(&self, id: &str) -> Result<()> {
        let body = CaServerBody::user(id);
        self.restful_app_users(RestMethod::Post, Some(&body), None)
            .await
    }

    async fn restful_app_users(
        &self,
        method: RestMethod,
        body: Option<&CaServerBody>,
        id: Option<&str>,
    ) -> Result<()> {
        let config = &self.inner.config;

        let url = match id {
            Some(id) => append_path_segment(config.users_url(), id),
            None => config.users_url().clone(),
        };

        let operation = match method {
            RestMethod::Get => Operation::VerifyAccount,
            RestMethod::Post | RestMethod::Put => Operation::CreateAccount,
        };

        let req = prepare_request(config, url.clone(), method, body)?;

        log::debug!("Call endpoint: {method} {url}");

        let res = self.inner.transport.send(req).await?;
        log::trace!("Response: {}", res.describe());

        req_handle_error(res, &url, operation)?;
        Ok(())
    }
}

impl<T> Clone for CaClient<T> {
    fn clone(&self) -> Self {
        CaClient {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for CaClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
