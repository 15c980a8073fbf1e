//! Certificate provisioning workflow.
//!
//! Both public operations run the same short sequence of calls against the ca-server:
//!
//! 1. check the inputs (no request is made when one is missing);
//! 2. make sure the account exists, optionally creating it;
//! 3. fetch or create the certificate;
//! 4. fetch the root certificate. Failing to do so does not fail the call.

use crate::{
    api::{CaServerBody, RestMethod},
    client::CaClient,
    entity::{Certificatable, Certificates},
    error::{Error, MissingField, Result},
    trans::Transport,
};

/// What [`CaClient::get_certificates_with`] does when the entity already holds both a
/// certificate and a root certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnExisting {
    /// Return the existing certificates without contacting the ca-server.
    #[default]
    Return,

    /// Fail with [`Error::DuplicateRequest`].
    Reject,
}

/// Options for [`CaClient::get_certificates_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCertificatesOptions {
    /// Create the account on the ca-server if it does not exist yet. Defaults to `true`.
    pub create_user_account_if_needed: bool,

    /// Defaults to [`OnExisting::Return`].
    pub on_existing: OnExisting,
}

impl Default for GetCertificatesOptions {
    fn default() -> Self {
        GetCertificatesOptions {
            create_user_account_if_needed: true,
            on_existing: OnExisting::Return,
        }
    }
}

struct Required<'a> {
    account_id: &'a str,
    certificate_id: &'a str,
    csr: &'a str,
}

impl<'a> Required<'a> {
    fn check<E>(account_id: Option<&'a str>, entity: &'a E) -> Result<Self>
    where
        E: Certificatable + ?Sized,
    {
        match (account_id, entity.certificate_id(), entity.csr()) {
            (Some(account_id), Some(certificate_id), Some(csr)) => Ok(Required {
                account_id,
                certificate_id,
                csr,
            }),

            (account_id, certificate_id, csr) => {
                let fields = [
                    (account_id.is_none(), MissingField::AccountId),
                    (certificate_id.is_none(), MissingField::CertificateId),
                    (csr.is_none(), MissingField::Csr),
                ]
                .into_iter()
                .filter_map(|(missing, field)| missing.then_some(field))
                .collect();

                Err(Error::MissingField {
                    fields,
                    object: format!("{entity:?}"),
                })
            }
        }
    }

    fn body(&self) -> CaServerBody {
        CaServerBody::certificate(self.account_id, self.certificate_id, self.csr)
    }
}

impl<T: Transport> CaClient<T> {
    /// Makes sure the ca-server has an account for `account_id`.
    ///
    /// When the account cannot be verified and `create_if_missing` is set, creating it is
    /// attempted; otherwise the verification error is returned unchanged. With
    /// `create_if_missing` this succeeds whether or not the account existed before.
    pub async fn ensure_account(&self, account_id: &str, create_if_missing: bool) -> Result<()> {
        let err = match self.verify_account_exists(account_id).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if !create_if_missing {
            return Err(err);
        }

        log::debug!("Could not verify account {account_id} ({err}), creating it");
        self.create_account(account_id).await
    }

    /// Gets the certificates for `entity`, creating them when needed.
    ///
    /// Creates the account for `account_id` when it does not exist. See
    /// [`get_certificates_with`](Self::get_certificates_with) for details.
    pub async fn get_certificates<E>(
        &self,
        account_id: Option<&str>,
        entity: &E,
    ) -> Result<Certificates>
    where
        E: Certificatable + ?Sized,
    {
        self.get_certificates_with(account_id, entity, GetCertificatesOptions::default())
            .await
    }

    /// Gets the certificates for `entity`, creating them when needed.
    ///
    /// An entity that already holds both certificates is handled per
    /// [`options.on_existing`](GetCertificatesOptions::on_existing), without any request.
    /// Otherwise the account is ensured, then, if the entity has no certificate, the
    /// certificate is fetched by its id and created from the CSR when that fails. An entity that
    /// already has a certificate keeps it and only the root certificate is fetched.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if `account_id`, the certificate id or the CSR is absent.
    /// - [`Error::DuplicateRequest`] with [`OnExisting::Reject`].
    /// - Any error from ensuring the account or creating the certificate.
    pub async fn get_certificates_with<E>(
        &self,
        account_id: Option<&str>,
        entity: &E,
        options: GetCertificatesOptions,
    ) -> Result<Certificates>
    where
        E: Certificatable + ?Sized,
    {
        let required = Required::check(account_id, entity)?;

        if let (Some(certificate), Some(root_certificate)) =
            (entity.certificate(), entity.root_certificate())
        {
            return match options.on_existing {
                OnExisting::Return => Ok(Certificates {
                    certificate: certificate.to_owned(),
                    root_certificate: Some(root_certificate.to_owned()),
                }),

                OnExisting::Reject => Err(Error::DuplicateRequest {
                    message: format!("object already has certificates: {entity:?}"),
                }),
            };
        }

        self.ensure_account(required.account_id, options.create_user_account_if_needed)
            .await?;

        let certificate = match entity.certificate() {
            Some(certificate) => certificate.to_owned(),
            None => self.fetch_or_create_certificate(&required).await?,
        };

        Ok(Certificates {
            certificate,
            root_certificate: self.fetch_root_certificate_if_available().await,
        })
    }

    /// Requests a new certificate for `entity`, whatever it currently holds.
    ///
    /// Useful when certificates have expired. The account for `account_id` must already exist;
    /// use [`request_new_certificates_with`](Self::request_new_certificates_with) to create it.
    pub async fn request_new_certificates<E>(
        &self,
        account_id: Option<&str>,
        entity: &E,
    ) -> Result<Certificates>
    where
        E: Certificatable + ?Sized,
    {
        self.request_new_certificates_with(account_id, entity, false)
            .await
    }

    /// Requests a new certificate for `entity`, whatever it currently holds.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingField`] if `account_id`, the certificate id or the CSR is absent.
    /// - Any error from ensuring the account or creating the certificate.
    pub async fn request_new_certificates_with<E>(
        &self,
        account_id: Option<&str>,
        entity: &E,
        create_user_account_if_needed: bool,
    ) -> Result<Certificates>
    where
        E: Certificatable + ?Sized,
    {
        let required = Required::check(account_id, entity)?;

        self.ensure_account(required.account_id, create_user_account_if_needed)
            .await?;

        let body = required.body();
        let certificate = self
            .fetch_or_create_user_certificate(RestMethod::Post, Some(&body), None)
            .await?;

        Ok(Certificates {
            certificate,
            root_certificate: self.fetch_root_certificate_if_available().await,
        })
    }

    async fn fetch_or_create_certificate(&self, required: &Required<'_>) -> Result<String> {
        let fetched = self
            .fetch_or_create_user_certificate(
                RestMethod::Get,
                None,
                Some(required.certificate_id),
            )
            .await;

        match fetched {
            Ok(certificate) => Ok(certificate),
            Err(err) => {
                log::debug!(
                    "Certificate {} not fetched ({err}), creating it",
                    required.certificate_id
                );

                let body = required.body();
                self.fetch_or_create_user_certificate(RestMethod::Post, Some(&body), None)
                    .await
            }
        }
    }

    async fn fetch_root_certificate_if_available(&self) -> Option<String> {
        match self.fetch_root_certificate().await {
            Ok(root) => Some(root),
            Err(err) => {
                log::warn!("Could not fetch root certificate: {err}");
                None
            }
        }
    }
}
