use std::fmt;

/// A record that can hold a certificate issued by the ca-server.
///
/// Users, installations or any other record type implement this to be provisioned by
/// [`CaClient::get_certificates`] and [`CaClient::request_new_certificates`]. The workflow only
/// reads from the record; storing the returned [`Certificates`] is up to the caller.
///
/// ```
/// use ca_provision::Certificatable;
///
/// #[derive(Debug, Default)]
/// struct Installation {
///     certificate_id: Option<String>,
///     csr: Option<String>,
///     certificate: Option<String>,
///     root_certificate: Option<String>,
/// }
///
/// impl Certificatable for Installation {
///     fn certificate_id(&self) -> Option<&str> {
///         self.certificate_id.as_deref()
///     }
///
///     fn csr(&self) -> Option<&str> {
///         self.csr.as_deref()
///     }
///
///     fn certificate(&self) -> Option<&str> {
///         self.certificate.as_deref()
///     }
///
///     fn root_certificate(&self) -> Option<&str> {
///         self.root_certificate.as_deref()
///     }
/// }
///
/// let mut installation = Installation::default();
/// assert!(!installation.has_certificate());
///
/// installation.certificate = Some("-----BEGIN CERTIFICATE-----".to_owned());
/// assert!(installation.has_certificate());
/// assert!(!installation.has_root_certificate());
/// ```
///
/// [`CaClient::get_certificates`]: crate::CaClient::get_certificates()
/// [`CaClient::request_new_certificates`]: crate::CaClient::request_new_certificates()
pub trait Certificatable: fmt::Debug {
    /// Identifier of the certificate on the ca-server.
    fn certificate_id(&self) -> Option<&str>;

    /// The CSR the certificate is made from.
    fn csr(&self) -> Option<&str>;

    /// The certificate made from the CSR.
    fn certificate(&self) -> Option<&str>;

    /// The root certificate that signed the CSR.
    fn root_certificate(&self) -> Option<&str>;

    fn has_certificate(&self) -> bool {
        self.certificate().is_some()
    }

    fn has_root_certificate(&self) -> bool {
        self.root_certificate().is_some()
    }
}

/// Certificates obtained for a [`Certificatable`].
///
/// `root_certificate` is `None` when the root certificate could not be fetched; callers that
/// already trust a previously obtained root can keep using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificates {
    pub certificate: String,
    pub root_certificate: Option<String>,
}

impl Certificates {
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.certificate, self.root_certificate)
    }
}
