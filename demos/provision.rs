use std::env;

use ca_provision::{CaClient, Certificatable, Configuration};
use eyre::WrapErr as _;

/// Record holding the certificate of one device.
#[derive(Debug)]
struct Installation {
    certificate_id: String,
    csr: String,
    certificate: Option<String>,
    root_certificate: Option<String>,
}

impl Certificatable for Installation {
    fn certificate_id(&self) -> Option<&str> {
        Some(&self.certificate_id)
    }

    fn csr(&self) -> Option<&str> {
        Some(&self.csr)
    }

    fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    fn root_certificate(&self) -> Option<&str> {
        self.root_certificate.as_deref()
    }
}

fn var(name: &str) -> eyre::Result<String> {
    env::var(name).wrap_err_with(|| format!("{name} must be set"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let ca_url = var("CA_URL")?;
    let account_id = var("ACCOUNT_ID")?;
    let certificate_id = var("CERTIFICATE_ID")?;

    let config = Configuration::builder(&ca_url)
        .basic_auth(&var("CA_USERNAME")?, &var("CA_PASSWORD")?)
        .build()?;
    let client = CaClient::new(config)?;

    // The key never leaves this process; only the CSR is sent to the ca-server.
    log::info!("generating key pair and CSR for {certificate_id}");
    let key_pair = rcgen::KeyPair::generate()?;
    let csr = rcgen::CertificateParams::new(vec![certificate_id.clone()])?
        .serialize_request(&key_pair)?
        .pem()?;

    let mut installation = Installation {
        certificate_id,
        csr,
        certificate: None,
        root_certificate: None,
    };

    log::info!("requesting certificates from {ca_url}");
    let certs = client
        .get_certificates(Some(account_id.as_str()), &installation)
        .await?;

    // Storing the results is up to us.
    installation.certificate = Some(certs.certificate);
    if certs.root_certificate.is_some() {
        installation.root_certificate = certs.root_certificate;
    } else {
        log::warn!("root certificate unavailable");
    }

    println!("{installation:#?}");

    Ok(())
}
