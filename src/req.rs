use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Url,
};
use serde::Serialize;

use crate::{
    api::{CaServerResponse, RestMethod},
    config::Configuration,
    error::{Error, Operation, Result},
    trans::{CaRequest, CaResponse},
};

/// Builds a request carrying the configured credential and a JSON content type.
pub(crate) fn prepare_request<B: Serialize + ?Sized>(
    config: &Configuration,
    url: Url,
    method: RestMethod,
    body: Option<&B>,
) -> Result<CaRequest> {
    let mut authorization =
        HeaderValue::from_str(config.authorization()).map_err(|err| Error::Configuration {
            url: url.to_string(),
            reason: format!("invalid authorization header: {err}"),
        })?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let body = body
        .map(serde_json::to_string)
        .transpose()
        .map_err(Error::Encoding)?;

    Ok(CaRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Passes 2xx responses through and turns everything else into [`Error::Transport`].
pub(crate) fn req_handle_error(
    res: CaResponse,
    url: &Url,
    operation: Operation,
) -> Result<CaResponse> {
    // ok responses pass through
    if res.is_success() {
        return Ok(res);
    }

    Err(Error::Transport {
        status: res.status,
        url: url.to_string(),
        operation,
        response: res.describe(),
    })
}

/// Extracts the certificate from a response body.
///
/// The structured envelope is preferred; a bare JSON string is accepted as fallback.
pub(crate) fn read_certificate(res: &CaResponse, url: &Url) -> Result<String> {
    if let Ok(envelope) = serde_json::from_str::<CaServerResponse>(&res.body) {
        return Ok(remove_percent_encoding(&envelope.certificate));
    }

    match serde_json::from_str::<String>(&res.body) {
        Ok(certificate) => Ok(remove_percent_encoding(&certificate)),
        Err(source) => Err(Error::Decoding {
            url: url.to_string(),
            body: res.body.clone(),
            source,
        }),
    }
}

/// The ca-server may hand out URL encoded PEM.
fn remove_percent_encoding(certificate: &str) -> String {
    match percent_decode_str(certificate).decode_utf8() {
        Ok(Cow::Borrowed(decoded)) => decoded.to_owned(),
        Ok(Cow::Owned(decoded)) => decoded,
        Err(err) => {
            log::warn!("Certificate is not valid UTF-8 once decoded, keeping it as is: {err}");
            certificate.to_owned()
        }
    }
}

pub(crate) async fn req_safe_read_body(res: reqwest::Response) -> String {
    // the connection may be closed abruptly after the status line was read; an unreadable body
    // is treated as empty so the status can still be reported.
    res.text().await.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::api::CaServerBody;

    fn url() -> Url {
        Url::parse("http://certificate-authority:3000/certificates/").unwrap()
    }

    #[test]
    fn request_carries_fixed_headers() {
        let config =
            Configuration::new("http://certificate-authority:3000", "Basic base64").unwrap();
        let body = CaServerBody::user("peace");

        let req = prepare_request(&config, url(), RestMethod::Post, Some(&body)).unwrap();

        assert_eq!(req.headers[AUTHORIZATION], "Basic base64");
        assert!(req.headers[AUTHORIZATION].is_sensitive());
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        assert_eq!(req.body.as_deref(), Some(r#"{"user":"peace"}"#));
    }

    #[test]
    fn request_without_body() {
        let config = Configuration::new("http://certificate-authority:3000", "").unwrap();
        let req = prepare_request::<CaServerBody>(&config, url(), RestMethod::Get, None).unwrap();
        assert!(req.body.is_none());
    }

    #[test]
    fn non_success_is_transport_error() {
        let res = CaResponse::new(StatusCode::NOT_FOUND, "nope");
        let err = req_handle_error(res, &url(), Operation::FetchCertificate).unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn reads_envelope() {
        let body = r#"{
            "user_id": "peace",
            "certificate_id": "hella",
            "csr": "whoa",
            "certificate": "we made it",
            "created_at": "",
            "updated_at": ""
        }"#;
        let res = CaResponse::new(StatusCode::OK, body);

        assert_eq!(read_certificate(&res, &url()).unwrap(), "we made it");
    }

    #[test]
    fn reads_bare_string() {
        let res = CaResponse::new(StatusCode::OK, r#""-----BEGIN%20CERTIFICATE-----""#);
        assert_eq!(
            read_certificate(&res, &url()).unwrap(),
            "-----BEGIN CERTIFICATE-----"
        );
    }

    #[test]
    fn undecodable_body() {
        let res = CaResponse::new(StatusCode::OK, r#"{"certificate": 42}"#);
        let err = read_certificate(&res, &url()).unwrap_err();
        assert!(matches!(err, Error::Decoding { .. }));
    }

    #[test]
    fn keeps_certificate_that_does_not_decode_to_utf8() {
        assert_eq!(remove_percent_encoding("abc%FF"), "abc%FF");
        assert_eq!(remove_percent_encoding("a%2Bb"), "a+b");
    }
}
