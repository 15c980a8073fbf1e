use std::{
    collections::{HashMap, HashSet},
    net::TcpListener,
    sync::Arc,
};

use actix_web::{
    dev::ServerHandle, http::header::AUTHORIZATION, web, App, HttpRequest, HttpResponse,
    HttpServer,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::{
    api::{CaServerBody, CaServerResponse},
    entity::Certificatable,
    error::Result,
    trans::{CaRequest, CaResponse, Transport},
};

pub const AUTHORIZATION_VALUE: &str = "Basic cGVhY2U6d2hvYQ==";

/// JSON envelope the ca-server answers certificate requests with.
pub fn envelope(certificate: &str) -> String {
    serde_json::to_string(&CaServerResponse {
        user: "peace".to_owned(),
        certificate_id: "hella".to_owned(),
        csr: "whoa".to_owned(),
        certificate: certificate.to_owned(),
        created_at: "2023-01-27T20:12:52.000Z".to_owned(),
        updated_at: "2023-01-27T20:12:52.000Z".to_owned(),
    })
    .unwrap()
}

#[derive(Debug, Default, Clone)]
pub struct Installation {
    pub certificate_id: Option<String>,
    pub csr: Option<String>,
    pub certificate: Option<String>,
    pub root_certificate: Option<String>,
}

impl Certificatable for Installation {
    fn certificate_id(&self) -> Option<&str> {
        self.certificate_id.as_deref()
    }

    fn csr(&self) -> Option<&str> {
        self.csr.as_deref()
    }

    fn certificate(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    fn root_certificate(&self) -> Option<&str> {
        self.root_certificate.as_deref()
    }
}

/// Transport that fails the test when used.
#[derive(Debug)]
pub struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn send(&self, request: CaRequest) -> Result<CaResponse> {
        panic!("no request expected, got {} {}", request.method, request.url);
    }
}

/// In-memory transport answering with scripted responses and recording every request.
#[derive(Debug)]
pub struct RecordingTransport {
    fallback: (StatusCode, String),
    routes: HashMap<(String, String), (StatusCode, String)>,
    calls: Mutex<Vec<CaRequest>>,
}

impl RecordingTransport {
    /// Answers every request with `status` and `body`, unless a [`route`](Self::route) matches.
    pub fn always(status: StatusCode, body: &str) -> Self {
        RecordingTransport {
            fallback: (status, body.to_owned()),
            routes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn route(mut self, method: &str, path: &str, status: StatusCode, body: &str) -> Self {
        self.routes.insert(
            (method.to_owned(), path.to_owned()),
            (status, body.to_owned()),
        );
        self
    }

    pub fn calls(&self) -> Vec<CaRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: CaRequest) -> Result<CaResponse> {
        let key = (request.method.to_string(), request.url.path().to_owned());

        let (status, body) = self.routes.get(&key).unwrap_or(&self.fallback).clone();

        self.calls.lock().push(request);

        Ok(CaResponse::new(status, body))
    }
}

/// Data held by the mock ca-server.
#[derive(Debug, Default)]
pub struct CaState {
    pub users: HashSet<String>,
    pub certificates: HashMap<String, CaServerResponse>,

    /// Root certificate; the endpoint answers 404 while unset.
    pub root: Option<String>,

    /// `"METHOD /path"` of every request received.
    pub requests: Vec<String>,
}

pub struct TestServer {
    pub url: String,
    pub state: Arc<Mutex<CaState>>,
    handle: ServerHandle,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        drop(self.handle.stop(false));
    }
}

type State = web::Data<Mutex<CaState>>;

/// Records the request and rejects it when the credential is wrong.
fn accept(req: &HttpRequest, state: &State) -> Option<HttpResponse> {
    state
        .lock()
        .requests
        .push(format!("{} {}", req.method(), req.path()));

    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .is_some_and(|value| value == AUTHORIZATION_VALUE);

    (!authorized).then(|| HttpResponse::Unauthorized().finish())
}

async fn get_root(req: HttpRequest, state: State) -> HttpResponse {
    if let Some(res) = accept(&req, &state) {
        return res;
    }

    match &state.lock().root {
        Some(root) => HttpResponse::Ok().json(root),
        None => HttpResponse::NotFound().finish(),
    }
}

async fn get_user(req: HttpRequest, state: State, id: web::Path<String>) -> HttpResponse {
    if let Some(res) = accept(&req, &state) {
        return res;
    }

    if state.lock().users.contains(id.as_str()) {
        HttpResponse::Ok().json(serde_json::json!({ "user": id.as_str() }))
    } else {
        HttpResponse::NotFound().finish()
    }
}

async fn post_user(req: HttpRequest, state: State, body: web::Json<CaServerBody>) -> HttpResponse {
    if let Some(res) = accept(&req, &state) {
        return res;
    }

    if state.lock().users.insert(body.user.clone()) {
        HttpResponse::Created().json(serde_json::json!({ "user": body.user }))
    } else {
        HttpResponse::Conflict().finish()
    }
}

async fn get_certificate(req: HttpRequest, state: State, id: web::Path<String>) -> HttpResponse {
    if let Some(res) = accept(&req, &state) {
        return res;
    }

    match state.lock().certificates.get(id.as_str()) {
        Some(cert) => HttpResponse::Ok().json(cert),
        None => HttpResponse::NotFound().finish(),
    }
}

async fn post_certificate(
    req: HttpRequest,
    state: State,
    body: web::Json<CaServerBody>,
) -> HttpResponse {
    if let Some(res) = accept(&req, &state) {
        return res;
    }

    let CaServerBody {
        user,
        certificate_id: Some(certificate_id),
        csr: Some(csr),
    } = body.into_inner()
    else {
        return HttpResponse::BadRequest().finish();
    };

    let mut state = state.lock();

    if !state.users.contains(&user) {
        return HttpResponse::NotFound().finish();
    }

    // certificates are handed out URL encoded
    let cert = CaServerResponse {
        user,
        certificate_id: certificate_id.clone(),
        certificate: format!("CERT%20FOR%20{csr}"),
        csr,
        created_at: "2023-01-27T20:12:52.000Z".to_owned(),
        updated_at: "2023-01-27T20:12:52.000Z".to_owned(),
    };
    state.certificates.insert(certificate_id, cert.clone());

    HttpResponse::Created().json(cert)
}

pub fn with_ca_server(state: CaState) -> TestServer {
    let lst = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = lst.local_addr().unwrap().port();

    let url = format!("http://127.0.0.1:{port}");
    let state = Arc::new(Mutex::new(state));

    let data = web::Data::from(Arc::clone(&state));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/ca_certificate", web::get().to(get_root))
            .route("/appusers/", web::post().to(post_user))
            .route("/appusers/{id}", web::get().to(get_user))
            .route("/certificates/", web::post().to(post_certificate))
            .route("/certificates/{id}", web::get().to(get_certificate))
    })
    .listen(lst)
    .unwrap()
    .workers(1)
    .run();

    let handle = server.handle();

    tokio::spawn(server);

    TestServer { url, state, handle }
}

#[tokio::test]
pub async fn test_make_ca_server() {
    let server = with_ca_server(CaState::default());

    let res = reqwest::Client::new()
        .get(format!("{}/ca_certificate", server.url))
        .header("Authorization", AUTHORIZATION_VALUE)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reqwest::get(format!("{}/ca_certificate", server.url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
