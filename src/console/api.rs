//! HTTP client for the event API with consistent error handling. Every call
//! carries the injected session's bearer token when one is present. There is
//! no retry, backoff or caching: failures go straight back to the caller.

use super::{
    capture::ImageBlob,
    error::{Error, Result},
    session::Session,
};
use crate::APP_USER_AGENT;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Request body: structured JSON or multipart form content.
#[derive(Clone, Debug)]
pub enum Payload {
    Json(Value),
    Form(Form),
}

#[derive(Clone, Debug)]
enum FormValue {
    Text(String),
    File(ImageBlob),
}

/// Multipart form built from text fields and image files.
#[derive(Clone, Debug, Default)]
pub struct Form {
    fields: Vec<(String, FormValue)>,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields
            .push((name.to_string(), FormValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, image: ImageBlob) -> Self {
        self.fields.push((name.to_string(), FormValue::File(image)));
        self
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    fn into_multipart(self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();

        for (name, value) in self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(image) => {
                    let part = multipart::Part::bytes(image.bytes().to_vec())
                        .file_name(image.file_name().to_string())
                        .mime_str(image.content_type())
                        .map_err(|err| {
                            Error::validation(format!(
                                "invalid content type {}: {err}",
                                image.content_type()
                            ))
                        })?;
                    form.part(name, part)
                }
            };
        }

        Ok(form)
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    /// # Errors
    /// Returns `Error::Config` if `base_url` is not an http(s) URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, session: Session) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Resolves an API path against the base URL.
    ///
    /// # Errors
    /// Returns `Error::Config` if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim().trim_start_matches('/'))
            .map_err(|err| Error::Config(format!("invalid API path {path}: {err}")))
    }

    /// Absolute URL for a server-relative media path such as a profile photo.
    #[must_use]
    pub fn media_url(&self, path: &str) -> Option<String> {
        self.base_url.join(path).ok().map(String::from)
    }

    /// # Errors
    /// Returns `Error::Network`, `Error::Http` or `Error::Parse`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        handle_json_response(response).await
    }

    /// # Errors
    /// Returns `Error::Network`, `Error::Http` or `Error::Parse`.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Payload) -> Result<T> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        handle_json_response(response).await
    }

    /// Posts and only checks the status, ignoring the response body.
    ///
    /// # Errors
    /// Returns `Error::Network` or `Error::Http`.
    pub async fn post_empty(&self, path: &str, body: Payload) -> Result<()> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        handle_empty_response(response).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<Payload>) -> Result<Response> {
        let url = self.endpoint(path)?;

        let span = info_span!(
            "api.request",
            http.method = %method,
            url = %url
        );

        let mut request = self.http.request(method, url);
        request = self.authorize(request);

        request = match body {
            Some(Payload::Json(json)) => request.json(&json),
            Some(Payload::Form(form)) => request.multipart(form.into_multipart()?),
            None => request,
        };

        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(|err| Error::Network(err.to_string()))?;

        debug!("{} -> {}", path, response.status());

        Ok(response)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|err| Error::Config(format!("invalid API URL {base_url}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::Config(format!(
                "invalid API URL {base_url}: unsupported scheme {scheme}"
            )))
        }
    }

    // Url::join replaces the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Parses JSON responses; HTTP errors keep the raw body for `Error::detail`.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::Http { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn signed_in() -> Session {
        Session::with_token(SecretString::from("tok-123".to_string()))
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api", Session::new()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            client.endpoint("/admin/verify-qr/").unwrap().as_str(),
            "http://localhost:8000/api/admin/verify-qr/"
        );
        assert_eq!(
            client.endpoint("me/").unwrap().as_str(),
            "http://localhost:8000/api/me/"
        );
    }

    #[test]
    fn media_url_resolves_against_origin() {
        let client = ApiClient::new("http://localhost:8000/api/", Session::new()).unwrap();
        assert_eq!(
            client.media_url("/media/profile_photos/a.jpg").as_deref(),
            Some("http://localhost:8000/media/profile_photos/a.jpg")
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            ApiClient::new("not a url", Session::new()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://files.example.com", Session::new()),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn get_attaches_bearer_token() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/me/"))
            .and(header("Authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), signed_in())?;
        let body: Value = client.get("me/").await?;
        assert_eq!(body, json!({"ok": true}));
        Ok(())
    }

    #[tokio::test]
    async fn anonymous_requests_have_no_authorization_header() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/"))
            .and(body_json(json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Session::new())?;
        let _: Value = client
            .post(
                "login/",
                Payload::Json(json!({"username": "alice", "password": "pw"})),
            )
            .await?;

        let Some(requests) = server.received_requests().await else {
            anyhow::bail!("wiremock request recording is disabled");
        };
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
        Ok(())
    }

    #[tokio::test]
    async fn http_errors_carry_status_and_body() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"detail": "You do not have permission."})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), signed_in())?;
        let err = client.get::<Value>("users/").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.detail().as_deref(), Some("You do not have permission."));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), signed_in())?;
        let err = client.get::<Value>("events/").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() -> anyhow::Result<()> {
        // bind then drop to get a port nobody listens on
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };

        let client = ApiClient::new(&format!("http://127.0.0.1:{port}/"), Session::new())?;
        let err = client.get::<Value>("me/").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        Ok(())
    }

    #[tokio::test]
    async fn multipart_forms_are_sent() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/complaints/"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), signed_in())?;
        let image = ImageBlob::new(b"jpeg-bytes".to_vec(), "capture.jpg", "image/jpeg")?;
        let form = Form::new()
            .text("username", "alice")
            .text("description", "pushed past the gate")
            .file("proof_photo", image);
        assert_eq!(
            form.names().collect::<Vec<_>>(),
            vec!["username", "description", "proof_photo"]
        );

        client.post_empty("complaints/", Payload::Form(form)).await?;

        let Some(requests) = server.received_requests().await else {
            anyhow::bail!("wiremock request recording is disabled");
        };
        let request: &Request = &requests[0];
        let content_type = request
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains("name=\"username\""));
        assert!(body.contains("pushed past the gate"));
        assert!(body.contains("filename=\"capture.jpg\""));
        assert!(body.contains("jpeg-bytes"));
        Ok(())
    }
}
