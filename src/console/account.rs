//! Attendee and operator account calls: login, registration, profile and pass
//! listing. Passwords are `SecretString`s and only leave memory in the request
//! body.

use super::{
    api::{ApiClient, Form, Payload},
    capture::ImageBlob,
    error::{Error, Result},
    session::Session,
    types::{LoginRequest, LoginResponse, Pass, User},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde_json::to_value;
use std::{fmt, str::FromStr};
use tracing::{info, instrument};

/// Console a signed-in operator lands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Landing {
    #[default]
    Dashboard,
    Coordinator,
    Admin,
}

impl FromStr for Landing {
    type Err = Error;

    fn from_str(role: &str) -> Result<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::Dashboard),
            "coordinator" => Ok(Self::Coordinator),
            "admin" => Ok(Self::Admin),
            other => Err(Error::validation(format!("unknown console role: {other}"))),
        }
    }
}

impl fmt::Display for Landing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => f.write_str("dashboard (`gatepass me`, `gatepass passes`)"),
            Self::Coordinator => f.write_str("coordinator panel (`gatepass scan`)"),
            Self::Admin => f.write_str("admin panel (`gatepass admin`)"),
        }
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Exchanges credentials for a session token.
///
/// # Errors
/// Returns `Error::Validation` for blank credentials, otherwise the API error.
#[instrument(skip(api, password))]
pub async fn login(api: &ApiClient, username: &str, password: &SecretString) -> Result<Session> {
    let username = username.trim();
    if username.is_empty() || password.expose_secret().is_empty() {
        return Err(Error::validation("username and password are required"));
    }

    let body = to_value(LoginRequest { username, password })
        .map_err(|err| Error::Config(format!("failed to encode login request: {err}")))?;

    let response: LoginResponse = api.post("login/", Payload::Json(body)).await?;
    if response.token.trim().is_empty() {
        return Err(Error::Parse("login response has an empty token".to_string()));
    }

    info!("signed in");

    Ok(Session::with_token(SecretString::from(response.token)))
}

#[derive(Clone, Debug)]
pub struct RegisterForm {
    pub username: String,
    pub password: SecretString,
    pub email: String,
    pub role: String,
    pub student_type: String,
    pub college_name: Option<String>,
    pub photo: Option<ImageBlob>,
}

impl RegisterForm {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::validation("username is required"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(Error::validation("password is required"));
        }
        if !valid_email(self.email.trim()) {
            return Err(Error::validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }

    fn into_form(self) -> Form {
        let mut form = Form::new()
            .text("username", self.username.trim())
            .text("password", self.password.expose_secret())
            .text("email", self.email.trim())
            .text("role", self.role)
            .text("student_type", self.student_type);

        if let Some(college) = self
            .college_name
            .as_deref()
            .map(str::trim)
            .filter(|college| !college.is_empty())
        {
            form = form.text("college_name", college);
        }

        if let Some(photo) = self.photo {
            form = form.file("photo", photo);
        }

        form
    }
}

/// # Errors
/// Returns `Error::Validation` for missing fields or a malformed email,
/// otherwise the API error.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(api: &ApiClient, form: RegisterForm) -> Result<User> {
    form.validate()?;
    api.post("register/", Payload::Form(form.into_form())).await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn me(api: &ApiClient) -> Result<User> {
    api.session().require()?;
    api.get("me/").await
}

/// Active passes of the signed-in user; none is an empty list.
///
/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn passes(api: &ApiClient) -> Result<Vec<Pass>> {
    api.session().require()?;
    match api.get("my-qr/").await {
        Ok(passes) => Ok(passes),
        Err(Error::Http { status: 404, .. }) => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn form(email: &str) -> RegisterForm {
        RegisterForm {
            username: "carol".to_string(),
            password: SecretString::from("pw".to_string()),
            email: email.to_string(),
            role: "student".to_string(),
            student_type: "external".to_string(),
            college_name: Some("  ".to_string()),
            photo: None,
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("a@b.co"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.d"));
        assert!(!valid_email(""));
    }

    #[test]
    fn landing_by_role() {
        assert_eq!("user".parse::<Landing>().ok(), Some(Landing::Dashboard));
        assert_eq!("Coordinator".parse::<Landing>().ok(), Some(Landing::Coordinator));
        assert_eq!("admin".parse::<Landing>().ok(), Some(Landing::Admin));
        assert!("root".parse::<Landing>().is_err());
    }

    #[test]
    fn register_form_skips_blank_college() {
        let names: Vec<String> = form("c@d.io")
            .into_form()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(
            names,
            ["username", "password", "email", "role", "student_type"]
        );
    }

    #[tokio::test]
    async fn register_rejects_bad_email_locally() {
        let api = ApiClient::new("http://127.0.0.1:9/", Session::new()).unwrap();
        let err = register(&api, form("not-an-email")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn guarded_calls_need_a_session() {
        let api = ApiClient::new("http://127.0.0.1:9/", Session::new()).unwrap();
        assert_eq!(me(&api).await.unwrap_err(), Error::Unauthenticated);
        assert_eq!(passes(&api).await.unwrap_err(), Error::Unauthenticated);
    }

    #[tokio::test]
    async fn login_returns_session() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/"))
            .and(body_json(json!({"username": "dana", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Session::new())?;
        let session = login(&api, " dana ", &SecretString::from("pw".to_string())).await?;
        assert_eq!(
            session.token().map(|t| t.expose_secret().to_string()),
            Some("abc".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_failure_surfaces_status() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "non_field_errors": ["Unable to log in with provided credentials."]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri(), Session::new())?;
        let err = login(&api, "dana", &SecretString::from("bad".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        Ok(())
    }

    #[tokio::test]
    async fn missing_passes_is_empty_list() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/my-qr/"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "No active pass found."})),
            )
            .mount(&server)
            .await;

        let session = Session::with_token(SecretString::from("tok".to_string()));
        let api = ApiClient::new(&server.uri(), session)?;
        assert!(passes(&api).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn passes_are_listed() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/my-qr/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "qr_code_data": "EVENT_1_USER_2_erin", "event": {"id": 1, "name": "Main Gate", "is_persistent": true}},
                {"id": 2, "qr_code_data": "EVENT_3_USER_2_erin"}
            ])))
            .mount(&server)
            .await;

        let session = Session::with_token(SecretString::from("tok".to_string()));
        let api = ApiClient::new(&server.uri(), session)?;
        let passes = passes(&api).await?;
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].event_name(), "Main Gate");
        assert_eq!(passes[1].event_name(), "Hackathon Entry");
        Ok(())
    }
}
