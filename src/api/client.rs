//! Ledger REST API Client
//!
//! One `reqwest::Client` wraps every backend call and applies two
//! cross-cutting rules:
//!
//! - Outgoing: attach `Authorization: Bearer <token>` when the session has a
//!   token, plus a fresh `X-Request-Id` for log correlation
//! - Incoming: on 401, clear the session and navigate to the login page,
//!   then hand the error back to the caller anyway
//!
//! Login and registration talk to the backend directly: a rejected password
//! is an answer, not an expired session.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::model::{AccessToken, NewUser, User};
use crate::navigation::{Navigator, Route};
use crate::session::Session;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix (e.g., "http://localhost:8000/api")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP gateway to the ledger backend
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client bound to a session and the navigator used on 401
    pub fn new(
        config: ClientConfig,
        session: Session,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            config,
            session,
            navigator,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Absolute URL for an endpoint path such as `/accounts`
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Request interceptor: bearer token when logged in
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send an intercepted request and return the successful response
    pub(crate) async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let request_id = Uuid::new_v4();
        let request = self
            .authorize(request)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .build()?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::transport(e);
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %err,
                    "Request failed"
                );
                return Err(err);
            }
        };

        let status = response.status();
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response received"
        );

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&request_id);
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let detail = read_detail(response).await;
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "API error occurred"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    /// Execute and decode a JSON body
    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Execute and discard the body
    pub(crate) async fn execute_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Response interceptor for 401: drop the session and go to login
    fn handle_unauthorized(&self, request_id: &Uuid) {
        tracing::warn!(request_id = %request_id, "Backend rejected credentials, clearing session");

        if let Err(e) = self.session.logout() {
            tracing::error!(error = %e, "Failed to clear session after 401");
        }
        self.navigator.navigate(Route::Login);
    }

    /// Exchange credentials for a bearer token and persist it.
    ///
    /// `POST /auth/token` with a form-encoded body.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        let response = self
            .post("/auth/token")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(ApiError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = read_detail(response).await;
            tracing::warn!(username = %username, status, "Login rejected");
            return Err(ApiError::Auth(
                detail.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ));
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(ApiError::Auth(LOGIN_FAILED.to_string()));
        }

        self.session.store(&token.access_token)?;
        tracing::info!(username = %username, "Logged in");
        Ok(token.access_token)
    }

    /// Create a user account. Does not log in.
    ///
    /// `POST /auth/register`
    pub async fn register(&self, user: &NewUser) -> ApiResult<User> {
        let response = self
            .post("/auth/register")
            .json(user)
            .send()
            .await
            .map_err(ApiError::transport)?;

        if !response.status().is_success() {
            let detail = read_detail(response).await;
            return Err(ApiError::Auth(
                detail.unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
            ));
        }

        let created: User = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        tracing::info!(username = %created.username, "Registered user");
        Ok(created)
    }

    /// Clear the session and return to the login page
    pub fn logout(&self) -> ApiResult<()> {
        self.session.logout()?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}

/// Pull the backend's `detail` out of an error response
async fn read_detail(response: Response) -> Option<String> {
    let text = response.text().await.unwrap_or_default();
    parse_detail(&text)
}

/// `{"detail": "..."}` yields the string; a structured detail (validation
/// errors) yields its JSON text; any other non-empty body is returned as is.
pub(crate) fn parse_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Router;

    fn client(base_url: &str) -> ApiClient {
        let session = Session::in_memory();
        let router = Arc::new(Router::new(session.clone()));
        ApiClient::new(ClientConfig::new(base_url), session, router).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_url_joining() {
        let api = client("http://localhost:8000/api/");
        assert_eq!(api.url("/accounts"), "http://localhost:8000/api/accounts");
        assert_eq!(api.url("categories"), "http://localhost:8000/api/categories");
    }

    #[test]
    fn test_parse_detail() {
        assert_eq!(
            parse_detail(r#"{"detail": "Incorrect username or password"}"#).as_deref(),
            Some("Incorrect username or password")
        );
        assert_eq!(
            parse_detail(r#"{"detail": [{"loc": ["query", "name"]}]}"#).as_deref(),
            Some(r#"[{"loc":["query","name"]}]"#)
        );
        assert_eq!(parse_detail("Internal Server Error").as_deref(), Some("Internal Server Error"));
        assert_eq!(parse_detail("   "), None);
    }

    #[test]
    fn test_logout_clears_and_redirects() {
        let session = Session::in_memory();
        session.store("token").unwrap();
        let router = Arc::new(Router::new(session.clone()));
        router.open(Route::Accounts);

        let api = ApiClient::new(ClientConfig::default(), session.clone(), router.clone()).unwrap();
        api.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(router.at_login());
    }
}
