//! HTTP client for the Code Rev backend.
//!
//! Every request carries the cookie jar and, when a session token is known,
//! an `Authorization: Bearer` header. Non-2xx responses are turned into
//! [`ApiError::Server`] carrying the backend's `message` field.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::endpoints::{self, PAGE_LIMIT};
use super::types::{
    CodeSubmission, Comment, CommentDraft, Envelope, FeedbackDraft, GoogleLoginRequest,
    LoginRequest, NewSubmission, Page, ProfileUpdate, RegisterRequest, UserProfile,
};
use crate::errors::{ApiError, ConfigError};
use crate::review::ReviewRegenerator;

pub const PRODUCTION_BASE_URL: &str = "https://code-rev-back.vercel.app/api/v1";
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Backend deployment to talk to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE_URL,
            Self::Development => DEVELOPMENT_BASE_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl ApiClientConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            base_url: env.base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Explicit base URL; overrides the environment's.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A signed-in session returned by the login endpoints.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
    pub message: Option<String>,
}

/// Result of `auth/register`.
///
/// Some deployments sign the user in directly; others only confirm the
/// account and expect a separate login.
#[derive(Debug, Clone)]
pub struct Registration {
    pub message: Option<String>,
    pub session: Option<Session>,
}

/// The backend client.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    http: reqwest::Client,
    token: Option<String>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig, token: Option<String>) -> Result<Self, ApiError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ApiError::InvalidBaseUrl {
                url: config.base_url,
            });
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("coderev/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            config,
            http,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Replace the bearer token used for subsequent requests.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = endpoints::join(&self.config.base_url, path);
        debug!(%method, %url, "sending request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or_default();
            warn!(%status, %message, "backend rejected request");
            return Err(ApiError::Server { status, message });
        }

        let body = if body.trim().is_empty() { "{}" } else { &body };
        serde_json::from_str(body).map_err(ApiError::Decode)
    }

    /// Send and return only the envelope's `message`.
    async fn send_message(&self, builder: RequestBuilder) -> Result<Option<String>, ApiError> {
        Ok(self.send::<serde_json::Value>(builder).await?.message)
    }

    fn require<T>(data: Option<T>, what: &str) -> Result<T, ApiError> {
        data.ok_or_else(|| {
            ApiError::Decode(<serde_json::Error as serde::de::Error>::custom(format!(
                "response is missing {}",
                what
            )))
        })
    }

    fn session_from(env: Envelope<UserProfile>) -> Option<Session> {
        match (env.data, env.access_token) {
            (Some(user), Some(token)) if !token.is_empty() => Some(Session {
                user,
                token,
                message: env.message,
            }),
            _ => None,
        }
    }

    // ---- auth ----

    pub async fn login(&self, body: &LoginRequest) -> Result<Session, ApiError> {
        let env = self
            .send::<UserProfile>(self.request(Method::POST, endpoints::AUTH_LOGIN).json(body))
            .await?;
        Self::require(Self::session_from(env), "user or access token")
    }

    pub async fn google_login(&self, body: &GoogleLoginRequest) -> Result<Session, ApiError> {
        let env = self
            .send::<UserProfile>(self.request(Method::POST, endpoints::AUTH_GOOGLE).json(body))
            .await?;
        Self::require(Self::session_from(env), "user or access token")
    }

    pub async fn register(&self, body: &RegisterRequest) -> Result<Registration, ApiError> {
        let env = self
            .send::<UserProfile>(
                self.request(Method::POST, endpoints::AUTH_REGISTER)
                    .json(body),
            )
            .await?;
        let message = env.message.clone();
        Ok(Registration {
            message,
            session: Self::session_from(env),
        })
    }

    pub async fn logout(&self) -> Result<Option<String>, ApiError> {
        self.send_message(self.request(Method::GET, endpoints::AUTH_LOGOUT))
            .await
    }

    // ---- code ----

    pub async fn submit_code(&self, body: &NewSubmission) -> Result<Option<String>, ApiError> {
        self.send_message(self.request(Method::POST, endpoints::CODE_CREATE).json(body))
            .await
    }

    pub async fn fetch_code(&self, slug: &str) -> Result<CodeSubmission, ApiError> {
        let env = self
            .send(self.request(Method::GET, &endpoints::code_get(slug)))
            .await?;
        Self::require(env.data, "submission")
    }

    pub async fn fetch_public_code(&self, slug: &str) -> Result<CodeSubmission, ApiError> {
        let env = self
            .send(self.request(Method::GET, &endpoints::code_get_public(slug)))
            .await?;
        Self::require(env.data, "submission")
    }

    pub async fn update_code(
        &self,
        slug: &str,
        body: &NewSubmission,
    ) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::PUT, &endpoints::code_update(slug))
                .json(body),
        )
        .await
    }

    pub async fn delete_code(&self, slug: &str) -> Result<Option<String>, ApiError> {
        self.send_message(self.request(Method::DELETE, &endpoints::code_delete(slug)))
            .await
    }

    /// The signed-in user's submissions.
    pub async fn list_mine(&self, page: u32) -> Result<Page<CodeSubmission>, ApiError> {
        self.list(endpoints::CODE_ALL, page, PAGE_LIMIT).await
    }

    /// Everyone's public submissions.
    pub async fn list_public(&self, page: u32) -> Result<Page<CodeSubmission>, ApiError> {
        self.list(endpoints::CODE_ALL_PUBLIC, page, PAGE_LIMIT).await
    }

    /// Fetch one page; `page` is clamped to at least 1.
    pub async fn list(
        &self,
        path: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<CodeSubmission>, ApiError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let env = self
            .send::<Vec<CodeSubmission>>(
                self.request(Method::GET, path)
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await?;
        Ok(Page {
            items: env.data.unwrap_or_default(),
            page,
            total_pages: env.total_pages.unwrap_or(1).max(1),
        })
    }

    pub async fn re_review(&self, slug: &str) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::PATCH, &endpoints::code_re_review(slug))
                .json(&serde_json::json!({})),
        )
        .await
    }

    // ---- comments & likes ----

    /// Comment on submission `code_id`.
    pub async fn add_comment(
        &self,
        code_id: &str,
        body: &CommentDraft,
    ) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::POST, &endpoints::review_submit(code_id))
                .json(body),
        )
        .await
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        body: &CommentDraft,
    ) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::PUT, &endpoints::review_update(comment_id))
                .json(body),
        )
        .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<Option<String>, ApiError> {
        self.send_message(self.request(Method::DELETE, &endpoints::review_delete(comment_id)))
            .await
    }

    /// Comments written by the signed-in user.
    pub async fn my_comments(&self) -> Result<Vec<Comment>, ApiError> {
        let env = self
            .send::<Vec<Comment>>(self.request(Method::GET, endpoints::REVIEW_ALL))
            .await?;
        Ok(env.data.unwrap_or_default())
    }

    /// Toggle the signed-in user's like on `code_id`.
    pub async fn like(&self, code_id: &str) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::POST, &endpoints::like_add(code_id))
                .json(&serde_json::json!({})),
        )
        .await
    }

    // ---- profile & feedback ----

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let env = self
            .send(self.request(Method::GET, endpoints::USER_GET))
            .await?;
        Self::require(env.data, "user profile")
    }

    /// Apply `changes`; returns the updated profile when the backend echoes it.
    pub async fn update_profile(
        &self,
        changes: &ProfileUpdate,
    ) -> Result<(Option<String>, Option<UserProfile>), ApiError> {
        let env = self
            .send::<UserProfile>(self.request(Method::PUT, endpoints::USER_UPDATE).json(changes))
            .await?;
        Ok((env.message, env.data))
    }

    pub async fn delete_account(&self) -> Result<Option<String>, ApiError> {
        self.send_message(self.request(Method::DELETE, endpoints::USER_DELETE))
            .await
    }

    pub async fn send_feedback(&self, body: &FeedbackDraft) -> Result<Option<String>, ApiError> {
        self.send_message(
            self.request(Method::POST, endpoints::FEEDBACK_CREATE)
                .json(body),
        )
        .await
    }
}

#[async_trait]
impl ReviewRegenerator for ApiClient {
    async fn regenerate(&self, slug: &str) -> Result<Option<String>, ApiError> {
        self.re_review(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{RegenerateOutcome, RegenerationTrigger};
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
        let config = ApiClientConfig::default().with_base_url(format!("{}/api/v1", server.uri()));
        ApiClient::new(config, token.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_environment_base_urls() {
        assert_eq!(Environment::Production.base_url(), PRODUCTION_BASE_URL);
        assert_eq!(Environment::Development.base_url(), DEVELOPMENT_BASE_URL);
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Development);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_config_uses_production_and_ten_seconds() {
        let config = ApiClientConfig::default();
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let config = ApiClientConfig::for_environment(Environment::Development)
            .with_base_url("https://example.test/api/v1/");
        assert_eq!(config.base_url, "https://example.test/api/v1");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = ApiClientConfig::default().with_base_url("ftp://nope");
        assert!(matches!(
            ApiClient::new(config, None),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_login_returns_user_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(json!({ "email": "a@x.io", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful",
                "data": { "_id": "u1", "name": "Ada" },
                "accessToken": "tok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server, None)
            .login(&LoginRequest {
                email: "a@x.io".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user.id.as_deref(), Some("u1"));
        assert_eq!(session.message.as_deref(), Some("Login successful"));
    }

    #[tokio::test]
    async fn test_login_without_token_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "_id": "u1" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .login(&LoginRequest {
                email: "a".into(),
                password: "b".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_bearer_header_sent_when_token_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user/get"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "_id": "u1", "name": "Ada" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client(&server, Some("secret")).profile().await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/code/all/public"))
            .respond_with(|req: &Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({ "data": [] }))
                }
            })
            .mount(&server)
            .await;

        let page = client(&server, None).list_public(1).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_server_message_surfaces_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/code/create"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "message": "Title is required" })),
            )
            .mount(&server)
            .await;

        let err = client(&server, Some("t"))
            .submit_code(&NewSubmission::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.user_message(), "Title is required");
    }

    #[tokio::test]
    async fn test_non_json_error_body_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/code/get/missing"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = client(&server, None).fetch_code("missing").await.unwrap_err();
        assert_eq!(err.user_message(), crate::errors::GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_list_clamps_page_and_reports_total_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/code/all"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "_id": "c1", "slug": "a" }],
                "totalPages": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server, Some("t")).list_mine(0).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_fetch_code_normalizes_structured_review() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/code/get/quick-sort"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "_id": "c1",
                    "slug": "quick-sort",
                    "aiResponse": "{\"verdict\":\"Good\",\"overallScore\":8}"
                }
            })))
            .mount(&server)
            .await;

        let code = client(&server, None).fetch_code("quick-sort").await.unwrap();
        let review = code.ai_response.as_structured().unwrap();
        assert_eq!(review.verdict, "Good");
    }

    #[tokio::test]
    async fn test_comment_body_carries_rating_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/review/submit/c1"))
            .and(body_json(json!({ "comment": "Nice", "rating": "5" })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "message": "Comment added" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let msg = client(&server, Some("t"))
            .add_comment("c1", &CommentDraft::new("Nice", 5).unwrap())
            .await
            .unwrap();
        assert_eq!(msg.as_deref(), Some("Comment added"));
    }

    #[tokio::test]
    async fn test_register_without_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/register"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "message": "Registered" })),
            )
            .mount(&server)
            .await;

        let reg = client(&server, None)
            .register(&RegisterRequest {
                name: "A".into(),
                email: "a@x.io".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert!(reg.session.is_none());
        assert_eq!(reg.message.as_deref(), Some("Registered"));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/code/delete/x"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let msg = client(&server, Some("t")).delete_code("x").await.unwrap();
        assert!(msg.is_none());
    }

    #[tokio::test]
    async fn test_regeneration_through_client() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/code/re-review/slug-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Done" })))
            .expect(1)
            .mount(&server)
            .await;

        let trigger = RegenerationTrigger::new();
        let outcome = trigger.fire(&client(&server, Some("t")), "slug-1").await;
        assert_eq!(
            outcome,
            RegenerateOutcome::Regenerated {
                message: "Done".into()
            }
        );
        assert!(!trigger.is_busy());
    }

    #[tokio::test]
    async fn test_regeneration_failure_reports_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/code/re-review/slug-1"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "message": "Not your code" })),
            )
            .mount(&server)
            .await;

        let trigger = RegenerationTrigger::new();
        let outcome = trigger.fire(&client(&server, Some("t")), "slug-1").await;
        assert_eq!(
            outcome,
            RegenerateOutcome::Failed {
                message: "Not your code".into()
            }
        );
    }
}
