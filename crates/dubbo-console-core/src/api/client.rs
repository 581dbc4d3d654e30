//! API client for the registry's admin REST API.
//!
//! Every call goes through the gatekeeper: the stored session token is
//! attached on the way out, and failures are notified on the way back
//! before being returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::gatekeeper::{ErrorHandler, Notifier};
use crate::models::{Envelope, RuleKind, RuleQuery, ServiceDetail, ServiceSummary};

use super::ApiError;

/// The registry writes service keys with `/` (group separator); in a path
/// segment that slash is sent as `*`
const PATH_SEPARATOR_PLACEHOLDER: &str = "*";

const NO_QUERY: &[(&str, &str)] = &[];

/// API client for the registry admin backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_root: String,
    credentials: Arc<CredentialStore>,
    errors: ErrorHandler,
}

impl ApiClient {
    /// Create a client for the registry described by `config`
    pub fn new(
        config: &Config,
        credentials: Arc<CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_root: config.api_root(),
            credentials,
            errors: ErrorHandler::new(notifier),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Every path lives under `{base_url}/api/{env}`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_root, path)
        } else {
            format!("{}/{}", self.api_root, path)
        }
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        let token = self.credentials.get_token();
        if token.is_empty() {
            return headers;
        }
        match header::HeaderValue::from_str(&token) {
            Ok(value) => {
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value, sending request without it"),
        }
        headers
    }

    /// Send a request and return the body of a successful response.
    /// Failures are notified before they are returned.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.errors.handle_response_error(ApiError::Network(e))),
        };

        // The final URL, query included, as the server saw it
        let url = response.url().to_string();
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            let reason = response
                .extensions()
                .get::<hyper::ext::ReasonPhrase>()
                .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(self
                .errors
                .handle_response_error(ApiError::from_status(status, reason.as_deref(), &url, &body)));
        }

        // A response arrived, so a broken body is not a network failure
        response.text().await.map_err(|e| ApiError::InvalidResponse {
            url,
            reason: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str::<Envelope<T>>(body)
            .map(Envelope::into_inner)
            .map_err(|e| ApiError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let request = self
            .client
            .get(&url)
            .headers(self.auth_headers())
            .query(query);
        let body = self.execute(request).await?;
        Self::decode(&url, &body)
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Sending request");
        let mut request = self
            .client
            .request(method, &url)
            .headers(self.auth_headers());
        if let Some(body) = body {
            request = request.json(body);
        }
        let body = self.execute(request).await?;
        Self::decode(&url, &body)
    }

    // ===== Session =====

    /// Log in and remember the session.
    ///
    /// The registry answers with the bare token, or with nothing when the
    /// credentials are wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("/user/login");
        debug!(url = %url, username, "Logging in");
        let request = self
            .client
            .get(&url)
            .query(&[("userName", username), ("password", password)]);
        let body = self.execute(request).await?;

        let token = Self::parse_token(&body);
        if token.is_empty() {
            return Err(ApiError::LoginRejected);
        }

        self.credentials.set_token(&token)?;
        self.credentials.set_username(username)?;
        info!(username, "Logged in");
        Ok(token)
    }

    /// The login body is either the raw token, a JSON string, or an
    /// enveloped JSON string. `null` means rejected.
    fn parse_token(body: &str) -> String {
        let trimmed = body.trim();
        match serde_json::from_str::<Envelope<Option<String>>>(trimmed) {
            Ok(envelope) => envelope.into_inner().unwrap_or_default().trim().to_string(),
            Err(_) => trimmed.to_string(),
        }
    }

    /// Log out remotely and forget the session locally.
    ///
    /// Local credentials are cleared even when the remote call fails; that
    /// failure is still notified and returned.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url("/user/logout");
        debug!(url = %url, "Logging out");
        let request = self.client.delete(&url).headers(self.auth_headers());
        let remote = self.execute(request).await;
        self.credentials.clear()?;
        info!("Logged out");
        remote.map(|_| ())
    }

    // ===== Registry listings =====

    /// All service names known to the registry
    pub async fn services(&self) -> Result<Vec<String>, ApiError> {
        self.get("/services", NO_QUERY).await
    }

    /// All application names
    pub async fn applications(&self) -> Result<Vec<String>, ApiError> {
        self.get("/applications", NO_QUERY).await
    }

    /// Application names from instance-level (application) registration
    pub async fn instance_applications(&self) -> Result<Vec<String>, ApiError> {
        self.get("/applications/instance", NO_QUERY).await
    }

    pub async fn consumers(&self) -> Result<Vec<String>, ApiError> {
        self.get("/consumers", NO_QUERY).await
    }

    /// Search services. `pattern` names what `filter` matches against:
    /// `service`, `application` or `ip`.
    pub async fn search_services(&self, pattern: &str, filter: &str) -> Result<Vec<ServiceSummary>, ApiError> {
        self.get("/service", &[("pattern", pattern), ("filter", filter)])
            .await
    }

    pub async fn service_detail(&self, service: &str) -> Result<ServiceDetail, ApiError> {
        let segment = service.replace('/', PATH_SEPARATOR_PLACEHOLDER);
        self.get(&format!("/service/{}", segment), NO_QUERY).await
    }

    // ===== Governance rules =====

    pub async fn list_rules(&self, kind: RuleKind, query: &RuleQuery) -> Result<Vec<serde_json::Value>, ApiError> {
        self.get(kind.path(), query).await
    }

    pub async fn rule_detail(&self, kind: RuleKind, id: &str) -> Result<serde_json::Value, ApiError> {
        self.get(&format!("{}/{}", kind.path(), id), NO_QUERY).await
    }

    pub async fn create_rule(&self, kind: RuleKind, rule: &serde_json::Value) -> Result<bool, ApiError> {
        self.send_json(Method::POST, kind.path(), Some(rule)).await
    }

    pub async fn update_rule(&self, kind: RuleKind, id: &str, rule: &serde_json::Value) -> Result<bool, ApiError> {
        self.send_json(Method::PUT, &format!("{}/{}", kind.path(), id), Some(rule))
            .await
    }

    pub async fn delete_rule(&self, kind: RuleKind, id: &str) -> Result<bool, ApiError> {
        self.send_json(Method::DELETE, &format!("{}/{}", kind.path(), id), None::<&()>)
            .await
    }

    pub async fn enable_rule(&self, kind: RuleKind, id: &str) -> Result<bool, ApiError> {
        self.send_json(Method::PUT, &format!("{}/enable/{}", kind.path(), id), None::<&()>)
            .await
    }

    pub async fn disable_rule(&self, kind: RuleKind, id: &str) -> Result<bool, ApiError> {
        self.send_json(Method::PUT, &format!("{}/disable/{}", kind.path(), id), None::<&()>)
            .await
    }
}
