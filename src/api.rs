use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::session::Session;

/// How a request authenticates against the API.
#[derive(Debug, Clone, Default)]
pub enum AuthMode {
    /// Attach the session's access token when one is stored.
    #[default]
    Session,
    /// Send no Authorization header (login).
    None,
    /// Attach an explicit bearer token (refresh flow).
    Bearer(String),
}

/// Body attached to a request.
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Per-call options for [`ApiClient::request`].
#[derive(Default)]
pub struct RequestOptions {
    pub auth: AuthMode,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

/// HTTP wrapper shared by every resource service.
///
/// Owns the base URL, one connection pool and the injected [`Session`].
/// All response handling is centralized here: bodiless successes, JSON
/// decoding, error classification and the 401 session invalidation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("pet-manager-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                log::error!("failed to build HTTP client: {}", e);
                ApiError::unavailable()
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a call against the API and decodes the JSON answer.
    ///
    /// Resolves to `Ok(None)` for the recognized bodiless successes
    /// (status 204, 205 and 304, HEAD answers, empty bodies). Any other
    /// failure becomes an [`ApiError`]; a 401 additionally clears the
    /// session before the error is returned. No retries happen here.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        let url = self.endpoint_url(endpoint);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        match options.auth {
            AuthMode::Session => {
                if let Some(token) = self.session.access_token() {
                    builder = builder.bearer_auth(token);
                }
            }
            AuthMode::None => {}
            AuthMode::Bearer(token) => builder = builder.bearer_auth(token),
        }

        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        log::debug!("{} {}", method, url);
        let response = builder.send().await.map_err(|e| {
            log::error!("{} {} failed: {}", method, url, e);
            ApiError::unavailable()
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("{} {} answered 401, invalidating session", method, url);
            self.session.clear();
        }
        match status.as_u16() {
            204 | 205 | 304 => return Ok(None),
            code if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                log::error!("{} {} answered {}: {}", method, url, code, body);
                return Err(ApiError::from_status(code));
            }
            _ => {}
        }
        if method == Method::HEAD {
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| {
            log::error!("failed to read body from {}: {}", url, e);
            ApiError::unavailable()
        })?;
        if text.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::error!("invalid JSON from {}: {}", url, e);
                Err(ApiError::unavailable())
            }
        }
    }

    /// GET expecting a JSON body.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, RequestOptions::default())
            .await?
            .ok_or_else(|| Self::missing_body(endpoint))
    }

    /// GET with query parameters, preserving their order on the wire.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request(
            Method::GET,
            endpoint,
            RequestOptions {
                query,
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| Self::missing_body(endpoint))
    }

    /// Sends a JSON body and expects a JSON answer.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = Self::json_body(body, endpoint)?;
        self.request(
            method,
            endpoint,
            RequestOptions {
                body,
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| Self::missing_body(endpoint))
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, endpoint, body).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, endpoint, body).await
    }

    /// Bodiless POST (link endpoints).
    pub async fn post_empty(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(Method::POST, endpoint, RequestOptions::default())
            .await?;
        Ok(())
    }

    /// DELETE, accepting answers with or without a body.
    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(Method::DELETE, endpoint, RequestOptions::default())
            .await?;
        Ok(())
    }

    /// HEAD probe; a success never carries a body.
    pub async fn head(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request::<serde_json::Value>(Method::HEAD, endpoint, RequestOptions::default())
            .await?;
        Ok(())
    }

    /// POST of a multipart form. No content type is set here; the
    /// transport fills in the multipart boundary.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.request(
            Method::POST,
            endpoint,
            RequestOptions {
                body: RequestBody::Multipart(form),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| Self::missing_body(endpoint))
    }

    /// POST without attaching any stored credential (login).
    pub async fn post_unauthenticated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = Self::json_body(body, endpoint)?;
        self.request(
            Method::POST,
            endpoint,
            RequestOptions {
                auth: AuthMode::None,
                body,
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| Self::missing_body(endpoint))
    }

    /// Bodiless PUT carrying an explicit bearer token (refresh flow).
    pub async fn put_with_bearer<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        self.request(
            Method::PUT,
            endpoint,
            RequestOptions {
                auth: AuthMode::Bearer(token.to_string()),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| Self::missing_body(endpoint))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn json_body(body: &impl Serialize, endpoint: &str) -> Result<RequestBody, ApiError> {
        match serde_json::to_value(body) {
            Ok(value) => Ok(RequestBody::Json(value)),
            Err(e) => {
                log::error!("failed to serialize body for {}: {}", endpoint, e);
                Err(ApiError::unavailable())
            }
        }
    }

    fn missing_body(endpoint: &str) -> ApiError {
        log::error!("empty answer from {} where a JSON body was expected", endpoint);
        ApiError::unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::new(ApiConfig::new(base_url), Session::new()).unwrap()
    }

    #[test]
    fn test_endpoint_url_joins_with_single_slash() {
        let client = test_client("http://localhost:8080");
        assert_eq!(
            client.endpoint_url("/v1/pets"),
            "http://localhost:8080/v1/pets"
        );
        assert_eq!(
            client.endpoint_url("v1/pets"),
            "http://localhost:8080/v1/pets"
        );

        let slashed = test_client("http://localhost:8080/");
        assert_eq!(
            slashed.endpoint_url("/v1/pets"),
            "http://localhost:8080/v1/pets"
        );
    }

    #[test]
    fn test_default_options_use_session_auth() {
        let options = RequestOptions::default();
        assert!(matches!(options.auth, AuthMode::Session));
        assert!(options.query.is_empty());
        assert!(matches!(options.body, RequestBody::Empty));
    }
}
