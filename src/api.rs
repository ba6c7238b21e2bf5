// API client module: a small blocking HTTP client for the BHIV backend.
// Every operation sends exactly one request and hands back a typed view of
// the JSON body. There is no retry and no hidden session state: `login`
// returns a `Session` and the caller passes it to the authenticated calls.

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    AuthResponse, GenerateRequest, GenerationResult, PreviewResult, RefreshRequest, SwitchRequest,
    SwitchResult,
};
use crate::session::{Session, TokenStore};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the static application key (`X-API-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Backend routes used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Refresh,
    Generate,
    Switch,
    Preview,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/api/v1/auth/login",
            Endpoint::Refresh => "/api/v1/auth/refresh",
            Endpoint::Generate => "/api/v1/generate",
            Endpoint::Switch => "/api/v1/switch",
            Endpoint::Preview => "/api/v1/vr/preview",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Refresh => "refresh",
            Endpoint::Generate => "generate",
            Endpoint::Switch => "switch",
            Endpoint::Preview => "preview",
        }
    }
}

/// Outcome of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct Login {
    pub session: Session,
    pub response: AuthResponse,
    /// Whether the token made it into the token store.
    pub persisted: bool,
}

/// Blocking client holding the base URL, the API key (as a default header)
/// and the store the session token is mirrored to.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token_store: TokenStore,
}

impl ApiClient {
    /// Create an ApiClient from the config file and `BHIV_*` environment
    /// variables. See [`ClientConfig::load`].
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ClientConfig::load()?;
        Ok(Self::new(&config)?)
    }

    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|_| ApiError::InvalidHeader {
            name: API_KEY_HEADER,
        })?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ApiError::ClientBuild)?;

        let token_store = match &config.token_dir {
            Some(dir) => TokenStore::in_dir(dir),
            None => TokenStore::default_location(),
        };

        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Authorization header for an authenticated call.
    fn bearer(session: &Session) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", session.token()))
            .map_err(|_| ApiError::InvalidHeader {
                name: "Authorization",
            })?;
        value.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    /// Exchange credentials for a session. The token is mirrored to the
    /// token store; a store failure is logged and reported through
    /// `Login::persisted` but does not fail the login. A body without
    /// `access_token` is rejected and nothing is persisted.
    pub fn login(&self, username: &str, password: &str) -> Result<Login> {
        let req = self
            .client
            .post(self.url(Endpoint::Login))
            .form(&[("username", username), ("password", password)]);
        let response: AuthResponse = self.send(Endpoint::Login, req)?;
        self.establish(response)
    }

    /// Trade a refresh token from an earlier login for a new session.
    pub fn refresh(&self, refresh_token: &str) -> Result<Login> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let req = self.client.post(self.url(Endpoint::Refresh)).json(&body);
        let response: AuthResponse = self.send(Endpoint::Refresh, req)?;
        self.establish(response)
    }

    /// Generate a spec from a prompt. The mobile rendering flags are always
    /// added to `context`, overriding any caller value for them.
    pub fn generate(
        &self,
        session: &Session,
        prompt: &str,
        context: Option<Map<String, Value>>,
    ) -> Result<GenerationResult> {
        let body = GenerateRequest::new(prompt, context);
        let req = self
            .client
            .post(self.url(Endpoint::Generate))
            .headers(Self::bearer(session)?)
            .json(&body);
        self.send(Endpoint::Generate, req)
    }

    /// Change the material (and optionally properties) of one object.
    pub fn switch(
        &self,
        session: &Session,
        spec_id: &str,
        object_id: &str,
        material: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<SwitchResult> {
        let body = SwitchRequest::new(spec_id, object_id, material, properties);
        let req = self
            .client
            .post(self.url(Endpoint::Switch))
            .headers(Self::bearer(session)?)
            .json(&body);
        self.send(Endpoint::Switch, req)
    }

    pub fn get_preview(&self, session: &Session, spec_id: &str) -> Result<PreviewResult> {
        let req = self
            .client
            .get(self.url(Endpoint::Preview))
            .headers(Self::bearer(session)?)
            .query(&[("spec_id", spec_id)]);
        self.send(Endpoint::Preview, req)
    }

    fn establish(&self, response: AuthResponse) -> Result<Login> {
        let session = Session::new(response.access_token.clone());
        let persisted = match self.token_store.save(&session) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "session token not persisted");
                false
            }
        };
        Ok(Login {
            session,
            response,
            persisted,
        })
    }

    /// Send the request and decode the body. Non-2xx statuses become
    /// `ApiError::Status`; undecodable 2xx bodies become `MalformedResponse`.
    fn send<T: DeserializeOwned>(&self, endpoint: Endpoint, req: RequestBuilder) -> Result<T> {
        let name = endpoint.name();
        debug!(endpoint = name, path = endpoint.path(), "sending request");

        let res = req.send().map_err(|source| ApiError::Transport {
            endpoint: name,
            source,
        })?;
        let status = res.status();
        let body = res.text().map_err(|source| ApiError::Transport {
            endpoint: name,
            source,
        })?;

        if !status.is_success() {
            warn!(endpoint = name, %status, "backend returned an error status");
            return Err(ApiError::Status {
                endpoint: name,
                status,
                detail: error_detail(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
            endpoint: name,
            reason: e.to_string(),
        })
    }
}

/// Human-readable reason from an error body: the backend's `detail` field
/// when present, otherwise the body text, otherwise the status reason.
fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        trimmed.to_string()
    }
}
