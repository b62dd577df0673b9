//! Client configuration

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};
use crate::models::Credentials;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.gini.net";
pub const DEFAULT_USER_CENTER_ENDPOINT: &str = "https://user.gini.net";
pub const DEFAULT_API_VERSION: &str = "v1";

/// Base URLs of the API and the user center (OAuth2 token issuer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub api: String,
    pub user_center: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: DEFAULT_API_ENDPOINT.to_string(),
            user_center: DEFAULT_USER_CENTER_ENDPOINT.to_string(),
        }
    }
}

/// OAuth2 grant used to obtain an access token.
#[derive(Clone, Debug)]
pub enum OAuthGrant {
    Password {
        username: String,
        password: SecretString,
    },
    AuthCode(SecretString),
}

/// How requests are authenticated.
#[derive(Clone, Debug, Default)]
pub enum AuthScheme {
    /// Client credentials on every request plus an `X-User-Identifier` header
    #[default]
    BasicAuth,
    OAuth2(OAuthGrant),
}

/// Everything a [`GiniClient`](crate::GiniClient) needs to talk to the API.
///
/// The config is validated once by [`ClientConfig::verify`] and never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub auth: AuthScheme,
    pub endpoints: Endpoints,
    pub api_version: String,
    /// OAuth2 scopes, empty for all assigned scopes
    pub scopes: Vec<String>,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            auth: AuthScheme::default(),
            endpoints: Endpoints::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            scopes: Vec::new(),
        }
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Check the config and fill empty endpoints and version with defaults.
    pub fn verify(mut self) -> Result<Self> {
        if !self.credentials.is_complete() {
            return Err(Error::ConfigInvalid(
                "client id and client secret are required".to_string(),
            ));
        }

        if let AuthScheme::OAuth2(OAuthGrant::Password { username, password }) = &self.auth
            && (username.is_empty() || password.expose_secret().is_empty())
        {
            return Err(Error::MissingCredentials);
        }
        if let AuthScheme::OAuth2(OAuthGrant::AuthCode(code)) = &self.auth
            && code.expose_secret().is_empty()
        {
            return Err(Error::OAuthParametersMissing);
        }

        if self.api_version.is_empty() {
            self.api_version = DEFAULT_API_VERSION.to_string();
        }
        if self.endpoints.api.is_empty() {
            self.endpoints.api = DEFAULT_API_ENDPOINT.to_string();
        }
        if self.endpoints.user_center.is_empty() {
            self.endpoints.user_center = DEFAULT_USER_CENTER_ENDPOINT.to_string();
        }
        self.endpoints.api = self.endpoints.api.trim_end_matches('/').to_string();
        self.endpoints.user_center = self.endpoints.user_center.trim_end_matches('/').to_string();

        Ok(self)
    }

    pub(crate) fn uses_basic_auth(&self) -> bool {
        matches!(self.auth, AuthScheme::BasicAuth)
    }
}
