use std::sync::Arc;

use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::clients::auth::{Authorization, authorize};
use crate::config::{ClientConfig, Endpoints};
use crate::error::{ApiError, ApiErrorKind, Error, Result};

const USER_AGENT_VALUE: &str = concat!("rusty-gini/", env!("CARGO_PKG_VERSION"));
const USER_IDENTIFIER_HEADER: &str = "X-User-Identifier";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A client for the Gini document-intelligence API.
///
/// The client is cheap to clone: the HTTP connection pool, the verified
/// config and the authorization are shared between clones.
///
/// Example:
/// ```no_run
/// use rusty_gini::{ClientConfig, Credentials, GiniClient, UploadOptions};
///
/// # async fn run() -> rusty_gini::Result<()> {
/// let config = ClientConfig::new(Credentials::new("client-id", "client-secret"));
/// let client = GiniClient::connect(config).await?;
/// let doc = client
///     .upload_file("invoice.pdf", &UploadOptions::new("user-1234"))
///     .await?;
/// println!("{} is {}", doc.id, doc.progress);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GiniClient {
    http: Client,
    config: Arc<ClientConfig>,
    authorization: Arc<Authorization>,
}

impl GiniClient {
    /// Verify `config` and authenticate.
    ///
    /// With OAuth2 this exchanges the configured grant for an access token
    /// before returning.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with_client(config, Client::new()).await
    }

    /// Like [`GiniClient::connect`], with a preconfigured reqwest client
    /// (timeouts, proxies, TLS settings).
    pub async fn connect_with_client(config: ClientConfig, http: Client) -> Result<Self> {
        let config = config.verify()?;
        let authorization = authorize(&http, &config).await?;
        Ok(Self {
            http,
            config: Arc::new(config),
            authorization: Arc::new(authorization),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.config.endpoints
    }

    /// URL of the document with the given id
    pub fn document_url(&self, document_id: &str) -> String {
        format!("{}/documents/{}", self.config.endpoints.api, document_id)
    }

    fn default_accept(&self) -> String {
        format!("application/vnd.gini.{}+json", self.config.api_version)
    }

    /// Build an authenticated request with the default `Accept` header.
    pub(crate) fn request(
        &self,
        method: Method,
        url: &str,
        user_identifier: &str,
    ) -> Result<RequestBuilder> {
        let accept = self.default_accept();
        self.request_accepting(method, url, &accept, user_identifier)
    }

    pub(crate) fn request_accepting(
        &self,
        method: Method,
        url: &str,
        accept: &str,
        user_identifier: &str,
    ) -> Result<RequestBuilder> {
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, USER_AGENT_VALUE);

        if self.config.uses_basic_auth() {
            if user_identifier.is_empty() {
                return Err(Error::MissingUserIdentifier);
            }
            builder = builder.header(USER_IDENTIFIER_HEADER, user_identifier);
        }

        self.authorization.apply(builder)
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        debug!(
            method = %request.method(),
            url = %request.url(),
            "Sending API request"
        );

        let response = self.http.execute(request).await?;
        debug!(
            status_code = response.status().as_u16(),
            request_id = request_id(&response).unwrap_or_default(),
            url = %response.url(),
            "Received API response"
        );
        Ok(response)
    }
}

/// Fail with an [`ApiError`] unless `response` has the `expected` status.
pub(crate) fn expect_status(
    response: &Response,
    expected: StatusCode,
    kind: ApiErrorKind,
    document_id: Option<&str>,
) -> Result<()> {
    if response.status() == expected {
        return Ok(());
    }
    Err(api_error(response, kind, document_id))
}

pub(crate) fn api_error(
    response: &Response,
    kind: ApiErrorKind,
    document_id: Option<&str>,
) -> Error {
    Error::Api(ApiError {
        kind,
        status: response.status().as_u16(),
        request_id: request_id(response).map(str::to_string),
        document_id: document_id.filter(|id| !id.is_empty()).map(str::to_string),
    })
}

/// Read the whole body and parse it as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn request_id(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}
