use reqwest::{
    Client, RequestBuilder,
    header::{ACCEPT, AUTHORIZATION, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use crate::clients::base::{api_error, read_json};
use crate::config::{AuthScheme, ClientConfig, OAuthGrant};
use crate::error::{ApiErrorKind, Result};

/// Credentials attached to every API request.
pub(crate) enum Authorization {
    Basic {
        client_id: String,
        client_secret: SecretString,
    },
    Bearer(SecretString),
}

impl Authorization {
    pub(crate) fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Authorization::Basic {
                client_id,
                client_secret,
            } => Ok(builder.basic_auth(client_id, Some(client_secret.expose_secret()))),
            Authorization::Bearer(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
                value.set_sensitive(true);
                Ok(builder.header(AUTHORIZATION, value))
            }
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Resolve the authorization for `config`, exchanging an OAuth2 grant for a
/// token when needed.
pub(crate) async fn authorize(http: &Client, config: &ClientConfig) -> Result<Authorization> {
    match &config.auth {
        AuthScheme::BasicAuth => Ok(Authorization::Basic {
            client_id: config.credentials.client_id.clone(),
            client_secret: config.credentials.client_secret.clone(),
        }),
        AuthScheme::OAuth2(grant) => {
            let token = exchange_token(http, config, grant).await?;
            Ok(Authorization::Bearer(token))
        }
    }
}

async fn exchange_token(
    http: &Client,
    config: &ClientConfig,
    grant: &OAuthGrant,
) -> Result<SecretString> {
    let token_url = format!("{}/oauth/token", config.endpoints.user_center);

    let (kind, mut form) = match grant {
        OAuthGrant::Password { username, password } => (
            ApiErrorKind::OauthCredentials,
            vec![
                ("grant_type", "password".to_string()),
                ("username", username.clone()),
                ("password", password.expose_secret().to_string()),
            ],
        ),
        OAuthGrant::AuthCode(code) => (
            ApiErrorKind::OauthAuthCodeExchange,
            vec![
                ("grant_type", "authorization_code".to_string()),
                ("code", code.expose_secret().to_string()),
            ],
        ),
    };
    if !config.scopes.is_empty() {
        form.push(("scope", config.scopes.join(" ")));
    }

    let response = http
        .post(&token_url)
        .basic_auth(
            &config.credentials.client_id,
            Some(config.credentials.client_secret.expose_secret()),
        )
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(api_error(&response, kind, None));
    }

    let token: TokenResponse = read_json(response).await?;
    info!(
        token_type = token.token_type.as_deref().unwrap_or("bearer"),
        expires_in = token.expires_in.unwrap_or_default(),
        "Obtained OAuth2 access token"
    );

    Ok(SecretString::from(token.access_token))
}
