use getset::{CopyGetters, Getters};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use super::{MicrosoftClientId, MicrosoftError};
use crate::endpoints::Endpoints;

/// Redirect URI registered for desktop clients. login.live.com shows a blank
/// page at this address and the code is left in the address bar.
pub const MICROSOFT_DESKTOP_REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";
const MICROSOFT_CODE_RESPONSE_TYPE: &str = "code";
const MICROSOFT_CODE_GRANT_TYPE: &str = "authorization_code";
const MICROSOFT_TOKEN_SCOPE: &str = "XboxLive.signin offline_access";

#[derive(Error, Debug)]
pub enum AuthorizationCodeFlowError {
    #[error("Microsoft API error: {0}: {1}")]
    MicrosoftHttp(StatusCode, MicrosoftError),

    #[error("Invalid authorize URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// Contains the response from the Microsoft identity platform when redeeming
/// an authorization code.
#[derive(Deserialize, Debug, Getters, CopyGetters, Clone)]
pub struct MicrosoftAuthenticationResponse {
    /// The type of token for authentication. login.live.com answers `bearer`.
    #[getset(get = "pub")]
    token_type: String,

    /// This lists the scopes in which the access token is valid for.
    #[serde(default)]
    #[getset(get = "pub")]
    scope: String,

    /// Number of seconds the included access token is valid for.
    #[getset(get_copy = "pub")]
    expires_in: u32,

    /// Issued for the scopes that were requested.
    #[getset(get = "pub")]
    access_token: String,

    /// Issued if the original scope parameter included offline_access.
    #[serde(default)]
    #[getset(get = "pub")]
    refresh_token: Option<String>,
}

/// Uses the [Authorization Code Flow] against login.live.com to obtain a
/// Microsoft access token. The user signs in on a web page and pastes the
/// code from the redirect back into the program.
///
/// [Authorization Code Flow]: https://learn.microsoft.com/en-us/azure/active-directory/develop/v2-oauth2-auth-code-flow
#[derive(Debug, Clone)]
pub struct MicrosoftAuthorizationCodeFlow {
    client_id: MicrosoftClientId,
    http_client: HttpClient,
    endpoints: Endpoints,
}

impl MicrosoftAuthorizationCodeFlow {
    /// Creates a new [MicrosoftAuthorizationCodeFlow] with the given client ID.
    pub fn new(client_id: MicrosoftClientId, http_client: HttpClient) -> Self {
        Self { client_id, http_client, endpoints: Endpoints::default() }
    }

    /// Sends every request of this flow to `endpoints` instead of the live
    /// services.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Builds the URL the user has to open to sign in.
    pub fn authorize_url(&self) -> Result<Url, AuthorizationCodeFlowError> {
        let url = Url::parse_with_params(
            self.endpoints.microsoft_authorize(),
            &[
                ("client_id", self.client_id.as_ref()),
                ("response_type", MICROSOFT_CODE_RESPONSE_TYPE),
                ("redirect_uri", MICROSOFT_DESKTOP_REDIRECT_URI),
                ("scope", MICROSOFT_TOKEN_SCOPE),
            ],
        )?;
        Ok(url)
    }

    /// Redeems an authorization code for a Microsoft access token.
    ///
    /// The code is sent as given; an invalid one is reported by Microsoft as
    /// [AuthorizationCodeFlowError::MicrosoftHttp].
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self, code: &str,
    ) -> Result<MicrosoftAuthenticationResponse, AuthorizationCodeFlowError> {
        debug!(url = %self.endpoints.microsoft_token(), "redeeming authorization code");
        let response = self
            .http_client
            .post(self.endpoints.microsoft_token())
            .form(&[
                ("client_id", self.client_id.as_ref()),
                ("redirect_uri", MICROSOFT_DESKTOP_REDIRECT_URI),
                ("grant_type", MICROSOFT_CODE_GRANT_TYPE),
                ("code", code),
            ])
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let response = response.json::<MicrosoftAuthenticationResponse>().await?;
        info!(expires_in = response.expires_in, "received Microsoft access token");
        Ok(response)
    }
}

/// Pulls the authorization code out of whatever the user pasted.
///
/// Accepts either the bare code or the whole redirect URL. Anything that is
/// not a URL with a `code` parameter is returned trimmed but otherwise as is.
pub fn extract_code(input: &str) -> String {
    let input = input.trim();
    Url::parse(input)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "code")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| input.to_string())
}

async fn error_for_status(response: Response) -> Result<Response, AuthorizationCodeFlowError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(AuthorizationCodeFlowError::MicrosoftHttp(status, MicrosoftError::from_body(body)));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microsoft::MINECRAFT_LAUNCHER_CLIENT_ID;

    fn flow() -> MicrosoftAuthorizationCodeFlow {
        let client_id = MicrosoftClientId::try_new(MINECRAFT_LAUNCHER_CLIENT_ID).unwrap();
        MicrosoftAuthorizationCodeFlow::new(client_id, HttpClient::new())
    }

    #[test]
    fn authorize_url_carries_client_redirect_and_scope() {
        let url = flow().authorize_url().unwrap();
        assert_eq!(url.host_str(), Some("login.live.com"));
        assert_eq!(url.path(), "/oauth20_authorize.srf");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "00000000402b5328".to_string()),
                ("response_type".to_string(), "code".to_string()),
                ("redirect_uri".to_string(), "https://login.live.com/oauth20_desktop.srf".to_string()),
                ("scope".to_string(), "XboxLive.signin offline_access".to_string()),
            ]
        );
    }

    #[test]
    fn authorize_url_follows_endpoints() {
        let url = flow()
            .with_endpoints(Endpoints::rooted_at("http://127.0.0.1:8114"))
            .authorize_url()
            .unwrap();
        assert!(url.as_str().starts_with("http://127.0.0.1:8114/oauth20_authorize.srf?client_id="));
    }

    #[test]
    fn extract_code_reads_redirect_url() {
        let pasted = "https://login.live.com/oauth20_desktop.srf?code=M.C507_BAY.2.U.abc-123&lc=1036";
        assert_eq!(extract_code(pasted), "M.C507_BAY.2.U.abc-123");
    }

    #[test]
    fn extract_code_passes_bare_code_through() {
        assert_eq!(extract_code("  M.C507_BAY.2.U.abc-123\n"), "M.C507_BAY.2.U.abc-123");
    }

    #[test]
    fn extract_code_keeps_urls_without_code() {
        let pasted = "https://login.live.com/oauth20_desktop.srf?error=access_denied";
        assert_eq!(extract_code(pasted), pasted);
    }
}
