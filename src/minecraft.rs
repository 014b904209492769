use getset::{CopyGetters, Getters};
use nutype::nutype;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::endpoints::Endpoints;

/// Represents an error that can occur when authenticating with Minecraft.
#[derive(Error, Debug)]
pub enum MinecraftAuthorizationError {
    #[error("Http error: {0}: {1}")]
    Http(StatusCode, String),

    /// Xbox Live answered without a `DisplayClaims.xui[0].uhs` entry.
    #[error("Xbox Live response did not contain a user hash")]
    MissingUserHash,

    /// The name change was refused. `403` means the name is taken or the
    /// account cannot change its name yet, `429` means too many attempts.
    #[error("Name change to {0} refused: {1}: {2}")]
    NameChange(MinecraftName, StatusCode, String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// The response from Minecraft when attempting to authenticate with an xbox
/// token
#[derive(Deserialize, Debug, Getters, CopyGetters, Clone)]
pub struct MinecraftAuthenticationResponse {
    /// Some UUID of the account
    #[getset(get = "pub")]
    username: String,

    /// The minecraft JWT access token
    #[getset(get = "pub")]
    access_token: String,

    /// The type of access token
    #[getset(get = "pub")]
    token_type: String,

    /// How many seconds until the token expires
    #[getset(get_copy = "pub")]
    expires_in: u32,
}

/// An Xbox Live user token together with the user hash it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct XboxLiveToken {
    token: String,
    user_hash: String,
}

/// A Minecraft Java Edition player name: 3 to 16 letters, digits or
/// underscores.
#[nutype(
    sanitize(trim),
    validate(predicate = |name: &str| {
        (3..=16).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }),
    derive(AsRef, Debug, Clone, PartialEq, Eq, Hash, Display)
)]
pub struct MinecraftName(String);

/// The response from Xbox when authenticating with a Microsoft token
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct XboxLiveAuthenticationResponse {
    /// The xbox authentication token to use
    token: String,

    /// Looks like { "xui": [{"uhs": "user_hash"}] }
    display_claims: XboxDisplayClaims,
}

#[derive(Deserialize, Debug)]
struct XboxDisplayClaims {
    xui: Vec<XboxUserIdentity>,
}

#[derive(Deserialize, Debug)]
struct XboxUserIdentity {
    uhs: String,
}

/// Only the token of an XSTS answer is used; the user hash comes from the
/// Xbox Live step.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct XstsAuthorizationResponse {
    token: String,
}

/// The flow for authenticating with a Microsoft access token and getting a
/// Minecraft access token and profile.
///
/// Each step can be called on its own; [MinecraftAuthorizationFlow::exchange_microsoft_token]
/// runs the three token exchanges in order.
#[derive(Debug, Clone)]
pub struct MinecraftAuthorizationFlow {
    http_client: HttpClient,
    endpoints: Endpoints,
}

impl MinecraftAuthorizationFlow {
    /// Creates a new [MinecraftAuthorizationFlow].
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client, endpoints: Endpoints::default() }
    }

    /// Sends every request of this flow to `endpoints` instead of the live
    /// services.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Authenticates with Xbox Live using a Microsoft access token.
    #[instrument(skip_all)]
    pub async fn authenticate_xbox_live(
        &self, microsoft_access_token: &str,
    ) -> Result<XboxLiveToken, MinecraftAuthorizationError> {
        let xbox_authenticate_json = json!({
            "Properties": {
                "AuthMethod": "RPS",
                "SiteName": "user.auth.xboxlive.com",
                "RpsTicket": format!("d={microsoft_access_token}")
            },
            "RelyingParty": "http://auth.xboxlive.com",
            "TokenType": "JWT"
        });

        debug!(url = %self.endpoints.xbox_user_authenticate(), "authenticating with Xbox Live");
        let response = self
            .http_client
            .post(self.endpoints.xbox_user_authenticate())
            .json(&xbox_authenticate_json)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let xbox_resp: XboxLiveAuthenticationResponse = response.json().await?;

        let user_hash = xbox_resp
            .display_claims
            .xui
            .into_iter()
            .next()
            .map(|identity| identity.uhs)
            .ok_or(MinecraftAuthorizationError::MissingUserHash)?;
        info!("received Xbox Live token");
        Ok(XboxLiveToken { token: xbox_resp.token, user_hash })
    }

    /// Trades an Xbox Live token for an XSTS token scoped to the Minecraft
    /// services.
    #[instrument(skip_all)]
    pub async fn authorize_xsts(&self, xbox_token: &str) -> Result<String, MinecraftAuthorizationError> {
        debug!(url = %self.endpoints.xbox_xsts_authorize(), "requesting XSTS token");
        let response = self
            .http_client
            .post(self.endpoints.xbox_xsts_authorize())
            .json(&json!({
                "Properties": {
                    "SandboxId": "RETAIL",
                    "UserTokens": [xbox_token]
                },
                "RelyingParty": "rp://api.minecraftservices.com/",
                "TokenType": "JWT"
            }))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let xsts_resp: XstsAuthorizationResponse = response.json().await?;
        info!("received XSTS token");
        Ok(xsts_resp.token)
    }

    /// Logs into the Minecraft services with an XSTS token and the user hash
    /// of the Xbox Live account.
    #[instrument(skip_all)]
    pub async fn login_with_xbox(
        &self, user_hash: &str, xsts_token: &str,
    ) -> Result<MinecraftAuthenticationResponse, MinecraftAuthorizationError> {
        debug!(url = %self.endpoints.minecraft_login_with_xbox(), "logging into Minecraft");
        let response = self
            .http_client
            .post(self.endpoints.minecraft_login_with_xbox())
            .json(&json!({
                "identityToken": identity_token(user_hash, xsts_token)
            }))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let minecraft_resp: MinecraftAuthenticationResponse = response.json().await?;
        info!(expires_in = minecraft_resp.expires_in, "received Minecraft access token");
        Ok(minecraft_resp)
    }

    /// Authenticates with Xbox Live using the given Microsoft access token and
    /// returns a [MinecraftAuthenticationResponse] that contains the Minecraft
    /// access token.
    pub async fn exchange_microsoft_token(
        &self, microsoft_access_token: &str,
    ) -> Result<MinecraftAuthenticationResponse, MinecraftAuthorizationError> {
        let xbox_token = self.authenticate_xbox_live(microsoft_access_token).await?;
        let xsts_token = self.authorize_xsts(xbox_token.token()).await?;
        self.login_with_xbox(xbox_token.user_hash(), &xsts_token).await
    }

    /// Fetches the profile of the account that owns `minecraft_access_token`.
    ///
    /// The JSON body is returned as sent, every field included. Accounts that
    /// do not own the game have no profile and get an
    /// [MinecraftAuthorizationError::Http] with status 404.
    #[instrument(skip_all)]
    pub async fn profile(&self, minecraft_access_token: &str) -> Result<Value, MinecraftAuthorizationError> {
        debug!(url = %self.endpoints.minecraft_profile(), "fetching Minecraft profile");
        let response = self
            .http_client
            .get(self.endpoints.minecraft_profile())
            .bearer_auth(minecraft_access_token)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let profile: Value = response.json().await?;
        info!("received Minecraft profile");
        Ok(profile)
    }

    /// Changes the name of the profile owned by `minecraft_access_token` and
    /// returns the updated profile body.
    #[instrument(skip(self, minecraft_access_token))]
    pub async fn change_name(
        &self, minecraft_access_token: &str, name: &MinecraftName,
    ) -> Result<Value, MinecraftAuthorizationError> {
        let url = format!("{}/{name}", self.endpoints.minecraft_profile_name());
        debug!(%url, "changing Minecraft name");
        let response = self
            .http_client
            .put(&url)
            .bearer_auth(minecraft_access_token)
            .json(&json!({}))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(MinecraftAuthorizationError::NameChange(name.clone(), status, body));
        }
        let profile: Value = response.json().await?;
        info!("changed Minecraft name");
        Ok(profile)
    }
}

fn identity_token(user_hash: &str, xsts_token: &str) -> String {
    format!("XBL3.0 x={user_hash};{xsts_token}")
}

async fn error_for_status(response: Response) -> Result<Response, MinecraftAuthorizationError> {
    let status = response.status();
    if !status.is_success() {
        let response = response.text().await?;
        return Err(MinecraftAuthorizationError::Http(status, response));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_token_joins_user_hash_and_xsts_token() {
        assert_eq!(identity_token("UHS1", "XSTS1"), "XBL3.0 x=UHS1;XSTS1");
    }

    #[test]
    fn xbox_response_keeps_first_user_hash() {
        let response: XboxLiveAuthenticationResponse = serde_json::from_str(
            r#"{
                "IssueInstant": "2024-01-01T00:00:00.0000000Z",
                "NotAfter": "2024-01-15T00:00:00.0000000Z",
                "Token": "XBL1",
                "DisplayClaims": {"xui": [{"uhs": "UHS1"}, {"uhs": "UHS2"}]}
            }"#,
        )
        .unwrap();
        assert_eq!(response.token, "XBL1");
        assert_eq!(response.display_claims.xui[0].uhs, "UHS1");
    }

    #[test]
    fn player_names_follow_minecraft_rules() {
        assert_eq!(MinecraftName::try_new(" Notch ").unwrap().as_ref(), "Notch");
        assert!(MinecraftName::try_new("jeb_").is_ok());
        assert!(MinecraftName::try_new("ab").is_err());
        assert!(MinecraftName::try_new("seventeen_chars_x").is_err());
        assert!(MinecraftName::try_new("no/slash").is_err());
    }
}
