use std::fmt::{Display, Formatter};

use getset::Getters;
use nutype::nutype;
use serde::Deserialize;

pub mod auth_code_flow;

/// Client ID of the Minecraft launcher registration on login.live.com. It is
/// allowed to use the desktop redirect URI, so no local server is needed.
pub const MINECRAFT_LAUNCHER_CLIENT_ID: &str = "00000000402b5328";

/// Represents a Microsoft identity platform client ID.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(AsRef, Debug, Clone, PartialEq, Eq, Hash)
)]
pub struct MicrosoftClientId(String);

/// An error returned by login.live.com. It only ever fills in `error` and
/// `error_description`.
#[derive(Default, Debug, Clone, Deserialize, Getters)]
#[serde(default)]
#[getset(get = "pub")]
pub struct MicrosoftError {
    error: String,
    error_description: String,
}

impl MicrosoftError {
    /// Decodes an error body. Bodies that are not a JSON error object (HTML
    /// gateway pages, empty answers) are kept whole as the description.
    pub(crate) fn from_body(body: String) -> Self {
        serde_json::from_str(&body).unwrap_or(Self { error: String::new(), error_description: body })
    }
}

impl Display for MicrosoftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.error_description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_trimmed() {
        let client_id = MicrosoftClientId::try_new(" 00000000402b5328 \n").unwrap();
        assert_eq!(client_id.as_ref(), MINECRAFT_LAUNCHER_CLIENT_ID);
    }

    #[test]
    fn blank_client_id_is_rejected() {
        assert!(MicrosoftClientId::try_new("   ").is_err());
    }

    #[test]
    fn live_error_body_decodes_with_missing_fields() {
        let error: MicrosoftError = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"The provided value for the 'code' parameter is not valid."}"#,
        )
        .unwrap();
        assert_eq!(error.error(), "invalid_grant");
        assert_eq!(
            error.to_string(),
            "invalid_grant: The provided value for the 'code' parameter is not valid."
        );
    }

    #[test]
    fn html_error_body_is_kept_as_description() {
        let error = MicrosoftError::from_body("<html><body>502 Bad Gateway</body></html>".to_string());
        assert_eq!(error.error(), "");
        assert_eq!(error.error_description(), "<html><body>502 Bad Gateway</body></html>");
    }

    #[test]
    fn json_error_body_is_decoded() {
        let error = MicrosoftError::from_body(r#"{"error":"invalid_request","error_description":"bad"}"#.to_string());
        assert_eq!(error.error(), "invalid_request");
        assert_eq!(error.error_description(), "bad");
    }
}
