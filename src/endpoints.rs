use getset::Getters;

const MICROSOFT_AUTHORIZE: &str = "https://login.live.com/oauth20_authorize.srf";
const MICROSOFT_TOKEN: &str = "https://login.live.com/oauth20_token.srf";
const XBOX_USER_AUTHENTICATE: &str = "https://user.auth.xboxlive.com/user/authenticate";
const XBOX_XSTS_AUTHORIZE: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
const MINECRAFT_LOGIN_WITH_XBOX: &str = "https://api.minecraftservices.com/authentication/login_with_xbox";
const MINECRAFT_PROFILE: &str = "https://api.minecraftservices.com/minecraft/profile";
const MINECRAFT_PROFILE_NAME: &str = "https://api.minecraftservices.com/minecraft/profile/name";

/// The URLs every step of the login chain talks to.
///
/// [Endpoints::default] points at the live Microsoft, Xbox and Minecraft
/// services. [Endpoints::rooted_at] keeps the paths but sends every request to
/// a single host, which is how the chain is run against a local mock server.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct Endpoints {
    microsoft_authorize: String,
    microsoft_token: String,
    xbox_user_authenticate: String,
    xbox_xsts_authorize: String,
    minecraft_login_with_xbox: String,
    minecraft_profile: String,
    /// Base of the name change endpoint; the new name is appended as a path
    /// segment.
    minecraft_profile_name: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            microsoft_authorize: MICROSOFT_AUTHORIZE.to_string(),
            microsoft_token: MICROSOFT_TOKEN.to_string(),
            xbox_user_authenticate: XBOX_USER_AUTHENTICATE.to_string(),
            xbox_xsts_authorize: XBOX_XSTS_AUTHORIZE.to_string(),
            minecraft_login_with_xbox: MINECRAFT_LOGIN_WITH_XBOX.to_string(),
            minecraft_profile: MINECRAFT_PROFILE.to_string(),
            minecraft_profile_name: MINECRAFT_PROFILE_NAME.to_string(),
        }
    }
}

impl Endpoints {
    /// Rewrites every endpoint so it is served from `base`, keeping the
    /// original path. `base` may or may not end with a slash.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            microsoft_authorize: format!("{base}/oauth20_authorize.srf"),
            microsoft_token: format!("{base}/oauth20_token.srf"),
            xbox_user_authenticate: format!("{base}/user/authenticate"),
            xbox_xsts_authorize: format!("{base}/xsts/authorize"),
            minecraft_login_with_xbox: format!("{base}/authentication/login_with_xbox"),
            minecraft_profile: format!("{base}/minecraft/profile"),
            minecraft_profile_name: format!("{base}/minecraft/profile/name"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_live_services() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.microsoft_token(), "https://login.live.com/oauth20_token.srf");
        assert_eq!(
            endpoints.minecraft_profile(),
            "https://api.minecraftservices.com/minecraft/profile"
        );
    }

    #[test]
    fn rooted_at_keeps_paths_and_drops_trailing_slash() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:9000/");
        assert_eq!(endpoints.xbox_user_authenticate(), "http://127.0.0.1:9000/user/authenticate");
        assert_eq!(endpoints.xbox_xsts_authorize(), "http://127.0.0.1:9000/xsts/authorize");
        assert_eq!(
            endpoints.minecraft_login_with_xbox(),
            "http://127.0.0.1:9000/authentication/login_with_xbox"
        );
    }
}
