//! This crate logs a Microsoft account into the Minecraft online services
//! starting from an OAuth2 authorization code that the user pastes in by hand.
//!
//! The chain is Microsoft → Xbox Live → XSTS → Minecraft: every step hands a
//! single token to the next one and nothing is kept around afterwards.
//!
//! # Example
//!
//! ```no_run
//! # use minecraft_msa_login::microsoft::{MicrosoftClientId, MINECRAFT_LAUNCHER_CLIENT_ID};
//! # use minecraft_msa_login::microsoft::auth_code_flow::{extract_code, MicrosoftAuthorizationCodeFlow};
//! # use minecraft_msa_login::MinecraftAuthorizationFlow;
//! # use reqwest::Client;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client_id = MicrosoftClientId::try_new(MINECRAFT_LAUNCHER_CLIENT_ID)?;
//! let ms_flow = MicrosoftAuthorizationCodeFlow::new(client_id, Client::new());
//! println!("Open this URL in your browser:\n{}", ms_flow.authorize_url()?);
//!
//! # let pasted = String::new();
//! let ms_token = ms_flow.exchange_code(&extract_code(&pasted)).await?;
//!
//! let mc_flow = MinecraftAuthorizationFlow::new(Client::new());
//! let mc_token = mc_flow.exchange_microsoft_token(ms_token.access_token()).await?;
//! let profile = mc_flow.profile(mc_token.access_token()).await?;
//! println!("logged in as {}", profile["name"]);
//! # Ok(())
//! # }
//! ```
use thiserror::Error;

pub mod endpoints;
pub mod microsoft;
pub mod minecraft;

pub use endpoints::Endpoints;
pub use microsoft::auth_code_flow::{AuthorizationCodeFlowError, MicrosoftAuthorizationCodeFlow};
pub use minecraft::{MinecraftAuthorizationError, MinecraftAuthorizationFlow, MinecraftName};

/// Any error raised along the login chain.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Microsoft(#[from] AuthorizationCodeFlowError),

    #[error(transparent)]
    Minecraft(#[from] MinecraftAuthorizationError),
}
