use minecraft_msa_login::microsoft::auth_code_flow::{extract_code, MicrosoftAuthorizationCodeFlow};
use minecraft_msa_login::microsoft::{MicrosoftClientId, MINECRAFT_LAUNCHER_CLIENT_ID};
use minecraft_msa_login::{Error, MinecraftAuthorizationFlow};
use reqwest::Client;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let client_id = MicrosoftClientId::try_new(MINECRAFT_LAUNCHER_CLIENT_ID)?;
    let http_client = Client::new();
    let ms_flow = MicrosoftAuthorizationCodeFlow::new(client_id, http_client.clone());
    let mc_flow = MinecraftAuthorizationFlow::new(http_client);

    let authorize_url = ms_flow.authorize_url()?;
    println!("Open this URL in your browser and sign in:\n\n{authorize_url}\n");
    if let Err(err) = webbrowser::open(authorize_url.as_str()) {
        warn!(error = %err, "could not open a browser, open the URL by hand");
    }

    let code = prompt_code().await?;
    let profile = login(&ms_flow, &mc_flow, &code).await?;

    println!("\nYour Minecraft profile:");
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

async fn prompt_code() -> std::io::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(
            b"Paste the redirect URL, or the code it contains \
              (https://login.live.com/oauth20_desktop.srf?code=THE_CODE&lc=1036):\n> ",
        )
        .await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(extract_code(&line))
}

async fn login(
    ms_flow: &MicrosoftAuthorizationCodeFlow, mc_flow: &MinecraftAuthorizationFlow, code: &str,
) -> Result<Value, Error> {
    println!("\nExchanging code for a Microsoft access token...");
    let ms_token = ms_flow.exchange_code(code).await?;

    println!("Xbox Live authentication...");
    let xbox_token = mc_flow.authenticate_xbox_live(ms_token.access_token()).await?;

    println!("XSTS authorization...");
    let xsts_token = mc_flow.authorize_xsts(xbox_token.token()).await?;

    println!("Minecraft authentication...");
    let mc_token = mc_flow.login_with_xbox(xbox_token.user_hash(), &xsts_token).await?;

    println!("\nYour Minecraft access token:");
    println!("{}", mc_token.access_token());

    Ok(mc_flow.profile(mc_token.access_token()).await?)
}
