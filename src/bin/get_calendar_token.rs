use gradesync::components::google_calendar::{run_consent_flow, OAuthClientConfig, TokenManager};
use gradesync::config::Config;
use gradesync::error::SyncResult;
use gradesync::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;
    authorize().await?;
    Ok(())
}

async fn authorize() -> SyncResult<()> {
    // Load configuration
    let config = Config::load()?;

    // Read the OAuth client registration
    let oauth = OAuthClientConfig::from_file(&config.credentials_path)?;
    let token_manager = TokenManager::new(&config.token_path, oauth, config.scopes.clone());

    // Always ask for fresh consent, replacing any stored token
    run_consent_flow(&token_manager, config.oauth_redirect_port).await?;

    println!("Token successfully saved to {}!", config.token_path.display());

    Ok(())
}
