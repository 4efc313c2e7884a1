use crate::auth::AuthConfig;
use crate::cli::actions::Action;
use crate::spuro;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            base_url,
        } => {
            // Fail early on malformed connection strings instead of at pool setup
            Url::parse(&dsn).context("Invalid database connection string")?;
            Url::parse(&base_url).context("Invalid base URL")?;

            let config = AuthConfig::new(base_url);

            spuro::new(port, dsn, config).await?;
        }
    }

    Ok(())
}
