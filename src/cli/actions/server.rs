use crate::api::{
    self,
    handlers::{auth::AuthConfig, vote::VoteConfig},
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub seed_secret: Option<SecretString>,
    pub frontend_base_url: String,
    pub contest_salt: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database is unreachable or the listener fails to bind.
pub async fn execute(args: Args) -> Result<()> {
    let mut auth_config = AuthConfig::new(args.frontend_base_url, args.jwt_secret);
    if let Some(seed_secret) = args.seed_secret {
        auth_config = auth_config.with_seed_secret(seed_secret);
    }

    let vote_config = VoteConfig::new(args.contest_salt);

    api::new(args.port, args.dsn, auth_config, vote_config).await
}
