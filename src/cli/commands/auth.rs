//! Session and admin-auth related CLI arguments.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_SEED_SECRET: &str = "seed-secret";
pub const ARG_FRONTEND_URL: &str = "frontend-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Symmetric secret used to sign access and refresh tokens")
                .env("HALA_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SEED_SECRET)
                .long(ARG_SEED_SECRET)
                .help("Shared secret gating the initial super_admin seed endpoint")
                .long_help(
                    "Shared secret gating the initial super_admin seed endpoint. \
                     When unset the seed endpoint always responds 403.",
                )
                .env("HALA_SEED_SECRET"),
        )
        .arg(
            Arg::new(ARG_FRONTEND_URL)
                .long(ARG_FRONTEND_URL)
                .help("Frontend base URL, used for CORS and cookie security")
                .default_value("http://localhost:3000")
                .env("HALA_FRONTEND_URL"),
        )
}

pub struct Options {
    pub jwt_secret: SecretString,
    pub seed_secret: Option<SecretString>,
    pub frontend_base_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        let seed_secret = matches.get_one::<String>(ARG_SEED_SECRET).cloned();

        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_URL)
            .cloned()
            .context("missing required argument: --frontend-url")?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            seed_secret: seed_secret.map(SecretString::from),
            frontend_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn base_args() -> Vec<&'static str> {
        vec!["hala", "--dsn", "postgres://localhost/hala"]
    }

    #[test]
    fn parses_required_jwt_secret() {
        temp_env::with_vars([("HALA_SEED_SECRET", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let mut args = base_args();
            args.extend(["--jwt-secret", "s3cret"]);
            let matches = command.get_matches_from(args);
            let options = Options::parse(&matches).expect("options should parse");
            assert_eq!(options.jwt_secret.expose_secret(), "s3cret");
            assert!(options.seed_secret.is_none());
            assert_eq!(options.frontend_base_url, "http://localhost:3000");
        });
    }

    #[test]
    fn parses_optional_seed_secret_and_frontend() {
        let command = crate::cli::commands::new();
        let mut args = base_args();
        args.extend([
            "--jwt-secret",
            "s3cret",
            "--seed-secret",
            "seed",
            "--frontend-url",
            "https://hala-events.iq",
        ]);
        let matches = command.get_matches_from(args);
        let options = Options::parse(&matches).expect("options should parse");
        assert_eq!(
            options.seed_secret.map(|s| s.expose_secret().to_string()),
            Some("seed".to_string())
        );
        assert_eq!(options.frontend_base_url, "https://hala-events.iq");
    }
}
