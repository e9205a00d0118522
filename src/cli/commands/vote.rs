//! Voting contest CLI arguments.

use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_CONTEST_SALT: &str = "contest-salt";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CONTEST_SALT)
            .long(ARG_CONTEST_SALT)
            .help("Fixed salt mixed into device fingerprint hashes")
            .long_help(
                "Fixed salt mixed into device fingerprint hashes. Namespaces \
                 this contest's vote ledger from unrelated uses of the same \
                 fingerprint value; changing it resets who has voted.",
            )
            .default_value("hala-baghdad-vote")
            .env("HALA_CONTEST_SALT"),
    )
}

pub struct Options {
    pub contest_salt: String,
}

impl Options {
    /// # Errors
    /// Returns an error if required arguments are missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let contest_salt = matches
            .get_one::<String>(ARG_CONTEST_SALT)
            .cloned()
            .context("missing required argument: --contest-salt")?;

        Ok(Self { contest_salt })
    }
}
