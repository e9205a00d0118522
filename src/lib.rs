//! # Hala (Event Registration & Voting API)
//!
//! `hala` is the backend for a bilingual event-promotion site: marathon
//! participant registration, an admin dashboard, and a public voting
//! contest for "best content creator".
//!
//! ## Vote admission
//!
//! Each physical device may cast at most one vote per contest. The client
//! submits an opaque, high-entropy fingerprint; the server never stores it
//! raw. Instead it stores `SHA256(fingerprint + "-" + ip + "-" + salt)` and
//! relies on a database UNIQUE constraint over that hash, so concurrent
//! duplicates lose at the storage layer rather than racing application
//! checks.
//!
//! ## Admin sessions
//!
//! Administrators authenticate with username/password (bcrypt, cost 12)
//! behind a sliding-window login throttle with exponential lockout
//! extension. Sessions are short-lived HS256 access tokens plus a
//! refresh token scoped to the refresh endpoint, both carried in
//! `HttpOnly`/`SameSite=Strict` cookies.
//!
//! ## Roles
//!
//! `super_admin` > `admin` > `moderator`. Mutating entrant endpoints
//! require `admin` or above; deletion requires `super_admin`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
