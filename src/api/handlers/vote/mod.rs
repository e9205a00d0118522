//! Public voting contest: tally listing, vote admission, and status checks.

pub mod admission;
pub mod fingerprint;
pub mod state;
pub mod storage;
pub mod tallies;
pub mod types;

pub use self::state::{VoteConfig, VoteState};
