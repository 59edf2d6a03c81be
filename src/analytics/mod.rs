//! The aggregation engine.
//!
//! Each submodule owns one section of a scouting profile and reads the
//! match database through parametrized SQL. All derived numbers (win
//! rates, ratios, distributions) are computed here rather than in
//! database views, so the rounding and zero-sample policy lives in
//! exactly one place ([`rates`]).

pub mod compositions;
pub mod head_to_head;
pub mod overview;
pub mod pistols;
pub mod players;
pub mod profile;
pub mod rates;
pub mod rounds;
pub mod weakness;
pub mod weapons;
mod window;

pub use profile::build_profile;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by profile assembly.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("team not found: {0}")]
    TeamNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Title-cases each whitespace-separated word. Map and agent names are
/// stored lowercase; reports and findings show them capitalized.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ascent"), "Ascent");
        assert_eq!(title_case("lotus"), "Lotus");
        assert_eq!(title_case("the range"), "The Range");
        assert_eq!(title_case(""), "");
    }
}
