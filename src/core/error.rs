//! Configuration errors.
//!
//! All of these are fatal at initialization: a pipeline refuses to start
//! on a malformed pattern, a short prescale list, or an engine table that
//! leaves some condition word unmatched. Per-event processing has no
//! recoverable error path.

use thiserror::Error;

/// Error raised while building or validating a trigger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A condition pattern string contained a character outside
    /// `{0, 1, N, Y, x, X}` and whitespace.
    #[error("condition pattern {pattern:?}: unrecognized character {found:?}")]
    BadPatternChar { pattern: String, found: char },

    /// A condition pattern string did not contain exactly 8 tokens.
    #[error("condition pattern {pattern:?}: expected 8 tokens, found {count}")]
    BadPatternLength { pattern: String, count: usize },

    /// An engine table was built with no engines at all.
    #[error("engine table has no engines")]
    EmptyTable,

    /// The priority scan left some condition word without a matching
    /// engine. A well-formed table covers every word via don't-care
    /// catch-alls.
    #[error("engine table leaves condition word {word:#010b} unmatched")]
    UncoveredWord { word: u8 },

    /// A prescale or inhibit list is shorter than the engine list.
    #[error("{what} list has {got} entries, engine table defines {need}")]
    ListTooShort {
        what: &'static str,
        need: usize,
        got: usize,
    },

    /// More engines than the hardware supports counter slots for.
    #[error("{count} engines exceed the {limit} available counter slots")]
    TooManyEngines { count: usize, limit: usize },

    /// A shield-tile face code outside 0..=4.
    #[error("shield face code {code} is not a tile face")]
    BadFaceCode { code: u8 },
}
