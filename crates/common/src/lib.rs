//! Cinebook Common Library
//!
//! Shared domain types, random sampling and date-time normalization used by
//! the cinebook end-to-end suite.

pub mod datetime;
pub mod error;
pub mod random;
pub mod types;

// Re-export commonly used types
pub use datetime::{CanonicalDateTime, TemporalNormalizer, CANONICAL_PATTERN, INPUT_PATTERNS};
pub use error::{Error, Result};
pub use random::RandomSelector;
pub use types::*;

/// Cinebook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
