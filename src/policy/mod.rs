//! Policy Module
//!
//! Key derivation and bypass rules for cached requests.

mod engine;
mod key;
mod rules;


// Re-export public types
pub use engine::CachePolicy;
pub use key::CacheKey;
pub use rules::{BypassRule, KeyRule, Rule, VALUE_SEPARATOR};
