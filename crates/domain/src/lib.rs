//! # IndexPoll Domain
//!
//! Domain types shared by every IndexPoll crate.
//!
//! This crate contains:
//! - The polling error taxonomy and Result alias
//! - Configuration structures
//! - Default timing constants
//! - The query-fragment DSL used to build search bodies
//!
//! ## Architecture
//! - No dependencies on other IndexPoll crates
//! - Only external dependencies allowed
//! - Pure data structures and serializers

pub mod config;
pub mod constants;
pub mod errors;
pub mod query;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use query::{BoolQuery, ExistsQuery, MatchPhraseQuery, Query, TermQuery, TermsQuery};
