//! Logic modules: resolution of logical names into concrete files.
//!
//! # Modules
//!
//! - `resolver`: ordered, first-match-wins lookup across candidate roots

pub mod resolver;
