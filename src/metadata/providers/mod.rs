//! Concrete title metadata provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`TitleProvider`](super::TitleProvider) trait.

pub mod jikan;

pub use jikan::JikanProvider;
