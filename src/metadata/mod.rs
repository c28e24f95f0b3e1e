//! External title metadata system.
//!
//! This module defines a generic [`TitleProvider`] trait and the
//! [`TitleRecord`] type that let the resolver fetch canonical titles and
//! synonyms for an external numeric id without caring which service backs
//! the lookup.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - `providers` -- Concrete provider implementations (Jikan).

pub mod provider;
pub mod providers;

pub use provider::{TitleProvider, TitleRecord};
pub use providers::JikanProvider;
