//! Core types for SokoCamp.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod language;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use language::Language;
pub use price::Price;
pub use status::*;
