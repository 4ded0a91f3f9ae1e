//! SokoCamp Core - Shared types library.
//!
//! This crate provides common types used across all SokoCamp components:
//! - `marketplace` - Cart, catalog, session, and chatbot state containers
//! - `integration-tests` - Cross-container scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles,
//!   statuses, and UI languages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
