//! SokoCamp Marketplace library.
//!
//! Client-held state for the campus marketplace front end: the cart
//! container with durable persistence, the catalog filter/sort/paginate
//! pipeline, the session/identity container, the language container, the
//! WhatsApp checkout relay, and the FAQ chatbot.
//!
//! # Architecture
//!
//! - All persistence, querying, and auth are delegated to a document
//!   backend behind the [`backend::Backend`] trait; this crate only owns
//!   UI-facing state and the invariants that survive reloads and sign-outs.
//! - Containers are constructed once (see [`state::AppState`]) and shared
//!   by cheap clone; cross-container signals travel over [`bus::EventBus`],
//!   with the durable key-value write as a side effect of the broadcast.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod backend;
pub mod bus;
pub mod cart;
pub mod catalog;
pub mod chatbot;
pub mod checkout;
pub mod config;
pub mod error;
pub mod i18n;
pub mod notify;
pub mod session;
pub mod state;
pub mod storage;
pub mod telemetry;
