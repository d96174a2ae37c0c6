#![forbid(unsafe_code)]

//! chat_hud — a recent-event HUD for chat streams.
//!
//! The HUD mirrors the newest entry of an append-only chat feed, keeps a
//! bounded navigation history the user can page through, and fades itself
//! out after a configurable dwell time unless the pointer is over it.
//!
//! The crate is host-agnostic: the chat backend, the renderer, and roll
//! evaluation are traits the host implements ([`event::EventSource`],
//! [`event::ContentRenderer`], [`dice::RollEvaluator`]); reference
//! implementations ship for tests, demos, and simple embeddings. An
//! optional crossterm surface lives behind the `term` feature.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use chat_hud::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use chat_hud::core::config::Config;
//! use chat_hud::hud::{HistoryBuffer, Navigator};
//! ```

pub mod prelude;

pub mod core;
pub mod dice;
pub mod event;
pub mod hud;
pub mod notify;
pub mod placement;
pub mod runtime;
pub mod settings;
pub mod sidebar;
#[cfg(feature = "term")]
pub mod term;
