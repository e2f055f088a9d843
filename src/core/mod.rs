//! # Core Application Logic
//!
//! This module contains Erica's chat logic.
//! It knows nothing about any specific UI technology or HTTP client.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Reply formatting     │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │ Transport  │
//!           │  Adapter   │              │  (reqwest) │
//!           │ (ratatui)  │              │            │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all chat state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`formatter`]: Splits a reply into paced bubbles
//! - [`options`]: Pulls numbered choices out of bot text
//! - [`links`]: Sanitizing and URL detection
//! - [`tab`]: The per-run tab id
//! - [`config`]: Settings and their override hierarchy

pub mod action;
pub mod config;
pub mod formatter;
pub mod links;
pub mod options;
pub mod state;
pub mod tab;
