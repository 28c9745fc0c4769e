//! # Keeper CLI
//!
//! Command-line client for the Keeper secret vault.
//!
//! Signs in over either the REST or the RPC transport and stores, fetches and
//! deletes cards, login/password pairs, texts and binary blobs.

pub mod api;
pub mod commands;
pub mod config;
pub mod utils;

pub use utils::error::{KeeperError, KeeperResult};
