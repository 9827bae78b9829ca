//! Database layer
//!
//! This module provides SQLite-backed persistence for the Seedling CMS:
//! - Connection pool creation (`pool`)
//! - Code-embedded schema migrations (`migrations`)
//! - Per-entity repositories (`repositories`)
//!
//! The second storage backend, the in-memory map-backed store, lives in
//! `repositories::memory` and implements the same repository traits.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
