// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Tally expense service.
//!
//! - `pool` - SQLite pool construction
//! - `migrations` - idempotent schema setup
//! - `entity` - [`EntityStore`] and its SQLite implementation
//! - `testing` - in-memory pools and fixtures for tests

pub mod entity;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod testing;

pub use entity::{EntityRepository, EntityStore};
pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
