// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tally server library.
//!
//! Exposes the router, application state and middleware so the binary and
//! the integration tests build the same stack.

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod policy;
pub mod routes;
pub mod version;

pub use api::{create_router, AppState, MAX_BODY_BYTES};
pub use auth_middleware::{authenticate_layer, authorize_layer, AuthorizeRequest, CurrentActor};
pub use error::{ErrorResponse, ServerError};
pub use policy::{load_decisions, load_policy_file, PolicyError};

pub use tally_server_db as db;
