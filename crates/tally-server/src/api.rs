// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router construction and shared application state.

use std::sync::Arc;

use axum::{
	extract::DefaultBodyLimit,
	http::HeaderName,
	middleware::from_fn_with_state,
	routing::{get, put},
	Router,
};
use tally_server_auth::{Authorizer, DEFAULT_CREDENTIAL_HEADER};
use tally_server_db::EntityStore;

use crate::auth_middleware::{authenticate_layer, authorize_layer};
use crate::routes;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub decisions: Arc<dyn Authorizer>,
	pub store: Arc<dyn EntityStore>,
	pub credential_header: HeaderName,
}

impl AppState {
	/// State reading credentials from the default `user` header.
	pub fn new(decisions: Arc<dyn Authorizer>, store: Arc<dyn EntityStore>) -> Self {
		Self {
			decisions,
			store,
			credential_header: HeaderName::from_static(DEFAULT_CREDENTIAL_HEADER),
		}
	}

	pub fn with_credential_header(mut self, header: HeaderName) -> Self {
		self.credential_header = header;
		self
	}
}

/// Create the router with authentication and route-level authorization
/// wrapped around every route, the fallback included.
///
/// Layer order (outermost first): authenticate, authorize, handler.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/", get(routes::hello::hello))
		.route("/whoami", get(routes::whoami::whoami))
		.route("/expenses/submit", put(routes::expenses::submit_expense))
		.route("/expenses/{id}", get(routes::expenses::get_expense))
		.route(
			"/organizations/{id}",
			get(routes::organizations::get_organization),
		)
		.fallback(routes::not_found)
		.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
		.layer(authorize_layer(Arc::clone(&state.decisions)))
		.layer(from_fn_with_state(state.clone(), authenticate_layer))
		.with_state(state)
}
