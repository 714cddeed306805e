// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scoped authentication state shared by the HTTP middleware.
//!
//! # Authentication Flow
//!
//! ```text
//! Request → credential header → store lookup ─┬─ found     → Actor::User
//!                                             ├─ not found → Actor::Guest
//!                                             └─ error     → Actor::Guest
//! ```
//!
//! The resolved actor travels with the request as a [`RequestScope`]
//! extension. Credentials are emails; nothing else is read from the request.

use http::{HeaderMap, HeaderName};
use tracing::instrument;

use crate::model::{Actor, User};

/// Header carrying the caller's email when no other name is configured.
pub const DEFAULT_CREDENTIAL_HEADER: &str = "user";

/// Authentication result for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
	pub actor: Actor,
}

impl RequestScope {
	pub fn guest() -> Self {
		Self {
			actor: Actor::Guest,
		}
	}

	pub fn authenticated(user: User) -> Self {
		Self {
			actor: Actor::User(user),
		}
	}

	pub fn user(&self) -> Option<&User> {
		self.actor.user()
	}

	/// Require an authenticated user.
	pub fn require_user(&self) -> Result<&User, AuthRequired> {
		self.actor
			.user()
			.filter(|user| user.is_authenticated())
			.ok_or(AuthRequired)
	}
}

/// Returned when a handler needs an authenticated user and has a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

/// Read the credential from `header`. Blank values count as absent.
#[instrument(level = "trace", skip(headers), fields(header = %header))]
pub fn extract_credential(headers: &HeaderMap, header: &HeaderName) -> Option<String> {
	let value = headers.get(header)?.to_str().ok()?.trim();
	if value.is_empty() {
		None
	} else {
		Some(value.to_string())
	}
}
