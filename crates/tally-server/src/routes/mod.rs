// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers.

pub mod expenses;
pub mod hello;
pub mod organizations;
pub mod whoami;

use crate::error::ServerError;

/// Fallback for paths no route matches. Only reached when the policy
/// allowed the request through.
pub async fn not_found() -> ServerError {
	ServerError::NotFound("route".to_string())
}
