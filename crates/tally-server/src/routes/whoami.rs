// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::extract::State;

use crate::{api::AppState, auth_middleware::CurrentActor, error::ServerError};

/// GET /whoami - describe the caller, including their organization.
#[tracing::instrument(skip_all)]
pub async fn whoami(
	State(state): State<AppState>,
	current: CurrentActor,
) -> Result<String, ServerError> {
	let scope = current.into_scope();
	let Ok(user) = scope.require_user() else {
		return Ok("guest user".to_string());
	};

	let organization = state
		.store
		.organization_by_id(user.organization_id)
		.await?
		.ok_or_else(|| {
			ServerError::Internal(format!(
				"organization {} of user {} is missing",
				user.organization_id, user.id
			))
		})?;

	Ok(format!(
		"You are {}, the {} at {}",
		user.email, user.title, organization.name
	))
}
