// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::{rejection::PathRejection, Path, State},
	Json,
};
use tally_server_auth::{OrgId, Organization, Resource};

use crate::{api::AppState, auth_middleware::CurrentActor, error::ServerError};

/// GET /organizations/{id} - visible to members of the organization.
#[tracing::instrument(skip_all)]
pub async fn get_organization(
	State(state): State<AppState>,
	CurrentActor(actor): CurrentActor,
	id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Organization>, ServerError> {
	let Path(id) = id.map_err(|_| ServerError::BadRequest("invalid organization ID".to_string()))?;

	let organization = state
		.store
		.organization_by_id(OrgId::new(id))
		.await?
		.ok_or_else(|| ServerError::NotFound("organization".to_string()))?;

	if !state.decisions.authorize(
		&actor,
		"read",
		&Resource::Organization(organization.clone()),
	) {
		tracing::info!(actor = %actor, org_id = %organization.id, "organization read denied");
		return Err(ServerError::Forbidden);
	}

	Ok(Json(organization))
}
