// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expense submission and retrieval.

use axum::{
	body::Bytes,
	extract::{rejection::PathRejection, Path, State},
	response::Redirect,
	Json,
};
use serde::Deserialize;
use tally_server_auth::{Expense, ExpenseId, NewExpense, Resource};

use crate::{api::AppState, auth_middleware::CurrentActor, error::ServerError};

/// Body of `PUT /expenses/submit`. The owner always comes from the caller;
/// `user_id` is only parsed so it can be rejected.
#[derive(Debug, Deserialize)]
pub struct SubmitExpense {
	pub amount: i64,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub user_id: Option<i64>,
}

impl SubmitExpense {
	fn parse(body: &[u8]) -> Result<Self, ServerError> {
		let submission: SubmitExpense = serde_json::from_slice(body).map_err(|e| {
			tracing::debug!(error = %e, "expense body rejected");
			ServerError::BadRequest("failed to parse JSON".to_string())
		})?;
		if submission.user_id.is_some() {
			return Err(ServerError::BadRequest(
				"setting user ID for expense not allowed".to_string(),
			));
		}
		Ok(submission)
	}
}

/// PUT /expenses/submit - store an expense owned by the caller and redirect
/// to it.
#[tracing::instrument(skip_all)]
pub async fn submit_expense(
	State(state): State<AppState>,
	current: CurrentActor,
	body: Bytes,
) -> Result<Redirect, ServerError> {
	let scope = current.into_scope();
	let user = scope.require_user().map_err(|_| ServerError::Forbidden)?;
	let submission = SubmitExpense::parse(&body)?;

	let expense = state
		.store
		.create_expense(&NewExpense {
			user_id: user.id,
			amount: submission.amount,
			description: submission.description,
		})
		.await?;

	tracing::info!(expense_id = %expense.id, user_id = %user.id, "expense submitted");
	Ok(Redirect::temporary(&format!("/expenses/{}", expense.id)))
}

/// GET /expenses/{id} - visible to the expense's owner.
#[tracing::instrument(skip_all)]
pub async fn get_expense(
	State(state): State<AppState>,
	CurrentActor(actor): CurrentActor,
	id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Expense>, ServerError> {
	let Path(id) = id.map_err(|_| ServerError::BadRequest("invalid expense ID".to_string()))?;

	let expense = state
		.store
		.expense_by_id(ExpenseId::new(id))
		.await?
		.ok_or_else(|| ServerError::NotFound("expense".to_string()))?;

	if !state
		.decisions
		.authorize(&actor, "read", &Resource::Expense(expense.clone()))
	{
		tracing::info!(actor = %actor, expense_id = %expense.id, "expense read denied");
		return Err(ServerError::Forbidden);
	}

	Ok(Json(expense))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_amount_and_description() {
		let submission =
			SubmitExpense::parse(br#"{"amount": 1250, "description": "lunch"}"#).unwrap();
		assert_eq!(submission.amount, 1250);
		assert_eq!(submission.description, "lunch");
	}

	#[test]
	fn description_is_optional() {
		let submission = SubmitExpense::parse(br#"{"amount": 5}"#).unwrap();
		assert_eq!(submission.description, "");
	}

	#[test]
	fn rejects_owner_in_body() {
		let err = SubmitExpense::parse(br#"{"amount": 5, "user_id": 2}"#).unwrap_err();
		assert!(matches!(err, ServerError::BadRequest(ref m) if m.contains("user ID")));
	}

	#[test]
	fn rejects_malformed_json() {
		let err = SubmitExpense::parse(b"{amount: five}").unwrap_err();
		assert!(matches!(err, ServerError::BadRequest(ref m) if m == "failed to parse JSON"));
	}

	#[test]
	fn rejects_missing_amount() {
		assert!(SubmitExpense::parse(br#"{"description": "free lunch"}"#).is_err());
	}
}
