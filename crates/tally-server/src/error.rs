// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use tally_server_db::DbError;

/// Handler-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Entity store operation failed.
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// Requested record does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// Invalid request payload or path.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// The policy denied the request.
	#[error("Forbidden")]
	Forbidden,

	/// Internal server error.
	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
		}
	}
}

/// The 403 returned for every denial: plain text `forbidden`, nothing about
/// which rule or attribute was involved.
pub fn forbidden_response() -> Response {
	(
		StatusCode::FORBIDDEN,
		[(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
		"forbidden",
	)
		.into_response()
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error_response) = match &self {
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::NotFound(what) => (
				StatusCode::NOT_FOUND,
				ErrorResponse::new("not_found", format!("unable to find {what}")),
			),
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Forbidden => return forbidden_response(),
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		};

		(status, Json(error_response)).into_response()
	}
}
