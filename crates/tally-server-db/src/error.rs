// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl DbError {
	/// Map unique-constraint violations to [`DbError::Conflict`].
	pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
		match &err {
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				DbError::Conflict(format!("{what} already exists"))
			}
			_ => DbError::Sqlx(err),
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
