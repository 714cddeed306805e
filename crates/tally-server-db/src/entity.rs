// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Entity repository: users, organizations and expenses.
//!
//! Lookups return `Ok(None)` when no row matches; errors are reserved for
//! database failures.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use tally_server_auth::{Expense, ExpenseId, NewExpense, OrgId, Organization, User, UserId};

use crate::error::DbError;

#[async_trait]
pub trait EntityStore: Send + Sync {
	async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
	async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DbError>;
	async fn organization_by_id(&self, id: OrgId) -> Result<Option<Organization>, DbError>;
	async fn expense_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, DbError>;
	async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError>;
}

/// SQLite-backed [`EntityStore`].
#[derive(Clone)]
pub struct EntityRepository {
	pool: SqlitePool,
}

impl EntityRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Look up a user by credential.
	///
	/// # Returns
	/// `None` if no user has this email.
	#[tracing::instrument(skip(self), fields(email = %email))]
	pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, title, organization_id
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, title, organization_id
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(org_id = %id))]
	pub async fn organization_by_id(&self, id: OrgId) -> Result<Option<Organization>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name
			FROM organizations
			WHERE id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		row
			.map(|r| -> Result<Organization, DbError> {
				Ok(Organization {
					id: OrgId::new(r.try_get("id")?),
					name: r.try_get("name")?,
				})
			})
			.transpose()
	}

	#[tracing::instrument(skip(self), fields(expense_id = %id))]
	pub async fn expense_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, amount, description
			FROM expenses
			WHERE id = ?
			"#,
		)
		.bind(id.get())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_expense(&r)).transpose()
	}

	/// Store a new expense and return it with its assigned id.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if the insert fails (e.g., unknown owner).
	#[tracing::instrument(skip(self, expense), fields(user_id = %expense.user_id, amount = expense.amount))]
	pub async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			INSERT INTO expenses (user_id, amount, description)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(expense.user_id.get())
		.bind(expense.amount)
		.bind(&expense.description)
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		let id = ExpenseId::new(result.last_insert_rowid());
		tracing::debug!(expense_id = %id, "expense created");

		Ok(Expense {
			id,
			user_id: expense.user_id,
			amount: expense.amount,
			description: expense.description.clone(),
		})
	}

	/// Insert an organization. Used for provisioning and fixtures.
	#[tracing::instrument(skip(self))]
	pub async fn create_organization(&self, name: &str) -> Result<Organization, DbError> {
		let result = sqlx::query("INSERT INTO organizations (name) VALUES (?)")
			.bind(name)
			.execute(&self.pool)
			.await?;

		Ok(Organization {
			id: OrgId::new(result.last_insert_rowid()),
			name: name.to_string(),
		})
	}

	/// Insert a user belonging to `organization_id`.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the email is already taken.
	#[tracing::instrument(skip(self), fields(org_id = %organization_id))]
	pub async fn create_user(
		&self,
		email: &str,
		title: &str,
		organization_id: OrgId,
	) -> Result<User, DbError> {
		let result = sqlx::query(
			r#"
			INSERT INTO users (email, title, organization_id)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(email)
		.bind(title)
		.bind(organization_id.get())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::from_insert(e, "user"))?;

		Ok(User {
			id: UserId::new(result.last_insert_rowid()),
			email: email.to_string(),
			title: title.to_string(),
			organization_id,
		})
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	Ok(User {
		id: UserId::new(row.try_get("id")?),
		email: row.try_get("email")?,
		title: row.try_get("title")?,
		organization_id: OrgId::new(row.try_get("organization_id")?),
	})
}

fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense, DbError> {
	Ok(Expense {
		id: ExpenseId::new(row.try_get("id")?),
		user_id: UserId::new(row.try_get("user_id")?),
		amount: row.try_get("amount")?,
		description: row.try_get("description")?,
	})
}

#[async_trait]
impl EntityStore for EntityRepository {
	async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.user_by_email(email).await
	}

	async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		self.user_by_id(id).await
	}

	async fn organization_by_id(&self, id: OrgId) -> Result<Option<Organization>, DbError> {
		self.organization_by_id(id).await
	}

	async fn expense_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, DbError> {
		self.expense_by_id(id).await
	}

	async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError> {
		self.create_expense(expense).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_entity_test_pool, seed_fixtures};

	async fn seeded_repo() -> EntityRepository {
		let pool = create_entity_test_pool().await;
		seed_fixtures(&pool).await;
		EntityRepository::new(pool)
	}

	#[tokio::test]
	async fn user_by_email_finds_seeded_user() {
		let repo = seeded_repo().await;
		let user = repo.user_by_email("test@example.com").await.unwrap().unwrap();
		assert_eq!(user.id, UserId::new(1));
		assert_eq!(user.title, "Accountant");
		assert_eq!(user.organization_id, OrgId::new(1));
	}

	#[tokio::test]
	async fn missing_rows_are_none() {
		let repo = seeded_repo().await;
		assert!(repo.user_by_email("nobody@example.com").await.unwrap().is_none());
		assert!(repo.user_by_id(UserId::new(99)).await.unwrap().is_none());
		assert!(repo.organization_by_id(OrgId::new(99)).await.unwrap().is_none());
		assert!(repo.expense_by_id(ExpenseId::new(99)).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn user_by_id_matches_requested_id() {
		let repo = seeded_repo().await;
		let user = repo.user_by_id(UserId::new(2)).await.unwrap().unwrap();
		assert_eq!(user.id, UserId::new(2));
		assert_eq!(user.email, "other@example.com");
	}

	#[tokio::test]
	async fn organization_lookup() {
		let repo = seeded_repo().await;
		let org = repo.organization_by_id(OrgId::new(1)).await.unwrap().unwrap();
		assert_eq!(org.name, "Acme Corp");
	}

	#[tokio::test]
	async fn created_expense_can_be_read_back() {
		let repo = seeded_repo().await;
		let created = repo
			.create_expense(&NewExpense {
				user_id: UserId::new(1),
				amount: 4200,
				description: "conference ticket".to_string(),
			})
			.await
			.unwrap();

		let stored = repo.expense_by_id(created.id).await.unwrap().unwrap();
		assert_eq!(stored, created);
		assert_eq!(stored.user_id, UserId::new(1));
	}

	#[tokio::test]
	async fn expense_for_unknown_owner_is_rejected() {
		let repo = seeded_repo().await;
		let err = repo
			.create_expense(&NewExpense {
				user_id: UserId::new(404),
				amount: 1,
				description: "ghost".to_string(),
			})
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Sqlx(_)));
	}

	#[tokio::test]
	async fn duplicate_email_is_a_conflict() {
		let repo = seeded_repo().await;
		let err = repo
			.create_user("test@example.com", "Clerk", OrgId::new(1))
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)));
	}

	#[tokio::test]
	async fn works_through_the_trait_object() {
		let store: std::sync::Arc<dyn EntityStore> = std::sync::Arc::new(seeded_repo().await);
		let expense = store.expense_by_id(ExpenseId::new(1)).await.unwrap().unwrap();
		assert_eq!(expense.user_id, UserId::new(1));
	}
}
