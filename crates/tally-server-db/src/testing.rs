// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared helpers for tests in this workspace.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tally_server_auth::NewExpense;

use crate::entity::EntityRepository;
use crate::migrations::run_migrations;

/// In-memory pool. A single connection keeps every query on the same database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool")
}

/// In-memory pool with the schema applied.
pub async fn create_entity_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

/// Seed two organizations, one user in each and one expense per user.
///
/// | table         | id | data                                        |
/// |---------------|----|---------------------------------------------|
/// | organizations | 1  | Acme Corp                                   |
/// | organizations | 2  | Globex                                      |
/// | users         | 1  | test@example.com, Accountant, org 1         |
/// | users         | 2  | other@example.com, Engineer, org 2          |
/// | expenses      | 1  | owner 1, 500, "coffee with client"          |
/// | expenses      | 2  | owner 2, 12000, "flight"                    |
pub async fn seed_fixtures(pool: &SqlitePool) {
	let repo = EntityRepository::new(pool.clone());

	let acme = repo.create_organization("Acme Corp").await.unwrap();
	let globex = repo.create_organization("Globex").await.unwrap();

	let accountant = repo
		.create_user("test@example.com", "Accountant", acme.id)
		.await
		.unwrap();
	let engineer = repo
		.create_user("other@example.com", "Engineer", globex.id)
		.await
		.unwrap();

	for (user_id, amount, description) in [
		(accountant.id, 500, "coffee with client"),
		(engineer.id, 12000, "flight"),
	] {
		repo.create_expense(&NewExpense {
			user_id,
			amount,
			description: description.to_string(),
		})
		.await
		.unwrap();
	}
}
