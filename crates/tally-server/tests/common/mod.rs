// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
	body::{to_bytes, Body},
	http::{Method, Request, StatusCode},
	response::Response,
	Router,
};
use tally_server::{create_router, AppState};
use tally_server_auth::{
	DecisionService, Expense, ExpenseId, NewExpense, OrgId, Organization, User, UserId,
	DEFAULT_POLICY,
};
use tally_server_db::{DbError, EntityStore};
use tower::ServiceExt;

pub const TEST_EMAIL: &str = "test@example.com";
pub const OTHER_EMAIL: &str = "other@example.com";

/// In-memory store holding the same fixtures as the SQLite test seed.
#[derive(Default)]
pub struct MemoryStore {
	users: Vec<User>,
	organizations: Vec<Organization>,
	expenses: Mutex<HashMap<ExpenseId, Expense>>,
}

impl MemoryStore {
	pub fn seeded() -> Self {
		let expenses = [
			Expense {
				id: ExpenseId::new(1),
				user_id: UserId::new(1),
				amount: 500,
				description: "coffee with client".to_string(),
			},
			Expense {
				id: ExpenseId::new(2),
				user_id: UserId::new(2),
				amount: 12000,
				description: "flight".to_string(),
			},
		];
		Self {
			users: vec![
				User {
					id: UserId::new(1),
					email: TEST_EMAIL.to_string(),
					title: "Accountant".to_string(),
					organization_id: OrgId::new(1),
				},
				User {
					id: UserId::new(2),
					email: OTHER_EMAIL.to_string(),
					title: "Engineer".to_string(),
					organization_id: OrgId::new(2),
				},
			],
			organizations: vec![
				Organization {
					id: OrgId::new(1),
					name: "Acme Corp".to_string(),
				},
				Organization {
					id: OrgId::new(2),
					name: "Globex".to_string(),
				},
			],
			expenses: Mutex::new(expenses.into_iter().map(|e| (e.id, e)).collect()),
		}
	}
}

#[async_trait]
impl EntityStore for MemoryStore {
	async fn user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		Ok(self.users.iter().find(|u| u.email == email).cloned())
	}

	async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DbError> {
		Ok(self.users.iter().find(|u| u.id == id).cloned())
	}

	async fn organization_by_id(&self, id: OrgId) -> Result<Option<Organization>, DbError> {
		Ok(self.organizations.iter().find(|o| o.id == id).cloned())
	}

	async fn expense_by_id(&self, id: ExpenseId) -> Result<Option<Expense>, DbError> {
		Ok(self.expenses.lock().unwrap().get(&id).cloned())
	}

	async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, DbError> {
		let mut expenses = self.expenses.lock().unwrap();
		let id = ExpenseId::new(expenses.keys().map(|id| id.get()).max().unwrap_or(0) + 1);
		let stored = Expense {
			id,
			user_id: expense.user_id,
			amount: expense.amount,
			description: expense.description.clone(),
		};
		expenses.insert(id, stored.clone());
		Ok(stored)
	}
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl EntityStore for BrokenStore {
	async fn user_by_email(&self, _email: &str) -> Result<Option<User>, DbError> {
		Err(DbError::Internal("store offline".to_string()))
	}

	async fn user_by_id(&self, _id: UserId) -> Result<Option<User>, DbError> {
		Err(DbError::Internal("store offline".to_string()))
	}

	async fn organization_by_id(&self, _id: OrgId) -> Result<Option<Organization>, DbError> {
		Err(DbError::Internal("store offline".to_string()))
	}

	async fn expense_by_id(&self, _id: ExpenseId) -> Result<Option<Expense>, DbError> {
		Err(DbError::Internal("store offline".to_string()))
	}

	async fn create_expense(&self, _expense: &NewExpense) -> Result<Expense, DbError> {
		Err(DbError::Internal("store offline".to_string()))
	}
}

pub fn router_with(store: Arc<dyn EntityStore>) -> Router {
	let decisions = Arc::new(DecisionService::standard(DEFAULT_POLICY).unwrap());
	create_router(AppState::new(decisions, store))
}

pub fn memory_router() -> Router {
	router_with(Arc::new(MemoryStore::seeded()))
}

pub fn request(method: Method, uri: &str, user: Option<&str>, body: Body) -> Request<Body> {
	let mut builder = Request::builder().method(method).uri(uri);
	if let Some(email) = user {
		builder = builder.header("user", email);
	}
	builder.body(body).unwrap()
}

pub async fn send(router: Router, req: Request<Body>) -> Response {
	router.oneshot(req).await.unwrap()
}

pub async fn get(router: Router, uri: &str, user: Option<&str>) -> Response {
	send(router, request(Method::GET, uri, user, Body::empty())).await
}

pub async fn body_string(response: Response) -> String {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn assert_forbidden(response: Response) {
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_string(response).await, "forbidden");
}
