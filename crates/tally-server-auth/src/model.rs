// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Domain records and the closed actor/resource unions.
//!
//! - [`Actor`]: who is asking ([`User`] or the anonymous guest)
//! - [`Resource`]: what is being accessed ([`InboundRequest`], [`Expense`],
//!   [`Organization`])
//!
//! Each record implements [`Entity`] so its attributes can be referenced from
//! policy conditions. Attribute names are the policy-facing names and do not
//! always match the Rust field names (`Expense::user_id` is `owner`).

use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::{Attribute, Entity, Kind, Value};
use crate::types::{ExpenseId, OrgId, UserId};

/// A user record resolved from the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub title: String,
	pub organization_id: OrgId,
}

impl User {
	/// A user is authenticated when it carries a credential.
	pub fn is_authenticated(&self) -> bool {
		!self.email.is_empty()
	}
}

impl Entity for User {
	const KIND: Kind = Kind::User;
	const ATTRIBUTES: &'static [Attribute] = &[
		Attribute::int("id"),
		Attribute::str("email"),
		Attribute::str("title"),
		Attribute::int("organization"),
		Attribute::bool("authenticated"),
	];

	fn attribute(&self, name: &str) -> Option<Value> {
		match name {
			"id" => Some(Value::Int(self.id.get())),
			"email" => Some(Value::Str(self.email.clone())),
			"title" => Some(Value::Str(self.title.clone())),
			"organization" => Some(Value::Int(self.organization_id.get())),
			"authenticated" => Some(Value::Bool(self.is_authenticated())),
			_ => None,
		}
	}
}

/// The anonymous actor. Carries no identifying attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guest;

impl Entity for Guest {
	const KIND: Kind = Kind::Guest;
	const ATTRIBUTES: &'static [Attribute] = &[Attribute::bool("authenticated")];

	fn attribute(&self, name: &str) -> Option<Value> {
		match name {
			"authenticated" => Some(Value::Bool(false)),
			_ => None,
		}
	}
}

/// Organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
	pub id: OrgId,
	pub name: String,
}

impl Entity for Organization {
	const KIND: Kind = Kind::Organization;
	const ATTRIBUTES: &'static [Attribute] = &[Attribute::int("id"), Attribute::str("name")];

	fn attribute(&self, name: &str) -> Option<Value> {
		match name {
			"id" => Some(Value::Int(self.id.get())),
			"name" => Some(Value::Str(self.name.clone())),
			_ => None,
		}
	}
}

/// Expense record. The owner (`user_id`) is fixed when the expense is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
	pub id: ExpenseId,
	pub user_id: UserId,
	pub amount: i64,
	pub description: String,
}

impl Entity for Expense {
	const KIND: Kind = Kind::Expense;
	const ATTRIBUTES: &'static [Attribute] = &[
		Attribute::int("id"),
		Attribute::int("owner"),
		Attribute::int("amount"),
		Attribute::str("description"),
	];

	fn attribute(&self, name: &str) -> Option<Value> {
		match name {
			"id" => Some(Value::Int(self.id.get())),
			"owner" => Some(Value::Int(self.user_id.get())),
			"amount" => Some(Value::Int(self.amount)),
			"description" => Some(Value::Str(self.description.clone())),
			_ => None,
		}
	}
}

/// Fields needed to store a new expense; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
	pub user_id: UserId,
	pub amount: i64,
	pub description: String,
}

/// The HTTP request being routed, as seen by the route-level policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
	pub method: Method,
	pub path: String,
}

impl InboundRequest {
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
		}
	}
}

impl Entity for InboundRequest {
	const KIND: Kind = Kind::Request;
	const ATTRIBUTES: &'static [Attribute] = &[Attribute::str("method"), Attribute::str("path")];

	fn attribute(&self, name: &str) -> Option<Value> {
		match name {
			"method" => Some(Value::Str(self.method.as_str().to_string())),
			"path" => Some(Value::Str(self.path.clone())),
			_ => None,
		}
	}
}

/// The party requesting access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Actor {
	User(User),
	#[default]
	Guest,
}

impl Actor {
	pub fn kind(&self) -> Kind {
		match self {
			Actor::User(_) => Kind::User,
			Actor::Guest => Kind::Guest,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		match self {
			Actor::User(user) => user.is_authenticated(),
			Actor::Guest => false,
		}
	}

	pub fn user(&self) -> Option<&User> {
		match self {
			Actor::User(user) => Some(user),
			Actor::Guest => None,
		}
	}

	pub fn attribute(&self, name: &str) -> Option<Value> {
		match self {
			Actor::User(user) => user.attribute(name),
			Actor::Guest => Guest.attribute(name),
		}
	}
}

impl From<User> for Actor {
	fn from(user: User) -> Self {
		Actor::User(user)
	}
}

impl fmt::Display for Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Actor::User(user) => write!(f, "user {} <{}>", user.id, user.email),
			Actor::Guest => write!(f, "guest"),
		}
	}
}

/// The thing being accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
	Request(InboundRequest),
	Expense(Expense),
	Organization(Organization),
}

impl Resource {
	pub fn kind(&self) -> Kind {
		match self {
			Resource::Request(_) => Kind::Request,
			Resource::Expense(_) => Kind::Expense,
			Resource::Organization(_) => Kind::Organization,
		}
	}

	pub fn attribute(&self, name: &str) -> Option<Value> {
		match self {
			Resource::Request(request) => request.attribute(name),
			Resource::Expense(expense) => expense.attribute(name),
			Resource::Organization(org) => org.attribute(name),
		}
	}
}

impl From<InboundRequest> for Resource {
	fn from(request: InboundRequest) -> Self {
		Resource::Request(request)
	}
}

impl From<Expense> for Resource {
	fn from(expense: Expense) -> Self {
		Resource::Expense(expense)
	}
}

impl From<Organization> for Resource {
	fn from(org: Organization) -> Self {
		Resource::Organization(org)
	}
}
