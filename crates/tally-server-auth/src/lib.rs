// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization for the Tally expense service.
//!
//! # Architecture
//!
//! - `model` - users, guests, expenses, organizations and inbound requests
//! - `policy` - type registry, policy language parser, rule set and evaluator
//! - `service` - [`DecisionService`], the fail-closed decision entry point
//! - `middleware` - request-scoped actor state and credential extraction
//!
//! # Example
//!
//! ```ignore
//! use tally_server_auth::{Actor, DecisionService, Resource, DEFAULT_POLICY};
//!
//! let decisions = DecisionService::standard(DEFAULT_POLICY)?;
//! let allowed = decisions.authorize(&Actor::Guest, "GET", &Resource::from(request));
//! ```

pub mod error;
pub mod middleware;
pub mod model;
pub mod policy;
pub mod service;
pub mod types;

pub use error::{
	AuthSetupError, EvaluationError, PolicyLoadError, PolicyLoadReason, RegistrationError,
};
pub use middleware::{extract_credential, AuthRequired, RequestScope, DEFAULT_CREDENTIAL_HEADER};
pub use model::{Actor, Expense, Guest, InboundRequest, NewExpense, Organization, Resource, User};
pub use policy::{Entity, Kind, PolicySet, TypeRegistry, DEFAULT_POLICY};
pub use service::{Authorizer, DecisionService};
pub use types::{ExpenseId, OrgId, UserId};
