// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decision service: the single entry point for authorization checks.

use tracing::instrument;

use crate::error::{AuthSetupError, PolicyLoadError};
use crate::model::{Actor, Resource};
use crate::policy::{evaluate, PolicySet, TypeRegistry};

/// Answers allow/deny questions. Implementations must be fail-closed.
pub trait Authorizer: Send + Sync {
	fn authorize(&self, actor: &Actor, action: &str, resource: &Resource) -> bool;
}

/// Owns the frozen registry and policy. Built once at startup and shared
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DecisionService {
	registry: TypeRegistry,
	policy: PolicySet,
}

impl DecisionService {
	/// Load `policy_text` against an already-built registry.
	pub fn load(registry: TypeRegistry, policy_text: &str) -> Result<Self, PolicyLoadError> {
		let policy = PolicySet::load(policy_text, &registry)?;
		Ok(Self { registry, policy })
	}

	/// Standard registry plus `policy_text`.
	pub fn standard(policy_text: &str) -> Result<Self, AuthSetupError> {
		let registry = TypeRegistry::standard()?;
		Ok(Self::load(registry, policy_text)?)
	}

	pub fn policy(&self) -> &PolicySet {
		&self.policy
	}

	/// `true` iff some rule grants `action` on `resource` to `actor`.
	///
	/// Evaluation errors are logged and reported as a denial.
	#[instrument(
		level = "debug",
		skip(self, actor, resource),
		fields(actor = %actor, resource_kind = %resource.kind())
	)]
	pub fn authorize(&self, actor: &Actor, action: &str, resource: &Resource) -> bool {
		match evaluate(&self.policy, &self.registry, actor, action, resource) {
			Ok(allowed) => {
				tracing::debug!(allowed, "authorization decided");
				allowed
			}
			Err(error) => {
				tracing::error!(
					actor = %actor,
					action,
					resource_kind = %resource.kind(),
					error = %error,
					"authorization evaluation failed; denying"
				);
				false
			}
		}
	}
}

impl Authorizer for DecisionService {
	fn authorize(&self, actor: &Actor, action: &str, resource: &Resource) -> bool {
		DecisionService::authorize(self, actor, action, resource)
	}
}
