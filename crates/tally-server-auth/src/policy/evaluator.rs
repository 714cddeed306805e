// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rule evaluation against concrete actors and resources.
//!
//! Access is granted when any candidate rule matches. There is no deny rule
//! and no precedence; if nothing matches the answer is `false`.

use super::registry::{AttrType, Kind, TypeRegistry, Value};
use super::rule::{Condition, Operand, Rule};
use super::store::PolicySet;
use crate::error::EvaluationError;
use crate::model::{Actor, Resource};

/// Evaluate the policy for one `(actor, action, resource)` triple.
///
/// Errors abort evaluation; the caller decides how to treat them (the
/// decision service denies).
pub fn evaluate(
	policy: &PolicySet,
	registry: &TypeRegistry,
	actor: &Actor,
	action: &str,
	resource: &Resource,
) -> Result<bool, EvaluationError> {
	let actor_kind = actor.kind();
	let resource_kind = resource.kind();

	if !registry.contains(actor_kind) {
		return Err(EvaluationError::UnregisteredKind(actor_kind));
	}
	if !registry.contains(resource_kind) {
		return Err(EvaluationError::UnregisteredKind(resource_kind));
	}

	for rule in policy.candidates(resource_kind) {
		if !rule.actor.matches(actor_kind) || !rule.action.matches(action) {
			continue;
		}
		if rule_holds(rule, actor, resource)? {
			tracing::trace!(line = rule.line, %rule, "rule matched");
			return Ok(true);
		}
	}

	Ok(false)
}

fn rule_holds(rule: &Rule, actor: &Actor, resource: &Resource) -> Result<bool, EvaluationError> {
	for condition in &rule.conditions {
		if !condition_holds(condition, actor, resource)? {
			return Ok(false);
		}
	}
	Ok(true)
}

fn condition_holds(
	condition: &Condition,
	actor: &Actor,
	resource: &Resource,
) -> Result<bool, EvaluationError> {
	match condition {
		Condition::Equals { left, right } => {
			let left = resolve(left, actor, resource)?;
			let right = resolve(right, actor, resource)?;
			if left.ty() != right.ty() {
				return Err(EvaluationError::TypeMismatch {
					left: left.ty(),
					right: right.ty(),
				});
			}
			Ok(left == right)
		}
		Condition::Matches { operand, pattern } => match resolve(operand, actor, resource)? {
			Value::Str(path) => Ok(pattern.matches(&path)),
			other => Err(EvaluationError::TypeMismatch {
				left: other.ty(),
				right: AttrType::Str,
			}),
		},
	}
}

fn resolve(operand: &Operand, actor: &Actor, resource: &Resource) -> Result<Value, EvaluationError> {
	match operand {
		Operand::Literal(value) => Ok(value.clone()),
		Operand::Actor(name) => actor
			.attribute(name)
			.ok_or_else(|| missing(actor.kind(), name)),
		Operand::Resource(name) => resource
			.attribute(name)
			.ok_or_else(|| missing(resource.kind(), name)),
	}
}

fn missing(kind: Kind, attribute: &str) -> EvaluationError {
	EvaluationError::MissingAttribute {
		kind,
		attribute: attribute.to_string(),
	}
}
