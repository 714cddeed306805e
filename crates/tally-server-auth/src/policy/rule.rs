// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rule representation produced by the policy parser.

use http::Method;
use std::fmt;

use super::pattern::PathPattern;
use super::registry::{Kind, Value};

/// Matches an actor or resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindMatcher {
	Any,
	Kind(Kind),
}

impl KindMatcher {
	pub fn matches(self, kind: Kind) -> bool {
		match self {
			KindMatcher::Any => true,
			KindMatcher::Kind(k) => k == kind,
		}
	}
}

impl fmt::Display for KindMatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			KindMatcher::Any => f.write_str("*"),
			KindMatcher::Kind(kind) => write!(f, "{kind}"),
		}
	}
}

/// Matches the action string of a request for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionMatcher {
	Any,
	Exact(String),
	/// HTTP method membership; only valid against `Request` resources.
	Method(Vec<Method>),
}

impl ActionMatcher {
	pub fn matches(&self, action: &str) -> bool {
		match self {
			ActionMatcher::Any => true,
			ActionMatcher::Exact(expected) => expected == action,
			ActionMatcher::Method(methods) => methods.iter().any(|m| m.as_str() == action),
		}
	}
}

impl fmt::Display for ActionMatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ActionMatcher::Any => f.write_str("*"),
			ActionMatcher::Exact(action) => write!(f, "{action:?}"),
			ActionMatcher::Method(methods) => {
				let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
				write!(f, "method({})", names.join(", "))
			}
		}
	}
}

/// One side of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
	Actor(String),
	Resource(String),
	Literal(Value),
}

impl fmt::Display for Operand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Operand::Actor(name) => write!(f, "actor.{name}"),
			Operand::Resource(name) => write!(f, "resource.{name}"),
			Operand::Literal(value) => write!(f, "{value}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
	Equals { left: Operand, right: Operand },
	Matches { operand: Operand, pattern: PathPattern },
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Condition::Equals { left, right } => write!(f, "{left} == {right}"),
			Condition::Matches { operand, pattern } => write!(f, "{operand} matches {:?}", pattern.as_str()),
		}
	}
}

/// A single grant. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
	/// 1-based source line.
	pub line: usize,
	pub actor: KindMatcher,
	pub action: ActionMatcher,
	pub resource: KindMatcher,
	pub conditions: Vec<Condition>,
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "allow {} {} {}", self.actor, self.action, self.resource)?;
		for (i, condition) in self.conditions.iter().enumerate() {
			let joiner = if i == 0 { "if" } else { "and" };
			write!(f, " {joiner} {condition}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kind_matcher() {
		assert!(KindMatcher::Any.matches(Kind::Guest));
		assert!(KindMatcher::Kind(Kind::User).matches(Kind::User));
		assert!(!KindMatcher::Kind(Kind::User).matches(Kind::Guest));
	}

	#[test]
	fn action_matcher() {
		assert!(ActionMatcher::Any.matches("anything"));
		assert!(ActionMatcher::Exact("read".to_string()).matches("read"));
		assert!(!ActionMatcher::Exact("read".to_string()).matches("write"));

		let methods = ActionMatcher::Method(vec![Method::GET, Method::HEAD]);
		assert!(methods.matches("GET"));
		assert!(methods.matches("HEAD"));
		assert!(!methods.matches("get"));
		assert!(!methods.matches("PUT"));
	}

	#[test]
	fn rule_display_reads_like_policy_text() {
		let rule = Rule {
			line: 1,
			actor: KindMatcher::Kind(Kind::User),
			action: ActionMatcher::Exact("read".to_string()),
			resource: KindMatcher::Kind(Kind::Expense),
			conditions: vec![Condition::Equals {
				left: Operand::Actor("id".to_string()),
				right: Operand::Resource("owner".to_string()),
			}],
		};
		assert_eq!(
			rule.to_string(),
			r#"allow User "read" Expense if actor.id == resource.owner"#
		);
	}
}
