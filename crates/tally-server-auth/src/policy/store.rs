// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loaded, validated rule set.

use std::collections::BTreeMap;

use super::parser::parse_policy;
use super::registry::{Kind, Role, TypeRegistry};
use super::rule::{KindMatcher, Rule};
use crate::error::PolicyLoadError;

/// An immutable set of rules, indexed by the resource kind they apply to.
///
/// Rules with a `*` resource are listed under every registered resource kind.
/// Within each kind policy file order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySet {
	rules: Vec<Rule>,
	index: BTreeMap<Kind, Vec<usize>>,
}

impl PolicySet {
	/// Parse and validate `text` against `registry`.
	///
	/// Loading is all or nothing: the first error aborts and no rules are kept.
	pub fn load(text: &str, registry: &TypeRegistry) -> Result<Self, PolicyLoadError> {
		let rules = parse_policy(text, registry)?;

		let mut index: BTreeMap<Kind, Vec<usize>> = BTreeMap::new();
		for kind in registry.kinds_with_role(Role::Resource) {
			let positions: Vec<usize> = rules
				.iter()
				.enumerate()
				.filter(|(_, rule)| rule.resource.matches(kind))
				.map(|(i, _)| i)
				.collect();
			index.insert(kind, positions);
		}

		tracing::debug!(
			rules = rules.len(),
			wildcard_resource_rules = rules.iter().filter(|r| r.resource == KindMatcher::Any).count(),
			"loaded policy"
		);

		Ok(Self { rules, index })
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rules that may apply to a resource of `kind`, in source order.
	pub fn candidates(&self, kind: Kind) -> impl Iterator<Item = &Rule> + '_ {
		self
			.index
			.get(&kind)
			.into_iter()
			.flatten()
			.map(move |&i| &self.rules[i])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const POLICY: &str = r#"
# expenses
allow User "read" Expense if actor.id == resource.owner
allow * * *
allow User "read" Organization if actor.organization == resource.id
"#;

	fn registry() -> TypeRegistry {
		TypeRegistry::standard().unwrap()
	}

	#[test]
	fn empty_text_loads_an_empty_set() {
		let set = PolicySet::load("# nothing here\n\n", &registry()).unwrap();
		assert!(set.is_empty());
		assert_eq!(set.candidates(Kind::Expense).count(), 0);
	}

	#[test]
	fn index_keeps_source_order_and_wildcards() {
		let set = PolicySet::load(POLICY, &registry()).unwrap();
		assert_eq!(set.len(), 3);

		let expense: Vec<usize> = set.candidates(Kind::Expense).map(|r| r.line).collect();
		assert_eq!(expense, vec![3, 4]);

		let org: Vec<usize> = set.candidates(Kind::Organization).map(|r| r.line).collect();
		assert_eq!(org, vec![4, 5]);

		let request: Vec<usize> = set.candidates(Kind::Request).map(|r| r.line).collect();
		assert_eq!(request, vec![4]);
	}

	#[test]
	fn actor_kinds_have_no_candidates() {
		let set = PolicySet::load(POLICY, &registry()).unwrap();
		assert_eq!(set.candidates(Kind::User).count(), 0);
	}

	#[test]
	fn loading_twice_is_identical() {
		let registry = registry();
		let first = PolicySet::load(POLICY, &registry).unwrap();
		let second = PolicySet::load(POLICY, &registry).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn a_bad_line_rejects_the_whole_policy() {
		let text = format!("{POLICY}allow Nobody * *\n");
		let err = PolicySet::load(&text, &registry()).unwrap_err();
		assert_eq!(err.line, 6);
	}
}
