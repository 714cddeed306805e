// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy language: registry, parser, rule set and evaluator.

mod evaluator;
mod parser;
mod pattern;
mod registry;
mod rule;
mod store;

pub use evaluator::evaluate;
pub use pattern::PathPattern;
pub use registry::{
	AttrType, Attribute, Entity, Kind, Role, TypeRegistry, TypeRegistryBuilder, Value,
};
pub use rule::{ActionMatcher, Condition, KindMatcher, Operand, Rule};
pub use store::PolicySet;

/// The expense service policy shipped with the server.
pub const DEFAULT_POLICY: &str = include_str!("../../policy/expenses.policy");
