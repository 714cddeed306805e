// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type registry: the schema that policy rules are checked against.
//!
//! Every domain type that can appear in a rule implements [`Entity`], which
//! declares its [`Kind`] and the attributes conditions may reference. The
//! registry is assembled once at startup from those static declarations and
//! is read-only afterwards.
//!
//! ```ignore
//! let registry = TypeRegistry::builder()
//!     .register::<User>()?
//!     .register::<Guest>()?
//!     .register::<Expense>()?
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::RegistrationError;
use crate::model::{Expense, Guest, InboundRequest, Organization, User};

/// Which side of a decision a kind can appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Actor,
	Resource,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Actor => write!(f, "actor"),
			Role::Resource => write!(f, "resource"),
		}
	}
}

/// Domain entity kinds addressable from policy text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
	User,
	Guest,
	Request,
	Expense,
	Organization,
}

impl Kind {
	pub const ALL: [Kind; 5] = [
		Kind::User,
		Kind::Guest,
		Kind::Request,
		Kind::Expense,
		Kind::Organization,
	];

	/// Name used for this kind in policy text.
	pub fn as_str(self) -> &'static str {
		match self {
			Kind::User => "User",
			Kind::Guest => "Guest",
			Kind::Request => "Request",
			Kind::Expense => "Expense",
			Kind::Organization => "Organization",
		}
	}

	pub fn role(self) -> Role {
		match self {
			Kind::User | Kind::Guest => Role::Actor,
			Kind::Request | Kind::Expense | Kind::Organization => Role::Resource,
		}
	}

	/// Resolve a kind from its policy name. Names are case-sensitive.
	pub fn from_name(name: &str) -> Option<Kind> {
		Kind::ALL.into_iter().find(|k| k.as_str() == name)
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
	Int,
	Str,
	Bool,
}

impl fmt::Display for AttrType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttrType::Int => write!(f, "integer"),
			AttrType::Str => write!(f, "string"),
			AttrType::Bool => write!(f, "boolean"),
		}
	}
}

/// A concrete attribute value read from an entity or written as a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Int(i64),
	Str(String),
	Bool(bool),
}

impl Value {
	pub fn ty(&self) -> AttrType {
		match self {
			Value::Int(_) => AttrType::Int,
			Value::Str(_) => AttrType::Str,
			Value::Bool(_) => AttrType::Bool,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Int(v) => write!(f, "{v}"),
			Value::Str(v) => write!(f, "{v:?}"),
			Value::Bool(v) => write!(f, "{v}"),
		}
	}
}

/// A named, typed attribute declared by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute {
	pub name: &'static str,
	pub ty: AttrType,
}

impl Attribute {
	pub const fn int(name: &'static str) -> Self {
		Self {
			name,
			ty: AttrType::Int,
		}
	}

	pub const fn str(name: &'static str) -> Self {
		Self {
			name,
			ty: AttrType::Str,
		}
	}

	pub const fn bool(name: &'static str) -> Self {
		Self {
			name,
			ty: AttrType::Bool,
		}
	}
}

/// A domain type visible to rule evaluation.
///
/// `attribute` must return a value of the declared type for every name in
/// `ATTRIBUTES`; anything else surfaces as an evaluation error and a denial.
pub trait Entity {
	const KIND: Kind;
	const ATTRIBUTES: &'static [Attribute];

	fn attribute(&self, name: &str) -> Option<Value>;
}

/// Frozen table of registered kinds and their attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
	kinds: BTreeMap<Kind, Vec<Attribute>>,
}

impl TypeRegistry {
	pub fn builder() -> TypeRegistryBuilder {
		TypeRegistryBuilder::default()
	}

	/// Registry with every domain entity of the expense service.
	pub fn standard() -> Result<Self, RegistrationError> {
		Ok(Self::builder()
			.register::<User>()?
			.register::<Guest>()?
			.register::<InboundRequest>()?
			.register::<Expense>()?
			.register::<Organization>()?
			.build())
	}

	pub fn contains(&self, kind: Kind) -> bool {
		self.kinds.contains_key(&kind)
	}

	/// Look up a registered attribute of `kind`.
	pub fn attribute(&self, kind: Kind, name: &str) -> Option<&Attribute> {
		self.kinds.get(&kind)?.iter().find(|a| a.name == name)
	}

	/// Registered kinds with the given role, in declaration order of [`Kind`].
	pub fn kinds_with_role(&self, role: Role) -> impl Iterator<Item = Kind> + '_ {
		self.kinds.keys().copied().filter(move |k| k.role() == role)
	}
}

/// Builder collecting registrations before the registry is frozen.
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
	kinds: BTreeMap<Kind, Vec<Attribute>>,
}

impl TypeRegistryBuilder {
	/// Register an entity type using its static schema.
	pub fn register<T: Entity>(self) -> Result<Self, RegistrationError> {
		self.register_kind(T::KIND, T::ATTRIBUTES)
	}

	/// Register a kind with an explicit attribute list.
	pub fn register_kind(
		mut self,
		kind: Kind,
		attributes: &[Attribute],
	) -> Result<Self, RegistrationError> {
		if self.kinds.contains_key(&kind) {
			return Err(RegistrationError::DuplicateKind(kind));
		}

		let mut declared: Vec<Attribute> = Vec::with_capacity(attributes.len());
		for attribute in attributes {
			if declared.iter().any(|a| a.name == attribute.name) {
				return Err(RegistrationError::DuplicateAttribute {
					kind,
					attribute: attribute.name,
				});
			}
			declared.push(*attribute);
		}

		tracing::debug!(%kind, attributes = declared.len(), "registered entity kind");
		self.kinds.insert(kind, declared);
		Ok(self)
	}

	pub fn build(self) -> TypeRegistry {
		TypeRegistry { kinds: self.kinds }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn standard_registry_contains_every_kind() {
		let registry = TypeRegistry::standard().unwrap();
		for kind in Kind::ALL {
			assert!(registry.contains(kind), "{kind} should be registered");
		}
	}

	#[test]
	fn duplicate_kind_is_rejected() {
		let err = TypeRegistry::builder()
			.register::<User>()
			.unwrap()
			.register::<User>()
			.unwrap_err();
		assert_eq!(err, RegistrationError::DuplicateKind(Kind::User));
	}

	#[test]
	fn colliding_attribute_names_are_rejected() {
		let err = TypeRegistry::builder()
			.register_kind(
				Kind::Expense,
				&[Attribute::int("owner"), Attribute::str("owner")],
			)
			.unwrap_err();
		assert_eq!(
			err,
			RegistrationError::DuplicateAttribute {
				kind: Kind::Expense,
				attribute: "owner",
			}
		);
	}

	#[test]
	fn attribute_lookup_is_per_kind() {
		let registry = TypeRegistry::standard().unwrap();
		assert_eq!(
			registry.attribute(Kind::Expense, "owner").map(|a| a.ty),
			Some(AttrType::Int)
		);
		assert!(registry.attribute(Kind::Organization, "owner").is_none());
		assert_eq!(
			registry.attribute(Kind::Guest, "authenticated").map(|a| a.ty),
			Some(AttrType::Bool)
		);
	}

	#[test]
	fn kinds_with_role_filters() {
		let registry = TypeRegistry::builder()
			.register::<User>()
			.unwrap()
			.register::<Expense>()
			.unwrap()
			.build();
		let actors: Vec<_> = registry.kinds_with_role(Role::Actor).collect();
		let resources: Vec<_> = registry.kinds_with_role(Role::Resource).collect();
		assert_eq!(actors, vec![Kind::User]);
		assert_eq!(resources, vec![Kind::Expense]);
	}

	#[test]
	fn kind_names_round_trip() {
		for kind in Kind::ALL {
			assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
		}
		assert_eq!(Kind::from_name("user"), None);
	}
}
