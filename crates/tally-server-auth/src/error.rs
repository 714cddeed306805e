// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for registry construction, policy loading and evaluation.
//!
//! Registration and load errors are startup errors: the server refuses to run
//! with them. [`EvaluationError`] never leaves the crate through the public
//! decision API; [`crate::DecisionService`] logs it and denies.

use crate::policy::{AttrType, Kind, Role};

/// Conflicting registration in the type registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
	#[error("kind {0} is already registered")]
	DuplicateKind(Kind),

	#[error("attribute '{attribute}' is declared more than once on {kind}")]
	DuplicateAttribute {
		kind: Kind,
		attribute: &'static str,
	},
}

/// Malformed policy text, reported with its position.
///
/// `line` and `column` are 1-based. `column` points at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("policy error at line {line}, column {column}: {reason}")]
pub struct PolicyLoadError {
	pub line: usize,
	pub column: usize,
	pub reason: PolicyLoadReason,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyLoadReason {
	#[error("unexpected {found}, expected {expected}")]
	UnexpectedToken {
		found: String,
		expected: &'static str,
	},

	#[error("unterminated string literal")]
	UnterminatedString,

	#[error("invalid character '{0}'")]
	InvalidCharacter(char),

	#[error("integer literal out of range: {0}")]
	IntegerOutOfRange(String),

	#[error("unknown kind '{0}'")]
	UnknownKind(String),

	#[error("kind {0} is not registered")]
	UnregisteredKind(Kind),

	#[error("kind {kind} cannot be used as {expected}")]
	WrongRole { kind: Kind, expected: Role },

	#[error("attribute '{attribute}' is not registered for {target}")]
	UnknownAttribute { target: String, attribute: String },

	#[error("attribute '{attribute}' has different types across {role} kinds")]
	AmbiguousAttribute { role: Role, attribute: String },

	#[error("cannot compare {left} with {right}")]
	TypeMismatch { left: AttrType, right: AttrType },

	#[error("condition compares two literals")]
	ConstantCondition,

	#[error("'matches' requires a string attribute")]
	MatchOnNonString,

	#[error("invalid path pattern \"{pattern}\": {message}")]
	InvalidPathPattern {
		pattern: String,
		message: &'static str,
	},

	#[error("unknown HTTP method '{0}'")]
	UnknownMethod(String),

	#[error("method actions apply only to Request resources")]
	MethodOnNonRequest,
}

/// Internal fault while evaluating rules against concrete entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
	#[error("kind {0} is not registered")]
	UnregisteredKind(Kind),

	#[error("{kind} has no value for attribute '{attribute}'")]
	MissingAttribute { kind: Kind, attribute: String },

	#[error("type mismatch: {left} compared with {right}")]
	TypeMismatch { left: AttrType, right: AttrType },
}

/// Startup failure while building a [`crate::DecisionService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthSetupError {
	#[error(transparent)]
	Registration(#[from] RegistrationError),

	#[error(transparent)]
	Policy(#[from] PolicyLoadError),
}
