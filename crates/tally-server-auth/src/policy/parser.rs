// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Line-oriented parser for policy text.
//!
//! ```text
//! statement := "allow" kind action kind [ "if" condition { "and" condition } ]
//! kind      := "*" | Ident
//! action    := "*" | String | "method" "(" Ident { "," Ident } ")"
//! condition := operand "==" operand | operand "matches" String
//! operand   := ("actor" | "resource") "." Ident | String | Int | "true" | "false"
//! ```
//!
//! Parsing checks every kind and attribute against the [`TypeRegistry`], so a
//! rule that parses is also a rule the evaluator can apply.

use http::Method;

use super::pattern::PathPattern;
use super::registry::{AttrType, Kind, Role, TypeRegistry, Value};
use super::rule::{ActionMatcher, Condition, KindMatcher, Operand, Rule};
use crate::error::{PolicyLoadError, PolicyLoadReason};

const HTTP_METHODS: [Method; 9] = [
	Method::GET,
	Method::HEAD,
	Method::POST,
	Method::PUT,
	Method::DELETE,
	Method::PATCH,
	Method::OPTIONS,
	Method::CONNECT,
	Method::TRACE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
	Word(String),
	Str(String),
	Int(i64),
	Star,
	Dot,
	Comma,
	LParen,
	RParen,
	EqEq,
}

impl TokenKind {
	fn describe(&self) -> String {
		match self {
			TokenKind::Word(w) => format!("'{w}'"),
			TokenKind::Str(s) => format!("string {s:?}"),
			TokenKind::Int(i) => format!("integer {i}"),
			TokenKind::Star => "'*'".to_string(),
			TokenKind::Dot => "'.'".to_string(),
			TokenKind::Comma => "','".to_string(),
			TokenKind::LParen => "'('".to_string(),
			TokenKind::RParen => "')'".to_string(),
			TokenKind::EqEq => "'=='".to_string(),
		}
	}
}

#[derive(Debug, Clone)]
struct Token {
	kind: TokenKind,
	column: usize,
}

/// Parse every statement in `text`, in source order.
pub fn parse_policy(text: &str, registry: &TypeRegistry) -> Result<Vec<Rule>, PolicyLoadError> {
	let mut rules = Vec::new();
	for (index, line) in text.lines().enumerate() {
		let line_no = index + 1;
		let tokens = tokenize(line).map_err(|(column, reason)| PolicyLoadError {
			line: line_no,
			column,
			reason,
		})?;
		if tokens.is_empty() {
			continue;
		}

		let end_column = line.chars().count() + 1;
		let mut parser = LineParser {
			registry,
			tokens,
			pos: 0,
			end_column,
		};
		let rule = parser.statement(line_no).map_err(|(column, reason)| PolicyLoadError {
			line: line_no,
			column,
			reason,
		})?;
		rules.push(rule);
	}
	Ok(rules)
}

type LineResult<T> = Result<T, (usize, PolicyLoadReason)>;

fn tokenize(line: &str) -> LineResult<Vec<Token>> {
	let chars: Vec<char> = line.chars().collect();
	let mut tokens = Vec::new();
	let mut i = 0;

	while i < chars.len() {
		let c = chars[i];
		let column = i + 1;

		if c.is_whitespace() {
			i += 1;
			continue;
		}
		if c == '#' {
			break;
		}

		let kind = match c {
			'*' => {
				i += 1;
				TokenKind::Star
			}
			'.' => {
				i += 1;
				TokenKind::Dot
			}
			',' => {
				i += 1;
				TokenKind::Comma
			}
			'(' => {
				i += 1;
				TokenKind::LParen
			}
			')' => {
				i += 1;
				TokenKind::RParen
			}
			'=' if chars.get(i + 1) == Some(&'=') => {
				i += 2;
				TokenKind::EqEq
			}
			'"' => {
				let mut value = String::new();
				i += 1;
				loop {
					match chars.get(i) {
						None => return Err((column, PolicyLoadReason::UnterminatedString)),
						Some('"') => {
							i += 1;
							break;
						}
						Some('\\') => match chars.get(i + 1) {
							Some(&escaped @ ('"' | '\\')) => {
								value.push(escaped);
								i += 2;
							}
							_ => return Err((i + 1, PolicyLoadReason::InvalidCharacter('\\'))),
						},
						Some(&other) => {
							value.push(other);
							i += 1;
						}
					}
				}
				TokenKind::Str(value)
			}
			c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
				let start = i;
				i += 1;
				while chars.get(i).is_some_and(char::is_ascii_digit) {
					i += 1;
				}
				let literal: String = chars[start..i].iter().collect();
				let value = literal
					.parse::<i64>()
					.map_err(|_| (column, PolicyLoadReason::IntegerOutOfRange(literal.clone())))?;
				TokenKind::Int(value)
			}
			c if c.is_ascii_alphabetic() || c == '_' => {
				let start = i;
				while chars
					.get(i)
					.is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
				{
					i += 1;
				}
				TokenKind::Word(chars[start..i].iter().collect())
			}
			other => return Err((column, PolicyLoadReason::InvalidCharacter(other))),
		};

		tokens.push(Token { kind, column });
	}

	Ok(tokens)
}

struct LineParser<'a> {
	registry: &'a TypeRegistry,
	tokens: Vec<Token>,
	pos: usize,
	end_column: usize,
}

/// Operand with its resolved type and the column it started at.
struct TypedOperand {
	operand: Operand,
	ty: AttrType,
	column: usize,
}

impl<'a> LineParser<'a> {
	fn statement(&mut self, line: usize) -> LineResult<Rule> {
		self.expect_word("allow", "'allow'")?;
		let actor = self.kind_matcher(Role::Actor)?;
		let (action, action_column) = self.action()?;
		let resource = self.kind_matcher(Role::Resource)?;

		if matches!(action, ActionMatcher::Method(_)) && resource != KindMatcher::Kind(Kind::Request) {
			return Err((action_column, PolicyLoadReason::MethodOnNonRequest));
		}

		let mut conditions = Vec::new();
		if self.peek_word("if") {
			self.pos += 1;
			conditions.push(self.condition(actor, resource)?);
			while self.peek_word("and") {
				self.pos += 1;
				conditions.push(self.condition(actor, resource)?);
			}
		}

		if let Some(token) = self.tokens.get(self.pos) {
			let expected = if conditions.is_empty() {
				"'if' or end of line"
			} else {
				"'and' or end of line"
			};
			return Err((
				token.column,
				PolicyLoadReason::UnexpectedToken {
					found: token.kind.describe(),
					expected,
				},
			));
		}

		Ok(Rule {
			line,
			actor,
			action,
			resource,
			conditions,
		})
	}

	fn kind_matcher(&mut self, role: Role) -> LineResult<KindMatcher> {
		let expected = match role {
			Role::Actor => "actor kind or '*'",
			Role::Resource => "resource kind or '*'",
		};
		let token = self.next(expected)?;
		match token.kind {
			TokenKind::Star => Ok(KindMatcher::Any),
			TokenKind::Word(name) => {
				let kind = Kind::from_name(&name)
					.ok_or((token.column, PolicyLoadReason::UnknownKind(name.clone())))?;
				if kind.role() != role {
					return Err((
						token.column,
						PolicyLoadReason::WrongRole {
							kind,
							expected: role,
						},
					));
				}
				if !self.registry.contains(kind) {
					return Err((token.column, PolicyLoadReason::UnregisteredKind(kind)));
				}
				Ok(KindMatcher::Kind(kind))
			}
			other => Err(unexpected(token.column, &other, expected)),
		}
	}

	fn action(&mut self) -> LineResult<(ActionMatcher, usize)> {
		let expected = "'*', a quoted action or method(...)";
		let token = self.next(expected)?;
		let matcher = match token.kind {
			TokenKind::Star => ActionMatcher::Any,
			TokenKind::Str(action) => ActionMatcher::Exact(action),
			TokenKind::Word(ref w) if w == "method" => {
				self.expect(TokenKind::LParen, "'('")?;
				let mut methods = vec![self.method()?];
				loop {
					let next = self.next("',' or ')'")?;
					match next.kind {
						TokenKind::Comma => methods.push(self.method()?),
						TokenKind::RParen => break,
						other => return Err(unexpected(next.column, &other, "',' or ')'")),
					}
				}
				ActionMatcher::Method(methods)
			}
			other => return Err(unexpected(token.column, &other, expected)),
		};
		Ok((matcher, token.column))
	}

	fn method(&mut self) -> LineResult<Method> {
		let token = self.next("HTTP method")?;
		match token.kind {
			TokenKind::Word(name) => HTTP_METHODS
				.iter()
				.find(|m| m.as_str() == name)
				.cloned()
				.ok_or((token.column, PolicyLoadReason::UnknownMethod(name))),
			other => Err(unexpected(token.column, &other, "HTTP method")),
		}
	}

	fn condition(&mut self, actor: KindMatcher, resource: KindMatcher) -> LineResult<Condition> {
		let left = self.operand(actor, resource)?;
		let token = self.next("'==' or 'matches'")?;
		match token.kind {
			TokenKind::EqEq => {
				let right = self.operand(actor, resource)?;
				if matches!(left.operand, Operand::Literal(_))
					&& matches!(right.operand, Operand::Literal(_))
				{
					return Err((left.column, PolicyLoadReason::ConstantCondition));
				}
				if left.ty != right.ty {
					return Err((
						right.column,
						PolicyLoadReason::TypeMismatch {
							left: left.ty,
							right: right.ty,
						},
					));
				}
				Ok(Condition::Equals {
					left: left.operand,
					right: right.operand,
				})
			}
			TokenKind::Word(ref w) if w == "matches" => {
				if matches!(left.operand, Operand::Literal(_)) || left.ty != AttrType::Str {
					return Err((left.column, PolicyLoadReason::MatchOnNonString));
				}
				let pattern_token = self.next("quoted path pattern")?;
				let raw = match pattern_token.kind {
					TokenKind::Str(raw) => raw,
					other => return Err(unexpected(pattern_token.column, &other, "quoted path pattern")),
				};
				let pattern = PathPattern::parse(&raw).map_err(|message| {
					(
						pattern_token.column,
						PolicyLoadReason::InvalidPathPattern {
							pattern: raw.clone(),
							message,
						},
					)
				})?;
				Ok(Condition::Matches {
					operand: left.operand,
					pattern,
				})
			}
			other => Err(unexpected(token.column, &other, "'==' or 'matches'")),
		}
	}

	fn operand(&mut self, actor: KindMatcher, resource: KindMatcher) -> LineResult<TypedOperand> {
		let expected = "actor.<attribute>, resource.<attribute> or a literal";
		let token = self.next(expected)?;
		let column = token.column;
		let (operand, ty) = match token.kind {
			TokenKind::Str(s) => (Operand::Literal(Value::Str(s)), AttrType::Str),
			TokenKind::Int(i) => (Operand::Literal(Value::Int(i)), AttrType::Int),
			TokenKind::Word(ref w) if w == "true" => (Operand::Literal(Value::Bool(true)), AttrType::Bool),
			TokenKind::Word(ref w) if w == "false" => {
				(Operand::Literal(Value::Bool(false)), AttrType::Bool)
			}
			TokenKind::Word(ref w) if w == "actor" || w == "resource" => {
				let (role, matcher) = if w == "actor" {
					(Role::Actor, actor)
				} else {
					(Role::Resource, resource)
				};
				self.expect(TokenKind::Dot, "'.'")?;
				let name_token = self.next("attribute name")?;
				let name = match name_token.kind {
					TokenKind::Word(name) => name,
					other => return Err(unexpected(name_token.column, &other, "attribute name")),
				};
				let ty = self.attribute_type(role, matcher, &name, name_token.column)?;
				let operand = match role {
					Role::Actor => Operand::Actor(name),
					Role::Resource => Operand::Resource(name),
				};
				(operand, ty)
			}
			other => return Err(unexpected(column, &other, expected)),
		};
		Ok(TypedOperand {
			operand,
			ty,
			column,
		})
	}

	/// Resolve the declared type of `role.name` for the rule's kind matcher.
	/// A wildcard matcher requires the attribute on every registered kind of
	/// that role, with a single type.
	fn attribute_type(
		&self,
		role: Role,
		matcher: KindMatcher,
		name: &str,
		column: usize,
	) -> LineResult<AttrType> {
		match matcher {
			KindMatcher::Kind(kind) => self
				.registry
				.attribute(kind, name)
				.map(|a| a.ty)
				.ok_or_else(|| {
					(
						column,
						PolicyLoadReason::UnknownAttribute {
							target: kind.to_string(),
							attribute: name.to_string(),
						},
					)
				}),
			KindMatcher::Any => {
				let mut resolved: Option<AttrType> = None;
				let unknown = || {
					(
						column,
						PolicyLoadReason::UnknownAttribute {
							target: format!("every {role} kind"),
							attribute: name.to_string(),
						},
					)
				};
				for kind in self.registry.kinds_with_role(role) {
					let ty = self.registry.attribute(kind, name).ok_or_else(unknown)?.ty;
					match resolved {
						Some(existing) if existing != ty => {
							return Err((
								column,
								PolicyLoadReason::AmbiguousAttribute {
									role,
									attribute: name.to_string(),
								},
							));
						}
						_ => resolved = Some(ty),
					}
				}
				resolved.ok_or_else(unknown)
			}
		}
	}

	fn next(&mut self, expected: &'static str) -> LineResult<Token> {
		match self.tokens.get(self.pos) {
			Some(token) => {
				self.pos += 1;
				Ok(token.clone())
			}
			None => Err((
				self.end_column,
				PolicyLoadReason::UnexpectedToken {
					found: "end of line".to_string(),
					expected,
				},
			)),
		}
	}

	fn expect(&mut self, kind: TokenKind, expected: &'static str) -> LineResult<()> {
		let token = self.next(expected)?;
		if token.kind == kind {
			Ok(())
		} else {
			Err(unexpected(token.column, &token.kind, expected))
		}
	}

	fn expect_word(&mut self, word: &str, expected: &'static str) -> LineResult<()> {
		let token = self.next(expected)?;
		match token.kind {
			TokenKind::Word(ref w) if w == word => Ok(()),
			other => Err(unexpected(token.column, &other, expected)),
		}
	}

	fn peek_word(&self, word: &str) -> bool {
		matches!(self.tokens.get(self.pos), Some(Token { kind: TokenKind::Word(w), .. }) if w == word)
	}
}

fn unexpected(column: usize, found: &TokenKind, expected: &'static str) -> (usize, PolicyLoadReason) {
	(
		column,
		PolicyLoadReason::UnexpectedToken {
			found: found.describe(),
			expected,
		},
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry() -> TypeRegistry {
		TypeRegistry::standard().unwrap()
	}

	fn parse(text: &str) -> Result<Vec<Rule>, PolicyLoadError> {
		parse_policy(text, &registry())
	}

	fn reason(text: &str) -> PolicyLoadReason {
		parse(text).unwrap_err().reason
	}

	#[test]
	fn parses_ownership_rule() {
		let rules = parse(r#"allow User "read" Expense if actor.id == resource.owner"#).unwrap();
		assert_eq!(rules.len(), 1);
		let rule = &rules[0];
		assert_eq!(rule.line, 1);
		assert_eq!(rule.actor, KindMatcher::Kind(Kind::User));
		assert_eq!(rule.action, ActionMatcher::Exact("read".to_string()));
		assert_eq!(rule.resource, KindMatcher::Kind(Kind::Expense));
		assert_eq!(
			rule.conditions,
			vec![Condition::Equals {
				left: Operand::Actor("id".to_string()),
				right: Operand::Resource("owner".to_string()),
			}]
		);
	}

	#[test]
	fn parses_method_and_path_rule() {
		let rules = parse(
			r#"allow * method(GET, HEAD) Request if resource.path matches "/whoami" # trailing comment"#,
		)
		.unwrap();
		let rule = &rules[0];
		assert_eq!(rule.actor, KindMatcher::Any);
		assert_eq!(rule.action, ActionMatcher::Method(vec![Method::GET, Method::HEAD]));
		assert!(matches!(
			&rule.conditions[0],
			Condition::Matches { pattern, .. } if pattern.as_str() == "/whoami"
		));
	}

	#[test]
	fn skips_comments_and_blank_lines_but_keeps_line_numbers() {
		let text = "# header\n\n   \nallow * * *\n";
		let rules = parse(text).unwrap();
		assert_eq!(rules.len(), 1);
		assert_eq!(rules[0].line, 4);
	}

	#[test]
	fn literal_operands() {
		let rules = parse(
			r#"allow User "read" Expense if actor.authenticated == true and resource.amount == -5 and resource.description == "a \"quoted\" word""#,
		)
		.unwrap();
		let conditions = &rules[0].conditions;
		assert_eq!(conditions.len(), 3);
		assert_eq!(
			conditions[2],
			Condition::Equals {
				left: Operand::Resource("description".to_string()),
				right: Operand::Literal(Value::Str("a \"quoted\" word".to_string())),
			}
		);
	}

	#[test]
	fn error_positions_point_at_the_token() {
		let err = parse("allow * * *\nallow Invoice \"read\" Expense").unwrap_err();
		assert_eq!(err.line, 2);
		assert_eq!(err.column, 7);
		assert_eq!(err.reason, PolicyLoadReason::UnknownKind("Invoice".to_string()));
	}

	#[test]
	fn rejects_missing_allow() {
		assert!(matches!(
			reason("deny * * *"),
			PolicyLoadReason::UnexpectedToken { .. }
		));
	}

	#[test]
	fn rejects_truncated_statement() {
		let err = parse("allow User \"read\"").unwrap_err();
		assert_eq!(err.column, 18);
		assert!(matches!(
			err.reason,
			PolicyLoadReason::UnexpectedToken { ref found, .. } if found == "end of line"
		));
	}

	#[test]
	fn rejects_trailing_tokens() {
		assert!(matches!(
			reason("allow * * * extra"),
			PolicyLoadReason::UnexpectedToken { expected: "'if' or end of line", .. }
		));
	}

	#[test]
	fn rejects_unterminated_string() {
		assert_eq!(reason("allow * \"read *"), PolicyLoadReason::UnterminatedString);
	}

	#[test]
	fn rejects_invalid_character() {
		assert_eq!(reason("allow * * * if actor.id = 1"), PolicyLoadReason::InvalidCharacter('='));
	}

	#[test]
	fn rejects_role_mismatch() {
		assert_eq!(
			reason("allow Expense * *"),
			PolicyLoadReason::WrongRole {
				kind: Kind::Expense,
				expected: Role::Actor,
			}
		);
	}

	#[test]
	fn rejects_unregistered_kind() {
		let registry = TypeRegistry::builder()
			.register::<crate::model::User>()
			.unwrap()
			.build();
		let err = parse_policy("allow User * Expense", &registry).unwrap_err();
		assert_eq!(err.reason, PolicyLoadReason::UnregisteredKind(Kind::Expense));
	}

	#[test]
	fn rejects_unknown_attribute() {
		assert_eq!(
			reason(r#"allow User "read" Organization if actor.id == resource.owner"#),
			PolicyLoadReason::UnknownAttribute {
				target: "Organization".to_string(),
				attribute: "owner".to_string(),
			}
		);
	}

	#[test]
	fn wildcard_attribute_must_exist_on_every_kind() {
		assert_eq!(
			reason(r#"allow * "read" Expense if actor.id == resource.owner"#),
			PolicyLoadReason::UnknownAttribute {
				target: "every actor kind".to_string(),
				attribute: "id".to_string(),
			}
		);
		assert!(parse(r#"allow * * Request if actor.authenticated == false"#).is_ok());
	}

	#[test]
	fn wildcard_attribute_must_have_one_type() {
		use crate::policy::Attribute;

		let registry = TypeRegistry::builder()
			.register_kind(Kind::User, &[Attribute::int("level")])
			.unwrap()
			.register_kind(Kind::Guest, &[Attribute::str("level")])
			.unwrap()
			.register_kind(Kind::Expense, &[Attribute::int("amount")])
			.unwrap()
			.build();
		let err = parse_policy(r#"allow * "read" Expense if actor.level == 1"#, &registry)
			.unwrap_err();
		assert_eq!(err.line, 1);
		assert_eq!(
			err.reason,
			PolicyLoadReason::AmbiguousAttribute {
				role: Role::Actor,
				attribute: "level".to_string(),
			}
		);

		assert!(parse_policy(r#"allow User "read" Expense if actor.level == 1"#, &registry).is_ok());
	}

	#[test]
	fn rejects_type_mismatch() {
		assert_eq!(
			reason(r#"allow User * Expense if actor.email == resource.owner"#),
			PolicyLoadReason::TypeMismatch {
				left: AttrType::Str,
				right: AttrType::Int,
			}
		);
	}

	#[test]
	fn rejects_constant_condition() {
		assert_eq!(reason("allow * * * if 1 == 1"), PolicyLoadReason::ConstantCondition);
	}

	#[test]
	fn rejects_match_on_non_string() {
		assert_eq!(
			reason(r#"allow User * Expense if resource.owner matches "/1""#),
			PolicyLoadReason::MatchOnNonString
		);
	}

	#[test]
	fn rejects_invalid_pattern() {
		assert!(matches!(
			reason(r#"allow * method(GET) Request if resource.path matches "no-slash""#),
			PolicyLoadReason::InvalidPathPattern { .. }
		));
	}

	#[test]
	fn rejects_unknown_method() {
		assert_eq!(
			reason("allow * method(FETCH) Request"),
			PolicyLoadReason::UnknownMethod("FETCH".to_string())
		);
	}

	#[test]
	fn rejects_method_on_non_request() {
		let err = parse("allow User method(GET) Expense").unwrap_err();
		assert_eq!(err.reason, PolicyLoadReason::MethodOnNonRequest);
		assert_eq!(err.column, 12);
	}

	#[test]
	fn rejects_integer_overflow() {
		assert!(matches!(
			reason("allow User * Expense if resource.amount == 99999999999999999999"),
			PolicyLoadReason::IntegerOutOfRange(_)
		));
	}
}
