// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Path patterns used by `matches` conditions.
//!
//! Supported segments:
//! - literal segments (`expenses`)
//! - `{name}` placeholders, which match a non-empty run of ASCII digits
//! - a final `*`, which matches zero or more remaining segments
//!
//! A numeric placeholder never matches a literal word, so `/expenses/{id}`
//! and `/expenses/submit` are disjoint.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	NumericId,
}

/// A parsed, validated path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
	raw: String,
	segments: Vec<Segment>,
	trailing_wildcard: bool,
}

impl PathPattern {
	/// Parse a pattern. The error is a short description of what is wrong.
	pub fn parse(raw: &str) -> Result<Self, &'static str> {
		let Some(rest) = raw.strip_prefix('/') else {
			return Err("pattern must start with '/'");
		};

		let mut segments = Vec::new();
		let mut trailing_wildcard = false;

		if !rest.is_empty() {
			let parts: Vec<&str> = rest.split('/').collect();
			for (i, part) in parts.iter().enumerate() {
				let is_last = i + 1 == parts.len();
				if part.is_empty() {
					return Err("empty path segment");
				}
				if *part == "*" {
					if !is_last {
						return Err("'*' is only allowed as the final segment");
					}
					trailing_wildcard = true;
				} else if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
					if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
						return Err("placeholder names must be alphanumeric");
					}
					segments.push(Segment::NumericId);
				} else if part.contains(['{', '}', '*']) {
					return Err("segments may not mix literals with placeholders or wildcards");
				} else {
					segments.push(Segment::Literal((*part).to_string()));
				}
			}
		}

		Ok(Self {
			raw: raw.to_string(),
			segments,
			trailing_wildcard,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Match a request path. A single trailing slash on a non-root path is
	/// ignored; any other empty segment (`//`) never matches.
	pub fn matches(&self, path: &str) -> bool {
		if path == "/" {
			return self.segments.is_empty();
		}
		let Some(rest) = path.strip_prefix('/') else {
			return false;
		};
		let rest = rest.strip_suffix('/').unwrap_or(rest);
		if rest.is_empty() {
			return false;
		}

		let parts: Vec<&str> = rest.split('/').collect();
		if parts.iter().any(|part| part.is_empty()) {
			return false;
		}

		if self.trailing_wildcard {
			if parts.len() < self.segments.len() {
				return false;
			}
		} else if parts.len() != self.segments.len() {
			return false;
		}

		self
			.segments
			.iter()
			.zip(&parts)
			.all(|(segment, part)| match segment {
				Segment::Literal(literal) => literal == part,
				Segment::NumericId => !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()),
			})
	}
}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}
