// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization configuration.

use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CREDENTIAL_HEADER: &str = "user";

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
	/// Request header carrying the caller's email. Lowercase.
	pub credential_header: String,
	/// Policy file to load instead of the built-in policy.
	pub policy_path: Option<PathBuf>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub credential_header: Option<String>,
	#[serde(default)]
	pub policy_path: Option<PathBuf>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.credential_header.is_some() {
			self.credential_header = other.credential_header;
		}
		if other.policy_path.is_some() {
			self.policy_path = other.policy_path;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			credential_header: self
				.credential_header
				.map(|h| h.trim().to_ascii_lowercase())
				.unwrap_or_else(|| DEFAULT_CREDENTIAL_HEADER.to_string()),
			policy_path: self.policy_path,
		}
	}
}
