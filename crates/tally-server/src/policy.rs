// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Startup loading of the authorization policy.

use std::path::{Path, PathBuf};

use tally_server_auth::{AuthSetupError, DecisionService, DEFAULT_POLICY};
use tally_server_config::AuthConfig;

/// Errors that stop the server from starting with a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
	#[error("failed to read policy file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid policy in {origin}: {source}")]
	Setup {
		origin: String,
		#[source]
		source: AuthSetupError,
	},
}

/// Build the decision service from the configured policy file, or from the
/// built-in policy when none is configured.
pub fn load_decisions(config: &AuthConfig) -> Result<DecisionService, PolicyError> {
	match &config.policy_path {
		Some(path) => load_policy_file(path),
		None => {
			let decisions = DecisionService::standard(DEFAULT_POLICY).map_err(|source| {
				PolicyError::Setup {
					origin: "built-in policy".to_string(),
					source,
				}
			})?;
			tracing::info!(rules = decisions.policy().len(), "loaded built-in policy");
			Ok(decisions)
		}
	}
}

/// Load and validate a policy file against the standard registry.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_policy_file(path: &Path) -> Result<DecisionService, PolicyError> {
	let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
		path: path.to_path_buf(),
		source,
	})?;
	let decisions = DecisionService::standard(&text).map_err(|source| PolicyError::Setup {
		origin: path.display().to_string(),
		source,
	})?;
	tracing::info!(rules = decisions.policy().len(), "loaded policy file");
	Ok(decisions)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn policy_file(text: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(text.as_bytes()).unwrap();
		file
	}

	#[test]
	fn defaults_to_built_in_policy() {
		let decisions = load_decisions(&AuthConfig::default()).unwrap();
		assert_eq!(
			decisions.policy().len(),
			DecisionService::standard(DEFAULT_POLICY).unwrap().policy().len()
		);
	}

	#[test]
	fn configured_file_replaces_built_in_policy() {
		let file = policy_file("allow * method(GET) Request\n");
		let config = AuthConfig {
			policy_path: Some(file.path().to_path_buf()),
			..AuthConfig::default()
		};
		assert_eq!(load_decisions(&config).unwrap().policy().len(), 1);
	}

	#[test]
	fn missing_file_is_a_read_error() {
		let err = load_policy_file(Path::new("/nonexistent/tally.policy")).unwrap_err();
		assert!(matches!(err, PolicyError::Read { .. }));
	}

	#[test]
	fn invalid_policy_reports_its_origin() {
		let file = policy_file("allow * method(GET) Request\nallow Nobody * *\n");
		let err = load_policy_file(file.path()).unwrap_err();
		match err {
			PolicyError::Setup {
				origin,
				source: AuthSetupError::Policy(load),
			} => {
				assert_eq!(origin, file.path().display().to_string());
				assert_eq!(load.line, 2);
			}
			other => panic!("unexpected error: {other}"),
		}
	}
}
