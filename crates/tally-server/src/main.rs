// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tally expense server binary.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderName;
use clap::{Parser, Subcommand};
use tally_server::{
	create_router,
	db::{create_pool, run_migrations, EntityRepository},
	load_decisions, load_policy_file, version, AppState,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tally server - expense tracking with policy-based authorization.
#[derive(Parser, Debug)]
#[command(name = "tally-server", about = "Tally expense server", version)]
struct Args {
	/// Config file to use instead of /etc/tally/server.toml
	#[arg(long, env = "TALLY_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Validate a policy file and exit
	CheckPolicy {
		/// Policy file to validate
		file: PathBuf,
	},
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	match args.command {
		Some(Command::Version) => {
			println!("{}", version::format_version_info());
			return Ok(());
		}
		Some(Command::CheckPolicy { file }) => {
			let decisions = load_policy_file(&file)?;
			println!(
				"{}: ok ({} rules)",
				file.display(),
				decisions.policy().len()
			);
			return Ok(());
		}
		None => {}
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => tally_server_config::load_config_with_file(path)?,
		None => tally_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		credential_header = %config.auth.credential_header,
		"starting tally-server"
	);

	let decisions = Arc::new(load_decisions(&config.auth)?);

	let pool = create_pool(&config.database.url).await?;
	run_migrations(&pool).await?;
	let store = Arc::new(EntityRepository::new(pool));

	let credential_header = HeaderName::from_bytes(config.auth.credential_header.as_bytes())?;
	let state = AppState::new(decisions, store).with_credential_header(credential_header);
	let app = create_router(state).layer(TraceLayer::new_for_http());

	let listener = tokio::net::TcpListener::bind(&config.socket_addr()).await?;
	tracing::info!(addr = %config.socket_addr(), "listening");

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
				return Err(e.into());
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
		}
	}

	tracing::info!("tally-server stopped");
	Ok(())
}
