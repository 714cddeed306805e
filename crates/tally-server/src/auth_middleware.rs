// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and route-level authorization middleware.
//!
//! Every request passes through two stages before reaching a handler:
//!
//! 1. [`authenticate_layer`] resolves the credential header to an
//!    [`Actor`] and stores it as a [`RequestScope`] extension.
//! 2. [`AuthorizeRequest`] asks the policy whether that actor may send this
//!    method to this path. Denials end the request with a plain-text 403.
//!
//! Handlers read the resolved actor through the [`CurrentActor`] extractor
//! and make their own record-level decisions.
//!
//! # Example
//!
//! ```ignore
//! use axum::middleware::from_fn_with_state;
//!
//! Router::new()
//!     .route("/", get(hello))
//!     .layer(authorize_layer(decisions))
//!     .layer(from_fn_with_state(state, authenticate_layer));
//! ```

use std::{
	convert::Infallible,
	future::Future,
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
};
use pin_project_lite::pin_project;
use tally_server_auth::{extract_credential, Actor, Authorizer, InboundRequest, RequestScope, Resource};
use tower::{Layer, Service};
use tracing::instrument;

use crate::{api::AppState, error::forbidden_response};

/// Authentication middleware: attaches a [`RequestScope`] to every request.
///
/// Unknown credentials and store failures both leave the caller a guest;
/// the request always proceeds to authorization.
#[instrument(
	name = "authenticate_layer",
	skip(state, request, next),
	fields(user_id = tracing::field::Empty)
)]
pub async fn authenticate_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let scope = match extract_credential(request.headers(), &state.credential_header) {
		Some(email) => match state.store.user_by_email(&email).await {
			Ok(Some(user)) => {
				tracing::Span::current().record("user_id", tracing::field::display(&user.id));
				tracing::debug!(email = %email, "authenticated");
				RequestScope::authenticated(user)
			}
			Ok(None) => {
				tracing::debug!(email = %email, "unknown credential; continuing as guest");
				RequestScope::guest()
			}
			Err(e) => {
				tracing::warn!(email = %email, error = %e, "user lookup failed; continuing as guest");
				RequestScope::guest()
			}
		},
		None => RequestScope::guest(),
	};

	request.extensions_mut().insert(scope);
	next.run(request).await
}

/// Route-level authorization layer.
///
/// Builds an [`InboundRequest`] resource from the method and path and asks
/// the [`Authorizer`] whether the scoped actor may perform the method on it.
/// A request without a [`RequestScope`] is evaluated as a guest.
#[derive(Clone)]
pub struct AuthorizeRequest {
	decisions: Arc<dyn Authorizer>,
}

impl AuthorizeRequest {
	pub fn new(decisions: Arc<dyn Authorizer>) -> Self {
		Self { decisions }
	}
}

impl<S> Layer<S> for AuthorizeRequest {
	type Service = AuthorizeRequestService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthorizeRequestService {
			inner,
			decisions: Arc::clone(&self.decisions),
		}
	}
}

/// Route-level authorization backed by `decisions`.
pub fn authorize_layer(decisions: Arc<dyn Authorizer>) -> AuthorizeRequest {
	AuthorizeRequest::new(decisions)
}

/// Service wrapper for [`AuthorizeRequest`].
#[derive(Clone)]
pub struct AuthorizeRequestService<S> {
	inner: S,
	decisions: Arc<dyn Authorizer>,
}

impl<S> Service<Request<Body>> for AuthorizeRequestService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = AuthorizeRequestFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let actor = req
			.extensions()
			.get::<RequestScope>()
			.map(|scope| scope.actor.clone())
			.unwrap_or_default();

		let method = req.method().clone();
		let resource = Resource::Request(InboundRequest::new(method.clone(), req.uri().path()));

		if !self.decisions.authorize(&actor, method.as_str(), &resource) {
			tracing::info!(
				actor = %actor,
				method = %method,
				path = %req.uri().path(),
				"request denied by policy"
			);
			return AuthorizeRequestFuture::Rejected {
				resp: Some(forbidden_response()),
			};
		}

		AuthorizeRequestFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`AuthorizeRequestService`].
	#[project = AuthorizeRequestFutureProj]
	pub enum AuthorizeRequestFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for AuthorizeRequestFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			AuthorizeRequestFutureProj::Inner { fut } => fut.poll(cx),
			// A second poll after completion gets another 403 rather than a panic.
			AuthorizeRequestFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().unwrap_or_else(forbidden_response)))
			}
		}
	}
}

/// Extractor for the actor resolved by [`authenticate_layer`].
///
/// Never rejects: a missing scope yields [`Actor::Guest`].
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
	pub fn into_scope(self) -> RequestScope {
		RequestScope { actor: self.0 }
	}
}

impl<S> FromRequestParts<S> for CurrentActor
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	#[instrument(name = "CurrentActor::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let scope = parts
			.extensions
			.get::<RequestScope>()
			.cloned()
			.unwrap_or_default();
		Ok(CurrentActor(scope.actor))
	}
}
