// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tally_server_auth::Actor;

use crate::auth_middleware::CurrentActor;

/// GET / - greet the caller.
pub async fn hello(CurrentActor(actor): CurrentActor) -> String {
	greeting(&actor)
}

fn greeting(actor: &Actor) -> String {
	match actor.user().filter(|user| user.is_authenticated()) {
		Some(user) => format!("hello {}", user.email),
		None => "hello guest user".to_string(),
	}
}
