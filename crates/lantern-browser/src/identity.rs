// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User and session identity.

use lantern_browser_core::{StoreTier, SESSION_ID_KEY, USER_ID_KEY, USER_ID_TTL_DAYS};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::Storage;

/// Resolves the user id (cookie-backed) and the session id (session storage).
#[derive(Clone)]
pub struct IdentityResolver {
	storage: Storage,
	user_id_ttl_days: u32,
}

impl IdentityResolver {
	pub fn new(storage: Storage) -> Self {
		Self {
			storage,
			user_id_ttl_days: USER_ID_TTL_DAYS,
		}
	}

	pub fn with_ttl_days(mut self, days: u32) -> Self {
		self.user_id_ttl_days = days;
		self
	}

	/// Returns the user id cookie, generating and persisting one if absent.
	///
	/// The cookie expiry is only set when a new id is generated.
	pub fn resolve_user_id(&self) -> String {
		let uid = self.storage.get_cookie(USER_ID_KEY);
		if !uid.is_empty() {
			return uid;
		}

		let uid = Uuid::new_v4().to_string();
		self.storage
			.set_cookie(USER_ID_KEY, &uid, self.user_id_ttl_days);
		info!(uid = %uid, ttl_days = self.user_id_ttl_days, "Generated user id");
		uid
	}

	/// Reads the session id. `None` means no session has been provisioned.
	pub fn resolve_session_id(&self) -> Option<String> {
		match self.storage.read(StoreTier::Session, SESSION_ID_KEY, true) {
			Value::String(s) if !s.is_empty() => Some(s),
			Value::Number(n) => Some(n.to_string()),
			_ => {
				debug!("No session id provisioned");
				None
			}
		}
	}
}
