// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage tiers and the well-known keys the client reads and writes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Which web storage area to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreTier {
	/// Persistent, survives the browsing session.
	Local,
	/// Scoped to the tab/session.
	Session,
}

impl fmt::Display for StoreTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local => write!(f, "local"),
			Self::Session => write!(f, "session"),
		}
	}
}

impl FromStr for StoreTier {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"local" => Ok(Self::Local),
			"session" => Ok(Self::Session),
			_ => Err(CoreError::InvalidStoreTier(s.to_string())),
		}
	}
}

/// Session-tier key holding the externally provisioned session id.
pub const SESSION_ID_KEY: &str = "sessionId";

/// Cookie holding the locally generated user id.
pub const USER_ID_KEY: &str = "uid";

/// Default lifetime of the user id cookie, in days.
pub const USER_ID_TTL_DAYS: u32 = 180;
