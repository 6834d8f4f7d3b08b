// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application descriptor sent with the registration handshake.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Describes the reporting application.
///
/// `name` identifies the app to the collector and is omitted from the
/// registration query when empty. Any further fields are passed through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppDescriptor {
	#[serde(default)]
	pub name: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl AppDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			extra: Map::new(),
		}
	}

	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	/// Registration query: `{id, ...app}`. App fields win on collision and an
	/// empty `name` is left out.
	pub fn registration_query(&self, request_id: RequestId) -> Map<String, Value> {
		let mut query = Map::new();
		query.insert("id".to_string(), Value::String(request_id.to_string()));
		if !self.name.is_empty() {
			query.insert("name".to_string(), Value::String(self.name.clone()));
		}
		query.extend(self.extra.clone());
		query
	}
}

/// Identifier for a single registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for RequestId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for RequestId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}
