// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The enriched payload and the builder that assembles it.
//!
//! A payload is merged from three field groups in fixed precedence:
//!
//! | group | keys | when |
//! |-------|------|------|
//! | base | `sid`, `uid`, `p`, `url` | always |
//! | snapshot | `ttl`, `lan`, `ua`, `ws`, `ds` | load stage only |
//! | raw | whatever the plugin produced | always, applied last |
//!
//! Later groups overwrite earlier ones on key collision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::event::{PlatformType, RawEvent};

/// Width and height in CSS pixels, rendered as `WxH` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
	pub width: u32,
	pub height: u32,
}

impl Dimensions {
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Per-axis fallback: each zero axis takes the value from `other`.
	pub fn or_axes(self, other: Dimensions) -> Self {
		Self {
			width: if self.width == 0 { other.width } else { self.width },
			height: if self.height == 0 { other.height } else { self.height },
		}
	}
}

impl fmt::Display for Dimensions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}

impl FromStr for Dimensions {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (w, h) = s
			.split_once('x')
			.ok_or_else(|| CoreError::InvalidDimensions(s.to_string()))?;
		let width = w
			.parse()
			.map_err(|_| CoreError::InvalidDimensions(s.to_string()))?;
		let height = h
			.parse()
			.map_err(|_| CoreError::InvalidDimensions(s.to_string()))?;
		Ok(Self { width, height })
	}
}

impl Serialize for Dimensions {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Dimensions {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Identity and location fields present on every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePayload {
	/// Session id.
	pub sid: String,
	/// User id.
	pub uid: String,
	#[serde(rename = "p")]
	pub platform: PlatformType,
	pub url: String,
}

/// One-time environment snapshot attached to load-stage events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
	#[serde(rename = "ttl")]
	pub title: String,
	#[serde(rename = "lan")]
	pub language: String,
	#[serde(rename = "ua")]
	pub user_agent: String,
	#[serde(rename = "ws")]
	pub viewport_size: Dimensions,
	#[serde(rename = "ds")]
	pub document_size: Dimensions,
}

/// Builder merging base, snapshot and raw field groups.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
	base: BasePayload,
	snapshot: Option<ClientInfo>,
	raw: RawEvent,
}

impl PayloadBuilder {
	pub fn new(base: BasePayload) -> Self {
		Self {
			base,
			snapshot: None,
			raw: RawEvent::new(),
		}
	}

	pub fn snapshot(mut self, snapshot: Option<ClientInfo>) -> Self {
		self.snapshot = snapshot;
		self
	}

	pub fn raw(mut self, raw: RawEvent) -> Self {
		self.raw = raw;
		self
	}

	pub fn build(self) -> EnrichedPayload {
		let mut fields = Map::new();
		merge_into(&mut fields, &self.base);
		if let Some(snapshot) = &self.snapshot {
			merge_into(&mut fields, snapshot);
		}
		fields.extend(self.raw.into_map());
		EnrichedPayload(fields)
	}
}

fn merge_into<T: Serialize>(fields: &mut Map<String, Value>, group: &T) {
	// Both groups are plain structs of strings, so this cannot fail.
	if let Ok(Value::Object(map)) = serde_json::to_value(group) {
		fields.extend(map);
	}
}

/// A payload ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichedPayload(Map<String, Value>);

impl EnrichedPayload {
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<EnrichedPayload> for Value {
	fn from(payload: EnrichedPayload) -> Self {
		payload.into_value()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	fn base() -> BasePayload {
		BasePayload {
			sid: "sess-1".to_string(),
			uid: "user-1".to_string(),
			platform: PlatformType::Browser,
			url: "https://example.com/".to_string(),
		}
	}

	fn snapshot() -> ClientInfo {
		ClientInfo {
			title: "Home".to_string(),
			language: "en-US".to_string(),
			user_agent: "Mozilla/5.0".to_string(),
			viewport_size: Dimensions::new(1280, 720),
			document_size: Dimensions::new(1280, 2400),
		}
	}

	#[test]
	fn test_base_only() {
		let payload = PayloadBuilder::new(base()).build();
		assert_eq!(
			payload.into_value(),
			json!({"sid": "sess-1", "uid": "user-1", "p": "browser", "url": "https://example.com/"})
		);
	}

	#[test]
	fn test_snapshot_fields_use_wire_keys() {
		let payload = PayloadBuilder::new(base()).snapshot(Some(snapshot())).build();
		assert_eq!(payload.get_str("ttl"), Some("Home"));
		assert_eq!(payload.get_str("lan"), Some("en-US"));
		assert_eq!(payload.get_str("ua"), Some("Mozilla/5.0"));
		assert_eq!(payload.get_str("ws"), Some("1280x720"));
		assert_eq!(payload.get_str("ds"), Some("1280x2400"));
		assert_eq!(payload.len(), 9);
	}

	#[test]
	fn test_raw_wins_on_collision() {
		let raw = RawEvent::from(json!({"url": "override", "ttl": "raw title", "t": "x"}));
		let payload = PayloadBuilder::new(base())
			.snapshot(Some(snapshot()))
			.raw(raw)
			.build();
		assert_eq!(payload.get_str("url"), Some("override"));
		assert_eq!(payload.get_str("ttl"), Some("raw title"));
		assert_eq!(payload.get_str("sid"), Some("sess-1"));
	}

	#[test]
	fn test_dimensions_axis_fallback() {
		let doc = Dimensions::new(0, 900);
		let body = Dimensions::new(1024, 768);
		assert_eq!(doc.or_axes(body), Dimensions::new(1024, 900));
	}

	#[test]
	fn test_dimensions_parse_rejects_garbage() {
		assert!("1024".parse::<Dimensions>().is_err());
		assert!("axb".parse::<Dimensions>().is_err());
	}

	proptest! {
		#[test]
		fn dimensions_display_parse(w in 0u32..10_000, h in 0u32..10_000) {
			let dims = Dimensions::new(w, h);
			let parsed: Dimensions = dims.to_string().parse().unwrap();
			prop_assert_eq!(dims, parsed);
		}

		#[test]
		fn raw_keys_always_survive(key in "[a-z]{1,6}", value in "[a-z0-9]{0,12}") {
			let raw = RawEvent::new().insert(key.clone(), value.clone());
			let payload = PayloadBuilder::new(base()).snapshot(Some(snapshot())).raw(raw).build();
			prop_assert_eq!(payload.get_str(&key), Some(value.as_str()));
		}
	}
}
