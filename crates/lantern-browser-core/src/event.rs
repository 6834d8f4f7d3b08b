// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raw event records and the enums that tag them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Caller intent for how a report should be delivered.
///
/// The selector may still downgrade the hint when the host lacks beacon
/// support; see `lantern_browser::transport::select_transport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
	#[default]
	Beacon,
	Img,
	Post,
	Get,
}

impl fmt::Display for ReportType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Beacon => write!(f, "beacon"),
			Self::Img => write!(f, "img"),
			Self::Post => write!(f, "post"),
			Self::Get => write!(f, "get"),
		}
	}
}

impl FromStr for ReportType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"beacon" => Ok(Self::Beacon),
			"img" => Ok(Self::Img),
			"post" => Ok(Self::Post),
			"get" => Ok(Self::Get),
			_ => Err(CoreError::InvalidReportType(s.to_string())),
		}
	}
}

/// Page lifecycle stage carried at `dat.st` of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLifeType {
	Load,
	Unload,
}

impl PageLifeType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Load => "load",
			Self::Unload => "unload",
		}
	}
}

impl fmt::Display for PageLifeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PageLifeType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"load" => Ok(Self::Load),
			"unload" => Ok(Self::Unload),
			_ => Err(CoreError::InvalidPageLifeType(s.to_string())),
		}
	}
}

/// Platform tag written to every enriched payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
	#[default]
	Browser,
}

impl PlatformType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Browser => "browser",
		}
	}
}

impl fmt::Display for PlatformType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PlatformType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"browser" => Ok(Self::Browser),
			_ => Err(CoreError::InvalidPlatform(s.to_string())),
		}
	}
}

/// Event type tags used by the built-in plugins.
pub mod event_type {
	pub const JS_ERROR: &str = "jsError";
	pub const PROMISE_ERROR: &str = "promiseError";
	pub const LIFE_CYCLE: &str = "lifeCycle";
}

/// An unenriched event as produced by a plugin.
///
/// Conventionally `{"t": <type>, "dat": {"st": <stage>, ...}}`. Any other
/// top-level keys are carried through unchanged and override enrichment
/// fields of the same name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Builds a `{t, dat}` event.
	pub fn with_data(event_type: impl Into<String>, dat: Map<String, Value>) -> Self {
		let mut map = Map::new();
		map.insert("t".to_string(), Value::String(event_type.into()));
		map.insert("dat".to_string(), Value::Object(dat));
		Self(map)
	}

	pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn event_type(&self) -> Option<&str> {
		self.0.get("t").and_then(Value::as_str)
	}

	/// The raw lifecycle marker at `dat.st`, if any.
	pub fn stage(&self) -> Option<&str> {
		self.0
			.get("dat")
			.and_then(|dat| dat.get("st"))
			.and_then(Value::as_str)
	}

	/// The lifecycle marker, when it names a known page stage.
	pub fn life_type(&self) -> Option<PageLifeType> {
		self.stage().and_then(|st| st.parse().ok())
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for RawEvent {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl From<Value> for RawEvent {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Self(map),
			_ => Self::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_report_type_default_is_beacon() {
		assert_eq!(ReportType::default(), ReportType::Beacon);
	}

	#[test]
	fn test_stage_reads_nested_marker() {
		let raw = RawEvent::from(json!({"t": "lifeCycle", "dat": {"st": "load"}}));
		assert_eq!(raw.stage(), Some("load"));
		assert_eq!(raw.life_type(), Some(PageLifeType::Load));
		assert_eq!(raw.event_type(), Some("lifeCycle"));
	}

	#[test]
	fn test_stage_missing_dat() {
		let raw = RawEvent::from(json!({"t": "jsError"}));
		assert_eq!(raw.stage(), None);
		assert_eq!(raw.life_type(), None);
	}

	#[test]
	fn test_unknown_stage_is_not_a_life_type() {
		let raw = RawEvent::from(json!({"dat": {"st": "unhandledrejection"}}));
		assert_eq!(raw.stage(), Some("unhandledrejection"));
		assert_eq!(raw.life_type(), None);
	}

	#[test]
	fn test_non_object_value_is_empty_event() {
		assert!(RawEvent::from(json!("nope")).is_empty());
		assert!(RawEvent::from(Value::Null).is_empty());
	}

	#[test]
	fn test_platform_serializes_lowercase() {
		assert_eq!(serde_json::to_value(PlatformType::Browser).unwrap(), json!("browser"));
	}

	proptest! {
		#[test]
		fn report_type_roundtrip(hint in prop_oneof![
			Just(ReportType::Beacon),
			Just(ReportType::Img),
			Just(ReportType::Post),
			Just(ReportType::Get),
		]) {
			let parsed: ReportType = hint.to_string().parse().unwrap();
			prop_assert_eq!(hint, parsed);
		}

		#[test]
		fn unknown_report_type_is_rejected(s in "[A-Z]{1,8}") {
			prop_assert!(s.parse::<ReportType>().is_err());
		}
	}
}
