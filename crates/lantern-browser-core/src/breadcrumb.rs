// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumbs: the trail of page activity leading up to a report.
//!
//! Error reports carry the trail as it stood when the error was observed
//! (`dat.bc`), so a crumb recorded for the error itself only shows up in
//! later reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Categories recorded by the built-in plugins. Hosts may use any string.
pub mod category {
	/// An uncaught error or unhandled rejection.
	pub const ERROR: &str = "error";
	/// A page load or unload.
	pub const LIFECYCLE: &str = "lifecycle";
	/// A route change inside the page.
	pub const NAVIGATION: &str = "navigation";
}

/// Something that happened on the page before a report was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
	/// Local wall-clock time, not corrected for server skew.
	pub timestamp: DateTime<Utc>,
	/// See [`category`] for the values the SDK itself records.
	pub category: String,
	/// The error message, lifecycle stage, or host-supplied text.
	pub message: Option<String>,
	pub level: BreadcrumbLevel,
	/// Free-form JSON, serialized into the report as-is.
	pub data: serde_json::Value,
}

impl Breadcrumb {
	pub fn new(category: impl Into<String>, level: BreadcrumbLevel) -> Self {
		Self {
			category: category.into(),
			level,
			..Default::default()
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_data(mut self, data: serde_json::Value) -> Self {
		self.data = data;
		self
	}
}

impl Default for Breadcrumb {
	fn default() -> Self {
		Self {
			timestamp: Utc::now(),
			category: String::new(),
			message: None,
			level: BreadcrumbLevel::Info,
			data: serde_json::Value::Object(serde_json::Map::new()),
		}
	}
}

/// Severity level of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbLevel {
	Debug,
	Info,
	Warning,
	Error,
}

impl fmt::Display for BreadcrumbLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for BreadcrumbLevel {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidBreadcrumbLevel(s.to_string())),
		}
	}
}
