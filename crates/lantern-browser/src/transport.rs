// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery mechanisms and the ladder that picks between them.
//!
//! | hint | condition | transport |
//! |------|-----------|-----------|
//! | `Beacon` | beacon supported | [`TransportKind::Beacon`] |
//! | `Img`, or no beacon | always | [`TransportKind::Image`] |
//! | `Post` | always | [`TransportKind::Post`] |
//! | `Get` | otherwise | [`TransportKind::Get`] |
//!
//! Only `Get` produces a response; the others are fire and forget.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lantern_browser_core::ReportType;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BrowserSdkError, Result};

/// The delivery mechanism actually used for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
	Beacon,
	Image,
	Post,
	Get,
}

impl fmt::Display for TransportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Beacon => write!(f, "beacon"),
			Self::Image => write!(f, "image"),
			Self::Post => write!(f, "post"),
			Self::Get => write!(f, "get"),
		}
	}
}

/// Picks a transport from the caller's hint and beacon availability.
pub fn select_transport(hint: ReportType, beacon_available: bool) -> TransportKind {
	if hint == ReportType::Beacon && beacon_available {
		return TransportKind::Beacon;
	}
	if hint == ReportType::Img || !beacon_available {
		return TransportKind::Image;
	}
	if hint == ReportType::Post {
		return TransportKind::Post;
	}
	TransportKind::Get
}

/// Response to an awaited GET.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportResponse {
	pub status: u16,
	/// Header names are lowercase.
	pub headers: HashMap<String, String>,
	/// JSON body, or the body as a string when it is not JSON.
	pub data: Value,
}

impl ReportResponse {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.get(&name.to_ascii_lowercase())
			.map(String::as_str)
	}

	pub fn date(&self) -> Option<&str> {
		self.header("date")
	}
}

/// The network primitives a host provides.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Whether a beacon-style transport exists on this host.
	fn supports_beacon(&self) -> bool;

	/// Queues a beacon. Survives unload; no response.
	fn beacon(&self, url: &str, data: &Value);

	/// Requests a tracking pixel carrying `data`. No response.
	fn image(&self, url: &str, data: &Value);

	/// POSTs `data` as JSON without waiting for the result.
	fn post(&self, url: &str, data: &Value);

	/// GETs `url` with `data` as query parameters and waits for the response.
	async fn get(&self, url: &str, data: &Value) -> Result<ReportResponse>;
}

/// Flattens a JSON object into query pairs. Strings are used as-is, other
/// values are JSON encoded, nulls are dropped.
pub fn query_pairs(data: &Value) -> Vec<(String, String)> {
	let Value::Object(map) = data else {
		return Vec::new();
	};
	map.iter()
		.filter(|(_, v)| !v.is_null())
		.map(|(k, v)| {
			let value = match v {
				Value::String(s) => s.clone(),
				other => other.to_string(),
			};
			(k.clone(), value)
		})
		.collect()
}

/// Tracking pixel URL: `data` JSON encoded into a single `data` parameter.
pub fn image_url(url: &str, data: &Value) -> String {
	let separator = if url.contains('?') { '&' } else { '?' };
	format!(
		"{url}{separator}data={}",
		urlencoding::encode(&data.to_string())
	)
}

/// [`Transport`] over `reqwest`.
///
/// Fire-and-forget sends are spawned onto the current tokio runtime; with no
/// runtime they are dropped with a warning.
#[derive(Clone)]
pub struct HttpTransport {
	client: Client,
	beacon: bool,
}

impl HttpTransport {
	pub fn new(request_timeout: Duration) -> Result<Self> {
		let client = lantern_common_http::builder()
			.timeout(request_timeout)
			.build()
			.map_err(BrowserSdkError::RequestFailed)?;
		Ok(Self::with_client(client))
	}

	pub fn with_client(client: Client) -> Self {
		Self {
			client,
			beacon: true,
		}
	}

	/// Marks beacon support as available or not.
	pub fn with_beacon(mut self, enabled: bool) -> Self {
		self.beacon = enabled;
		self
	}

	fn dispatch(&self, kind: TransportKind, url: &str, request: RequestBuilder) {
		let Ok(handle) = tokio::runtime::Handle::try_current() else {
			warn!(%kind, url, "No async runtime, report dropped");
			return;
		};
		let url = url.to_string();
		handle.spawn(async move {
			match request.send().await {
				Ok(response) if response.status().is_success() => {
					debug!(%kind, url = %url, "Report delivered");
				}
				Ok(response) => {
					warn!(%kind, url = %url, status = response.status().as_u16(), "Report rejected");
				}
				Err(e) => {
					warn!(%kind, url = %url, error = %e, "Report failed");
				}
			}
		});
	}
}

#[async_trait]
impl Transport for HttpTransport {
	fn supports_beacon(&self) -> bool {
		self.beacon
	}

	fn beacon(&self, url: &str, data: &Value) {
		let request = self
			.client
			.post(url)
			.header(CONTENT_TYPE, "text/plain;charset=UTF-8")
			.body(data.to_string());
		self.dispatch(TransportKind::Beacon, url, request);
	}

	fn image(&self, url: &str, data: &Value) {
		let pixel = image_url(url, data);
		let request = self.client.get(&pixel);
		self.dispatch(TransportKind::Image, url, request);
	}

	fn post(&self, url: &str, data: &Value) {
		let request = self.client.post(url).json(data);
		self.dispatch(TransportKind::Post, url, request);
	}

	async fn get(&self, url: &str, data: &Value) -> Result<ReportResponse> {
		debug!(url, "Sending GET report");
		let response = self.client.get(url).query(&query_pairs(data)).send().await?;

		let status = response.status();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value
					.to_str()
					.ok()
					.map(|v| (name.as_str().to_string(), v.to_string()))
			})
			.collect();

		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(BrowserSdkError::ServerError {
				status: status.as_u16(),
				message,
			});
		}

		let body = response.text().await?;
		let data = if body.trim().is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&body).unwrap_or(Value::String(body))
		};

		Ok(ReportResponse {
			status: status.as_u16(),
			headers,
			data,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_selection_table() {
		use ReportType::*;
		use TransportKind as K;
		let cases = [
			(Beacon, true, K::Beacon),
			(Beacon, false, K::Image),
			(Img, true, K::Image),
			(Img, false, K::Image),
			(Post, true, K::Post),
			(Post, false, K::Image),
			(Get, true, K::Get),
			(Get, false, K::Image),
		];
		for (hint, beacon, expected) in cases {
			assert_eq!(
				select_transport(hint, beacon),
				expected,
				"hint={hint} beacon={beacon}"
			);
		}
	}

	#[test]
	fn test_query_pairs_flattens_object() {
		let pairs = query_pairs(&json!({
			"id": "abc",
			"n": 3,
			"nested": {"a": 1},
			"skip": null,
		}));
		let map: HashMap<_, _> = pairs.into_iter().collect();
		assert_eq!(map["id"], "abc");
		assert_eq!(map["n"], "3");
		assert_eq!(map["nested"], r#"{"a":1}"#);
		assert!(!map.contains_key("skip"));
	}

	#[test]
	fn test_query_pairs_non_object_is_empty() {
		assert!(query_pairs(&json!([1, 2])).is_empty());
		assert!(query_pairs(&Value::Null).is_empty());
	}

	#[test]
	fn test_image_url_encodes_payload() {
		let url = image_url("https://c.example.com/px.gif", &json!({"a": "b c"}));
		assert_eq!(
			url,
			"https://c.example.com/px.gif?data=%7B%22a%22%3A%22b%20c%22%7D"
		);
	}

	#[test]
	fn test_image_url_appends_to_existing_query() {
		let url = image_url("https://c.example.com/px.gif?k=1", &json!({}));
		assert!(url.starts_with("https://c.example.com/px.gif?k=1&data="));
	}

	#[test]
	fn test_response_header_lookup_is_case_insensitive() {
		let mut headers = HashMap::new();
		headers.insert("date".to_string(), "Mon, 01 Jan 2024 00:00:00 GMT".to_string());
		let response = ReportResponse {
			status: 200,
			headers,
			data: Value::Null,
		};
		assert_eq!(response.header("Date"), response.date());
		assert!(response.date().is_some());
	}

	#[test]
	fn test_dispatch_without_runtime_does_not_panic() {
		let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
		transport.beacon("http://127.0.0.1:1/collect", &json!({"a": 1}));
		transport.image("http://127.0.0.1:1/collect", &json!({"a": 1}));
		transport.post("http://127.0.0.1:1/collect", &json!({"a": 1}));
	}

	proptest! {
		#[test]
		fn explicit_hint_is_honored_with_beacon(hint in prop_oneof![
			Just(ReportType::Img),
			Just(ReportType::Post),
			Just(ReportType::Get),
		]) {
			let kind = select_transport(hint, true);
			let expected = match hint {
				ReportType::Img => TransportKind::Image,
				ReportType::Post => TransportKind::Post,
				_ => TransportKind::Get,
			};
			prop_assert_eq!(kind, expected);
		}

		#[test]
		fn no_beacon_always_uses_image(hint in prop_oneof![
			Just(ReportType::Beacon),
			Just(ReportType::Img),
			Just(ReportType::Post),
			Just(ReportType::Get),
		]) {
			prop_assert_eq!(select_transport(hint, false), TransportKind::Image);
		}
	}
}
