// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lantern_browser::{
	BrowserSdkError, ReportResponse, Result, StaticPage, Transport, TransportKind,
};
use serde_json::Value;

pub const NOW: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
	pub kind: TransportKind,
	pub url: String,
	pub data: Value,
}

/// Transport that records every send instead of touching the network.
pub struct RecordingTransport {
	beacon: bool,
	sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
	pub fn new(beacon: bool) -> Arc<Self> {
		Arc::new(Self {
			beacon,
			sent: Mutex::new(Vec::new()),
		})
	}

	pub fn sent(&self) -> Vec<Sent> {
		self.sent.lock().unwrap().clone()
	}

	fn record(&self, kind: TransportKind, url: &str, data: &Value) {
		self.sent.lock().unwrap().push(Sent {
			kind,
			url: url.to_string(),
			data: data.clone(),
		});
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	fn supports_beacon(&self) -> bool {
		self.beacon
	}

	fn beacon(&self, url: &str, data: &Value) {
		self.record(TransportKind::Beacon, url, data);
	}

	fn image(&self, url: &str, data: &Value) {
		self.record(TransportKind::Image, url, data);
	}

	fn post(&self, url: &str, data: &Value) {
		self.record(TransportKind::Post, url, data);
	}

	async fn get(&self, url: &str, data: &Value) -> Result<ReportResponse> {
		self.record(TransportKind::Get, url, data);
		Err(BrowserSdkError::ServerError {
			status: 503,
			message: "offline".to_string(),
		})
	}
}

pub fn page(href: impl Into<String>) -> StaticPage {
	StaticPage::new(href)
		.with_title("Checkout")
		.with_language("en-US")
		.with_user_agent("Mozilla/5.0 (integration)")
		.with_viewport(1280, 720)
		.with_document_element(1280, 2400)
}
