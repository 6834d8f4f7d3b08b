// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in plugins, attached ahead of any caller plugins.

mod js_error;
mod life_cycle;
mod promise_error;

pub use js_error::JsErrorPlugin;
pub use life_cycle::LifeCyclePlugin;
pub use promise_error::PromiseErrorPlugin;

use lantern_browser_core::{RawEvent, ReportType};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::BrowserClient;

/// Transforms `raw` and beacons it to the configured report URL.
async fn send(client: &BrowserClient, plugin: &'static str, raw: RawEvent) {
	if !client.is_right_env() {
		return;
	}
	let Some(url) = client.options().report_url.as_deref() else {
		debug!(plugin, "No report URL configured, skipping");
		return;
	};
	let Some(payload) = client.transform(raw) else {
		return;
	};
	if let Err(e) = client
		.report(url, Value::from(payload), ReportType::Beacon)
		.await
	{
		warn!(plugin, error = %e, "Failed to send report");
	}
}

/// The breadcrumb trail as a JSON array.
fn breadcrumb_trail(client: &BrowserClient) -> Value {
	serde_json::to_value(client.breadcrumbs()).unwrap_or(Value::Null)
}
