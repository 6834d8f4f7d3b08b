// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use lantern_browser_core::{category, event_type, Breadcrumb, BreadcrumbLevel, RawEvent};
use serde_json::json;

use super::{breadcrumb_trail, send};
use crate::client::BrowserClient;
use crate::plugin::{ErrorEvent, HostEvent, Plugin};

/// Reports uncaught errors.
///
/// The report carries the breadcrumb trail leading up to the error; the error
/// itself is then recorded as a breadcrumb.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsErrorPlugin;

impl JsErrorPlugin {
	fn raw_event(client: &BrowserClient, error: &ErrorEvent) -> RawEvent {
		RawEvent::from(json!({
			"t": event_type::JS_ERROR,
			"dat": {
				"st": "error",
				"msg": error.message,
				"file": error.filename,
				"line": error.lineno,
				"col": error.colno,
				"stack": error.stack,
				"bc": breadcrumb_trail(client),
			},
		}))
	}
}

#[async_trait]
impl Plugin for JsErrorPlugin {
	fn name(&self) -> &'static str {
		"js-error"
	}

	async fn on_event(&self, client: &BrowserClient, event: &HostEvent) {
		let HostEvent::Error(error) = event else {
			return;
		};
		let raw = Self::raw_event(client, error);
		client.add_breadcrumb(
			Breadcrumb::new(category::ERROR, BreadcrumbLevel::Error).with_message(error.message.clone()),
		);
		send(client, self.name(), raw).await;
	}
}
