// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use lantern_browser_core::{category, event_type, Breadcrumb, BreadcrumbLevel, RawEvent};
use serde_json::json;

use super::{breadcrumb_trail, send};
use crate::client::BrowserClient;
use crate::plugin::{HostEvent, Plugin};

/// Reports promise rejections nobody handled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromiseErrorPlugin;

#[async_trait]
impl Plugin for PromiseErrorPlugin {
	fn name(&self) -> &'static str {
		"promise-error"
	}

	async fn on_event(&self, client: &BrowserClient, event: &HostEvent) {
		let HostEvent::UnhandledRejection { reason } = event else {
			return;
		};
		let raw = RawEvent::from(json!({
			"t": event_type::PROMISE_ERROR,
			"dat": {
				"st": "unhandledrejection",
				"msg": reason,
				"bc": breadcrumb_trail(client),
			},
		}));
		client.add_breadcrumb(
			Breadcrumb::new(category::ERROR, BreadcrumbLevel::Error).with_message(reason.clone()),
		);
		send(client, self.name(), raw).await;
	}
}
