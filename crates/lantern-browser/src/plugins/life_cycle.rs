// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use lantern_browser_core::{category, event_type, Breadcrumb, BreadcrumbLevel, RawEvent};
use serde_json::json;

use super::send;
use crate::client::BrowserClient;
use crate::plugin::{HostEvent, Plugin};

/// Reports page load and unload and records each as a breadcrumb. Load
/// reports carry the environment snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct LifeCyclePlugin;

#[async_trait]
impl Plugin for LifeCyclePlugin {
	fn name(&self) -> &'static str {
		"life-cycle"
	}

	async fn on_event(&self, client: &BrowserClient, event: &HostEvent) {
		let HostEvent::Lifecycle(stage) = event else {
			return;
		};
		let raw = RawEvent::from(json!({
			"t": event_type::LIFE_CYCLE,
			"dat": {"st": stage.as_str()},
		}));
		client.add_breadcrumb(
			Breadcrumb::new(category::LIFECYCLE, BreadcrumbLevel::Info).with_message(stage.as_str()),
		);
		send(client, self.name(), raw).await;
	}
}
