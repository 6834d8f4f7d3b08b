// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Plugin contract and the host events plugins react to.
//!
//! A plugin is bound once at client construction through [`Plugin::setup`]
//! and then receives every [`HostEvent`] the host dispatches. Plugins turn
//! events into raw records, call `transform`, and `report` whatever survives.

use std::sync::Arc;

use async_trait::async_trait;
use lantern_browser_core::PageLifeType;

use crate::client::{BrowserClient, BrowserOptions};

/// Details of an uncaught error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
	pub message: String,
	pub filename: Option<String>,
	pub lineno: Option<u32>,
	pub colno: Option<u32>,
	pub stack: Option<String>,
}

impl ErrorEvent {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			..Default::default()
		}
	}

	pub fn at(mut self, filename: impl Into<String>, lineno: u32, colno: u32) -> Self {
		self.filename = Some(filename.into());
		self.lineno = Some(lineno);
		self.colno = Some(colno);
		self
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}
}

/// Something the page observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
	/// Uncaught exception.
	Error(ErrorEvent),
	/// Promise rejected with no handler.
	UnhandledRejection { reason: String },
	/// Page lifecycle transition.
	Lifecycle(PageLifeType),
}

/// An extension bound to the client at construction.
#[async_trait]
pub trait Plugin: Send + Sync {
	fn name(&self) -> &'static str;

	/// Called once, in registration order, when the plugin is attached.
	fn setup(&self, _client: &BrowserClient, _options: &BrowserOptions) {}

	/// Called for every dispatched host event.
	async fn on_event(&self, _client: &BrowserClient, _event: &HostEvent) {}
}

pub type SharedPlugin = Arc<dyn Plugin>;
