// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Facts about the hosting page: location, document and window.

use lantern_browser_core::{ClientInfo, Dimensions};

/// Read-only view of the page the client is embedded in.
pub trait Page: Send + Sync {
	/// `location.href`
	fn href(&self) -> String;
	/// `document.title`
	fn title(&self) -> String;
	/// `navigator.language`
	fn language(&self) -> String;
	/// `navigator.userAgent`
	fn user_agent(&self) -> String;
	/// `innerWidth` x `innerHeight`
	fn viewport(&self) -> Dimensions;
	/// `documentElement.clientWidth` x `clientHeight`
	fn document_element_size(&self) -> Dimensions;
	/// `body.clientWidth` x `clientHeight`
	fn body_size(&self) -> Dimensions;

	/// Document size, falling back to the body per axis when the document
	/// element reports zero.
	fn document_size(&self) -> Dimensions {
		self.document_element_size().or_axes(self.body_size())
	}

	/// The environment snapshot attached to load-stage events.
	fn client_info(&self) -> ClientInfo {
		ClientInfo {
			title: self.title(),
			language: self.language(),
			user_agent: self.user_agent(),
			viewport_size: self.viewport(),
			document_size: self.document_size(),
		}
	}
}

/// A [`Page`] whose facts are fixed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticPage {
	pub href: String,
	pub title: String,
	pub language: String,
	pub user_agent: String,
	pub viewport: Dimensions,
	pub document_element: Dimensions,
	pub body: Dimensions,
}

impl StaticPage {
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			..Default::default()
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_language(mut self, language: impl Into<String>) -> Self {
		self.language = language.into();
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();
		self
	}

	pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
		self.viewport = Dimensions::new(width, height);
		self
	}

	pub fn with_document_element(mut self, width: u32, height: u32) -> Self {
		self.document_element = Dimensions::new(width, height);
		self
	}

	pub fn with_body(mut self, width: u32, height: u32) -> Self {
		self.body = Dimensions::new(width, height);
		self
	}
}

impl Page for StaticPage {
	fn href(&self) -> String {
		self.href.clone()
	}

	fn title(&self) -> String {
		self.title.clone()
	}

	fn language(&self) -> String {
		self.language.clone()
	}

	fn user_agent(&self) -> String {
		self.user_agent.clone()
	}

	fn viewport(&self) -> Dimensions {
		self.viewport
	}

	fn document_element_size(&self) -> Dimensions {
		self.document_element
	}

	fn body_size(&self) -> Dimensions {
		self.body
	}
}
