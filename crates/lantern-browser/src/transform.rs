// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Enrichment of raw plugin events into wire payloads.

use std::sync::{Arc, OnceLock};

use lantern_browser_core::{
	BasePayload, EnrichedPayload, PageLifeType, PayloadBuilder, PlatformType, RawEvent,
};
use tracing::debug;

use crate::identity::IdentityResolver;
use crate::page::Page;

/// Attaches identity, location and (on load) environment facts to events.
pub struct PayloadTransformer {
	identity: IdentityResolver,
	page: Option<Arc<dyn Page>>,
	session_id: OnceLock<String>,
}

impl PayloadTransformer {
	pub fn new(identity: IdentityResolver, page: Option<Arc<dyn Page>>) -> Self {
		Self {
			identity,
			page,
			session_id: OnceLock::new(),
		}
	}

	/// The cached session id, once one has been seen.
	pub fn session_id(&self) -> Option<&str> {
		self.session_id.get().map(String::as_str)
	}

	/// Session id from the cache, or from storage on a cache miss.
	///
	/// Once cached the id is kept for the transformer's lifetime even if the
	/// stored value later disappears.
	fn resolve_session_id(&self) -> Option<&str> {
		if let Some(sid) = self.session_id.get() {
			return Some(sid);
		}
		let sid = self.identity.resolve_session_id()?;
		Some(self.session_id.get_or_init(|| sid))
	}

	/// Enriches `raw`, or returns `None` when it must not be sent.
	///
	/// `None` covers an empty event, no provisioned session, and no page
	/// context. Resolving the user id may write the `uid` cookie.
	pub fn transform(&self, raw: RawEvent) -> Option<EnrichedPayload> {
		if raw.is_empty() {
			return None;
		}

		let Some(sid) = self.resolve_session_id() else {
			debug!("Dropping event without session id");
			return None;
		};
		let sid = sid.to_string();

		let Some(page) = self.page.as_ref() else {
			debug!("Dropping event outside a page context");
			return None;
		};

		let uid = self.identity.resolve_user_id();

		let snapshot = (raw.life_type() == Some(PageLifeType::Load)).then(|| page.client_info());

		let base = BasePayload {
			sid,
			uid,
			platform: PlatformType::Browser,
			url: page.href(),
		};

		Some(PayloadBuilder::new(base).snapshot(snapshot).raw(raw).build())
	}
}
