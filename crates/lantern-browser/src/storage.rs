// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Uniform access to the page's storage areas and cookie jar.
//!
//! Reads never fail from the caller's point of view: a missing key, a value
//! that is not JSON, or an undecodable cookie all come back as `""` and are
//! logged. [`Storage::try_read`] exposes the underlying error for code that
//! wants to tell those cases apart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};
use lantern_browser_core::StoreTier;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A key/value string store with web storage semantics.
pub trait StorageArea: Send + Sync {
	fn get_item(&self, key: &str) -> Option<String>;
	fn set_item(&self, key: &str, value: String);
	fn remove_item(&self, key: &str);
}

/// A cookie jar holding already-encoded values with absolute expiry.
pub trait CookieStore: Send + Sync {
	/// The raw (still percent-encoded) value of a live cookie.
	fn get(&self, key: &str) -> Option<String>;
	/// Writes a cookie. An expiry at or before now removes it.
	fn set(&self, key: &str, raw_value: &str, expires: DateTime<Utc>);
}

/// In-memory [`StorageArea`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
	items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl StorageArea for MemoryStorage {
	fn get_item(&self, key: &str) -> Option<String> {
		self.items
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(key)
			.cloned()
	}

	fn set_item(&self, key: &str, value: String) {
		self.items
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(key.to_string(), value);
	}

	fn remove_item(&self, key: &str) {
		self.items
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(key);
	}
}

#[derive(Debug, Clone)]
struct CookieEntry {
	value: String,
	expires: DateTime<Utc>,
}

/// In-memory [`CookieStore`]. Expired cookies read as absent.
pub struct MemoryCookieStore {
	clock: Arc<dyn Clock>,
	cookies: Mutex<HashMap<String, CookieEntry>>,
	writes: Mutex<usize>,
}

impl MemoryCookieStore {
	pub fn new() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}

	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self {
			clock,
			cookies: Mutex::new(HashMap::new()),
			writes: Mutex::new(0),
		}
	}

	/// Number of `set` calls seen, including expiring ones.
	pub fn write_count(&self) -> usize {
		*self.writes.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Expiry of a live cookie.
	pub fn expires(&self, key: &str) -> Option<DateTime<Utc>> {
		let now = self.now();
		self.cookies
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(key)
			.filter(|entry| entry.expires > now)
			.map(|entry| entry.expires)
	}

	fn now(&self) -> DateTime<Utc> {
		millis_to_datetime(self.clock.now_millis())
	}
}

impl Default for MemoryCookieStore {
	fn default() -> Self {
		Self::new()
	}
}

impl CookieStore for MemoryCookieStore {
	fn get(&self, key: &str) -> Option<String> {
		let now = self.now();
		self.cookies
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(key)
			.filter(|entry| entry.expires > now)
			.map(|entry| entry.value.clone())
	}

	fn set(&self, key: &str, raw_value: &str, expires: DateTime<Utc>) {
		*self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
		let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
		if expires <= self.now() {
			cookies.remove(key);
		} else {
			cookies.insert(
				key.to_string(),
				CookieEntry {
					value: raw_value.to_string(),
					expires,
				},
			);
		}
	}
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
	Utc.timestamp_millis_opt(millis)
		.single()
		.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Accessor over the local and session areas plus the cookie jar.
#[derive(Clone)]
pub struct Storage {
	local: Arc<dyn StorageArea>,
	session: Arc<dyn StorageArea>,
	cookies: Arc<dyn CookieStore>,
	clock: Arc<dyn Clock>,
}

impl Storage {
	pub fn new(
		local: Arc<dyn StorageArea>,
		session: Arc<dyn StorageArea>,
		cookies: Arc<dyn CookieStore>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			local,
			session,
			cookies,
			clock,
		}
	}

	/// Fresh in-memory areas on the given clock.
	pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
		Self::new(
			Arc::new(MemoryStorage::new()),
			Arc::new(MemoryStorage::new()),
			Arc::new(MemoryCookieStore::with_clock(clock.clone())),
			clock,
		)
	}

	fn area(&self, tier: StoreTier) -> &dyn StorageArea {
		match tier {
			StoreTier::Local => self.local.as_ref(),
			StoreTier::Session => self.session.as_ref(),
		}
	}

	/// Reads `key_path` from `tier`, returning `""` on any failure.
	pub fn read(&self, tier: StoreTier, key_path: &str, parse: bool) -> Value {
		match self.try_read(tier, key_path, parse) {
			Ok(value) => value,
			Err(StorageError::MissingKey(key)) => {
				debug!(%tier, key = %key, "Storage key not found");
				empty()
			}
			Err(e) => {
				error!(%tier, key_path, error = %e, "Storage read failed");
				empty()
			}
		}
	}

	/// Reads `key_path` from `tier`.
	///
	/// The first path segment names the stored item. With `parse`, the item is
	/// decoded as JSON and each further segment indexes into it (object key or
	/// array index). Indexing stops at the deepest value that resolves, so a
	/// missing tail yields the partial result instead of an error. Without
	/// `parse`, the raw string is returned and the tail is ignored.
	pub fn try_read(
		&self,
		tier: StoreTier,
		key_path: &str,
		parse: bool,
	) -> Result<Value, StorageError> {
		let mut segments = key_path.split('.');
		let key = segments.next().unwrap_or_default();
		if key.is_empty() {
			return Err(StorageError::EmptyKey);
		}

		let raw = self
			.area(tier)
			.get_item(key)
			.ok_or_else(|| StorageError::MissingKey(key.to_string()))?;
		if !parse {
			return Ok(Value::String(raw));
		}

		let mut current: Value = serde_json::from_str(&raw)?;
		for segment in segments {
			let next = match &current {
				Value::Object(map) => map.get(segment),
				Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
				_ => None,
			};
			match next {
				Some(value) => current = value.clone(),
				None => break,
			}
		}
		Ok(current)
	}

	/// Stores `value` as JSON under `key`. An empty key is ignored.
	pub fn write<T: Serialize + ?Sized>(&self, tier: StoreTier, key: &str, value: &T) {
		if key.is_empty() {
			return;
		}
		match serde_json::to_string(value) {
			Ok(encoded) => self.area(tier).set_item(key, encoded),
			Err(e) => error!(%tier, key, error = %e, "Failed to serialize storage value"),
		}
	}

	pub fn remove(&self, tier: StoreTier, key: &str) {
		if !key.is_empty() {
			self.area(tier).remove_item(key);
		}
	}

	/// Writes a percent-encoded cookie that expires `days` from now.
	///
	/// Does nothing unless key, value and days are all non-empty/non-zero.
	pub fn set_cookie(&self, key: &str, value: &str, days: u32) {
		if key.is_empty() || value.is_empty() || days == 0 {
			return;
		}
		// Far-future expiries saturate instead of overflowing.
		let expires = self
			.now()
			.checked_add_signed(Duration::milliseconds(i64::from(days) * MILLIS_PER_DAY))
			.unwrap_or(DateTime::<Utc>::MAX_UTC);
		let encoded = urlencoding::encode(value);
		self.cookies.set(key, &encoded, expires);
	}

	/// Reads and percent-decodes a cookie, `""` when absent.
	pub fn get_cookie(&self, key: &str) -> String {
		match self.try_get_cookie(key) {
			Ok(value) => value.unwrap_or_default(),
			Err(e) => {
				error!(key, error = %e, "Cookie read failed");
				String::new()
			}
		}
	}

	pub fn try_get_cookie(&self, key: &str) -> Result<Option<String>, StorageError> {
		if key.is_empty() {
			return Err(StorageError::EmptyKey);
		}
		match self.cookies.get(key) {
			Some(raw) => urlencoding::decode(&raw)
				.map(|decoded| Some(decoded.into_owned()))
				.map_err(|e| StorageError::Decode(e.to_string())),
			None => Ok(None),
		}
	}

	/// Expires a cookie by re-issuing it one millisecond in the past.
	pub fn delete_cookie(&self, key: &str) {
		if key.is_empty() {
			return;
		}
		if let Some(raw) = self.cookies.get(key) {
			let expires = self
				.now()
				.checked_sub_signed(Duration::milliseconds(1))
				.unwrap_or(DateTime::<Utc>::MIN_UTC);
			self.cookies.set(key, &raw, expires);
		}
	}

	fn now(&self) -> DateTime<Utc> {
		millis_to_datetime(self.clock.now_millis())
	}
}

fn empty() -> Value {
	Value::String(String::new())
}
