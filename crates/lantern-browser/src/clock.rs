// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client clock and server skew tracking.
//!
//! The offset is `local - server` in milliseconds. It starts unset, the first
//! observation is always taken, and afterwards a candidate only replaces the
//! stored value when it is smaller. Display timestamps are `now - offset`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{BrowserSdkError, Result};

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
	fn now_millis(&self) -> i64;
}

/// The host's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicI64,
}

impl ManualClock {
	pub fn new(now_millis: i64) -> Self {
		Self {
			now: AtomicI64::new(now_millis),
		}
	}

	pub fn set(&self, now_millis: i64) {
		self.now.store(now_millis, Ordering::SeqCst);
	}

	pub fn advance(&self, millis: i64) {
		self.now.fetch_add(millis, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> i64 {
		self.now.load(Ordering::SeqCst)
	}
}

const UNSET: i64 = i64::MIN;

/// Tracks the tightest observed client/server offset.
pub struct ClockSync {
	clock: Arc<dyn Clock>,
	diff: AtomicI64,
}

impl ClockSync {
	pub fn new(clock: Arc<dyn Clock>) -> Self {
		Self {
			clock,
			diff: AtomicI64::new(UNSET),
		}
	}

	/// Parses an HTTP `Date` header and feeds it to [`observe_server_time`].
	///
	/// On a parse failure the stored offset is left untouched.
	///
	/// [`observe_server_time`]: ClockSync::observe_server_time
	pub fn observe(&self, date_header: &str) -> Result<i64> {
		let server = parse_http_date(date_header)?;
		Ok(self.observe_server_time(server.timestamp_millis()))
	}

	/// Records `now - server_millis` as a candidate offset and returns it.
	pub fn observe_server_time(&self, server_millis: i64) -> i64 {
		let candidate = self.clock.now_millis() - server_millis;
		if candidate < 0 {
			// Client behind server: the `stored > candidate` rule still
			// accepts this, widening the magnitude of the skew.
			warn!(candidate, "Client clock is behind server clock");
		}

		let result = self.diff.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |stored| {
			if stored == UNSET || stored > candidate {
				Some(candidate)
			} else {
				None
			}
		});

		match result {
			Ok(previous) => debug!(
				candidate,
				previous = (previous != UNSET).then_some(previous),
				"Clock offset updated"
			),
			Err(stored) => debug!(candidate, stored, "Clock offset kept"),
		}
		candidate
	}

	/// The stored offset, if any observation has been made.
	pub fn offset(&self) -> Option<i64> {
		match self.diff.load(Ordering::SeqCst) {
			UNSET => None,
			diff => Some(diff),
		}
	}

	/// Uncorrected local time.
	pub fn now(&self) -> i64 {
		self.clock.now_millis()
	}

	/// Local time shifted by the stored offset.
	pub fn corrected_now(&self) -> i64 {
		self.now() - self.offset().unwrap_or(0)
	}
}

/// Parses an IMF-fixdate (`Tue, 15 Nov 1994 08:12:31 GMT`), falling back to
/// RFC 3339.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>> {
	let value = value.trim();
	DateTime::parse_from_rfc2822(value)
		.or_else(|_| DateTime::parse_from_rfc3339(value))
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| BrowserSdkError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn sync_at(now: i64) -> (Arc<ManualClock>, ClockSync) {
		let clock = Arc::new(ManualClock::new(now));
		let sync = ClockSync::new(clock.clone());
		(clock, sync)
	}

	#[test]
	fn test_no_offset_uses_raw_now() {
		let (_, sync) = sync_at(1_000_000);
		assert_eq!(sync.offset(), None);
		assert_eq!(sync.corrected_now(), 1_000_000);
	}

	#[test]
	fn test_first_observation_always_accepted() {
		let (_, sync) = sync_at(10_000);
		sync.observe_server_time(7_000);
		assert_eq!(sync.offset(), Some(3_000));
		assert_eq!(sync.corrected_now(), 7_000);
	}

	#[test]
	fn test_zero_offset_counts_as_set() {
		let (_, sync) = sync_at(10_000);
		sync.observe_server_time(10_000);
		sync.observe_server_time(5_000);
		assert_eq!(sync.offset(), Some(0));
	}

	#[test]
	fn test_offset_only_tightens() {
		let (_, sync) = sync_at(10_000);
		sync.observe_server_time(8_000); // 2000
		sync.observe_server_time(9_500); // 500
		sync.observe_server_time(6_000); // 4000, rejected
		assert_eq!(sync.offset(), Some(500));
	}

	#[test]
	fn test_negative_candidate_is_accepted_by_rule() {
		let (_, sync) = sync_at(10_000);
		sync.observe_server_time(9_000);
		sync.observe_server_time(15_000);
		assert_eq!(sync.offset(), Some(-5_000));
	}

	#[test]
	fn test_observe_http_date_header() {
		// 2024-01-01T00:00:00Z
		let server = 1_704_067_200_000;
		let (_, sync) = sync_at(server + 1_500);
		let candidate = sync.observe("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
		assert_eq!(candidate, 1_500);
		assert_eq!(sync.corrected_now(), server);
	}

	#[test]
	fn test_observe_rfc3339_fallback() {
		let server = 1_704_067_200_000;
		let (_, sync) = sync_at(server + 42);
		assert_eq!(sync.observe("2024-01-01T00:00:00Z").unwrap(), 42);
	}

	#[test]
	fn test_invalid_date_leaves_offset() {
		let (_, sync) = sync_at(10_000);
		sync.observe_server_time(9_000);
		let result = sync.observe("not a date");
		assert!(matches!(result, Err(BrowserSdkError::InvalidDate(_))));
		assert_eq!(sync.offset(), Some(1_000));
	}

	#[test]
	fn test_corrected_now_tracks_clock() {
		let (clock, sync) = sync_at(10_000);
		sync.observe_server_time(9_000);
		clock.advance(250);
		assert_eq!(sync.corrected_now(), 9_250);
	}

	proptest! {
		#[test]
		fn offset_is_minimum_candidate(
			now in 1_000_000_000i64..2_000_000_000_000,
			skews in proptest::collection::vec(0i64..100_000, 1..20),
		) {
			let (_, sync) = sync_at(now);
			for skew in &skews {
				sync.observe_server_time(now - skew);
			}
			let min = *skews.iter().min().unwrap();
			prop_assert_eq!(sync.offset(), Some(min));
			prop_assert_eq!(sync.corrected_now(), now - min);
		}
	}
}
