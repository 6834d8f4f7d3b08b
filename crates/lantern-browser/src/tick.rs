// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deferred callbacks run after the current synchronous work.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use tracing::debug;

type Task = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct TickState {
	tasks: Mutex<VecDeque<Task>>,
	draining: Mutex<()>,
}

/// FIFO queue of deferred callbacks.
///
/// Callbacks never run inside [`TickQueue::next_tick`]. Inside a tokio
/// runtime, queueing into an empty queue spawns a drain task, so callbacks run
/// once the scheduling task yields. Without a runtime the host drains the
/// queue itself. A callback scheduled while draining runs in the same drain,
/// after everything queued before it.
#[derive(Clone, Default)]
pub struct TickQueue {
	state: Arc<TickState>,
}

impl TickQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules `callback(ctx, args)` for the next drain.
	pub fn next_tick<C, A, F>(&self, callback: F, ctx: C, args: A)
	where
		C: Send + 'static,
		A: Send + 'static,
		F: FnOnce(C, A) + Send + 'static,
	{
		self.push(Box::new(move || callback(ctx, args)));
	}

	/// Schedules a closure with nothing to bind.
	pub fn defer<F>(&self, callback: F)
	where
		F: FnOnce() + Send + 'static,
	{
		self.push(Box::new(callback));
	}

	fn push(&self, task: Task) {
		let was_empty = {
			let mut tasks = self
				.state
				.tasks
				.lock()
				.unwrap_or_else(PoisonError::into_inner);
			let was_empty = tasks.is_empty();
			tasks.push_back(task);
			was_empty
		};
		if was_empty {
			self.schedule_drain();
		}
	}

	fn schedule_drain(&self) {
		let Ok(handle) = tokio::runtime::Handle::try_current() else {
			return;
		};
		let queue = self.clone();
		handle.spawn(async move {
			let ran = queue.drain();
			debug!(ran, "Drained deferred callbacks");
		});
	}

	/// Runs queued callbacks until the queue is empty. Returns how many ran.
	///
	/// Only one drain runs at a time. A call made while another drain is in
	/// progress returns 0 and leaves the work to that drain.
	pub fn drain(&self) -> usize {
		let _guard = match self.state.draining.try_lock() {
			Ok(guard) => guard,
			Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
			Err(TryLockError::WouldBlock) => return 0,
		};
		let mut ran = 0;
		loop {
			let task = self
				.state
				.tasks
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.pop_front();
			match task {
				Some(task) => {
					task();
					ran += 1;
				}
				None => return ran,
			}
		}
	}

	pub fn pending(&self) -> usize {
		self.state
			.tasks
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}
}
