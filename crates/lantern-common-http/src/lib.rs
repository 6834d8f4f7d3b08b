// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Lantern.
//!
//! Every crate that talks to a collection endpoint builds its client here so
//! requests carry the same User-Agent.

mod client;

pub use client::{builder, builder_with_user_agent, user_agent};
