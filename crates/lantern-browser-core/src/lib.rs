// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Lantern browser reporting client.
//!
//! This crate holds the wire model shared by the browser SDK
//! (`lantern-browser`) and anything that consumes its reports:
//!
//! - Report hints ([`ReportType`]) and page lifecycle markers ([`PageLifeType`])
//! - Raw plugin events ([`RawEvent`]) and the enriched payload they become
//!   ([`EnrichedPayload`], assembled by [`PayloadBuilder`])
//! - The one-time environment snapshot ([`ClientInfo`])
//! - Storage tiers and well-known keys
//! - Breadcrumbs and the application descriptor

pub mod app;
pub mod breadcrumb;
pub mod error;
pub mod event;
pub mod payload;
pub mod store;

pub use app::{AppDescriptor, RequestId};
pub use breadcrumb::{category, Breadcrumb, BreadcrumbLevel};
pub use error::{CoreError, Result};
pub use event::{event_type, PageLifeType, PlatformType, RawEvent, ReportType};
pub use payload::{BasePayload, ClientInfo, Dimensions, EnrichedPayload, PayloadBuilder};
pub use store::{StoreTier, SESSION_ID_KEY, USER_ID_KEY, USER_ID_TTL_DAYS};
