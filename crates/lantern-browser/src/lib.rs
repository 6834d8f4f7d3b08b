// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Browser reporting SDK for Lantern.
//!
//! This crate enriches events observed by a web page with identity and
//! environment context and ships them to a collection endpoint.
//!
//! # Features
//!
//! - **Registration handshake**: `init_app` registers the app and learns the
//!   server clock from the response `date` header
//! - **Clock correction**: `get_time` returns timestamps adjusted by the
//!   tightest observed skew
//! - **Identity**: a persistent `uid` cookie and the host-provisioned session id
//! - **Transport ladder**: beacon, tracking pixel, POST or awaited GET
//! - **Plugins**: uncaught errors, unhandled rejections and page lifecycle
//!
//! # Example
//!
//! ```ignore
//! use lantern_browser::{AppDescriptor, BrowserClient, HostEvent, PageLifeType, StaticPage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BrowserClient::builder()
//!         .init_url("/api/init")
//!         .report_url("/api/report")
//!         .app(AppDescriptor::new("storefront"))
//!         .page(StaticPage::new("https://shop.example.com/"))
//!         .build()?;
//!
//!     let server_id = client.init_app().await?;
//!     client.dispatch(&HostEvent::Lifecycle(PageLifeType::Load)).await;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod clock;
mod error;
mod identity;
mod page;
mod plugin;
mod plugins;
mod storage;
mod tick;
mod transform;
mod transport;

pub use client::{
	BrowserClient, BrowserClientBuilder, BrowserOptions, ClientConfig, SDK_NAME, SDK_VERSION,
};
pub use clock::{parse_http_date, Clock, ClockSync, ManualClock, SystemClock};
pub use error::{BrowserSdkError, Result, StorageError};
pub use identity::IdentityResolver;
pub use page::{Page, StaticPage};
pub use plugin::{ErrorEvent, HostEvent, Plugin, SharedPlugin};
pub use plugins::{JsErrorPlugin, LifeCyclePlugin, PromiseErrorPlugin};
pub use storage::{CookieStore, MemoryCookieStore, MemoryStorage, Storage, StorageArea};
pub use tick::TickQueue;
pub use transform::PayloadTransformer;
pub use transport::{
	image_url, query_pairs, select_transport, HttpTransport, ReportResponse, Transport,
	TransportKind,
};

// Re-export core types for convenience
pub use lantern_browser_core::{
	category, event_type, AppDescriptor, BasePayload, Breadcrumb, BreadcrumbLevel, ClientInfo,
	Dimensions, EnrichedPayload, PageLifeType, PlatformType, RawEvent, ReportType, RequestId,
	StoreTier, SESSION_ID_KEY, USER_ID_KEY, USER_ID_TTL_DAYS,
};
