// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Register an app and report page events with the lantern-browser SDK.
//!
//! Run with:
//!   LANTERN_BASE_URL=http://localhost:8080 cargo run --example report -p lantern-browser

use std::sync::Arc;
use std::time::Duration;

use lantern_browser::{
	AppDescriptor, Breadcrumb, BreadcrumbLevel, BrowserClient, ErrorEvent, HostEvent,
	MemoryStorage, PageLifeType, StaticPage, StoreTier, StorageArea, SESSION_ID_KEY,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let base_url =
		std::env::var("LANTERN_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

	println!("Initializing browser client...");
	println!("  Base URL: {}", base_url);

	// The host provisions the session id before the SDK runs.
	let session = Arc::new(MemoryStorage::new());
	session.set_item(SESSION_ID_KEY, "\"example-session\"".to_string());

	let page = StaticPage::new(format!("{base_url}/checkout"))
		.with_title("Checkout")
		.with_language("en-US")
		.with_user_agent("lantern-example/0.1")
		.with_viewport(1280, 720)
		.with_document_element(1280, 2400);

	let client = BrowserClient::builder()
		.init_url("/api/init")
		.report_url("/api/report")
		.app(AppDescriptor::new("example").with_field("release", "0.1.0-example"))
		.page(page)
		.session_storage(session)
		.request_timeout(Duration::from_secs(5))
		.build()?;

	match client.init_app().await {
		Ok(id) => println!("Registered, server id: {id:?}"),
		Err(e) => println!("Registration failed: {e}"),
	}
	println!("Clock offset: {:?}", client.clock_offset());
	println!("Corrected time: {}", client.get_time());
	println!(
		"Session: {:?}",
		client.storage().read(StoreTier::Session, SESSION_ID_KEY, true)
	);

	client.add_breadcrumb(
		Breadcrumb::new("navigation", BreadcrumbLevel::Info).with_message("Opened checkout"),
	);

	client.dispatch(&HostEvent::Lifecycle(PageLifeType::Load)).await;
	client
		.dispatch(&HostEvent::Error(
			ErrorEvent::new("TypeError: cart is undefined").at("checkout.js", 42, 7),
		))
		.await;
	client
		.dispatch(&HostEvent::UnhandledRejection {
			reason: "payment gateway timeout".to_string(),
		})
		.await;
	client.dispatch(&HostEvent::Lifecycle(PageLifeType::Unload)).await;

	// Let fire-and-forget sends complete
	tokio::time::sleep(Duration::from_millis(500)).await;

	println!("Done!");
	Ok(())
}
