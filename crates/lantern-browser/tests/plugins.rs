// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use std::sync::Arc;

use common::{page, RecordingTransport, NOW};
use lantern_browser::{
	AppDescriptor, Breadcrumb, BreadcrumbLevel, BrowserClient, BrowserClientBuilder, ErrorEvent,
	HostEvent, ManualClock, PageLifeType, StoreTier, TransportKind, SESSION_ID_KEY, USER_ID_KEY,
};
use serde_json::json;

fn builder(transport: Arc<RecordingTransport>) -> BrowserClientBuilder {
	BrowserClient::builder()
		.init_url("/api/init")
		.report_url("/api/report")
		.app(AppDescriptor::new("demo"))
		.page(page("https://shop.example.com/checkout"))
		.clock(Arc::new(ManualClock::new(NOW)))
		.transport(transport)
}

fn with_session(client: &BrowserClient) {
	client
		.storage()
		.write(StoreTier::Session, SESSION_ID_KEY, "session-1");
}

#[tokio::test]
async fn load_event_is_beaconed_with_snapshot() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;

	let sent = transport.sent();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].kind, TransportKind::Beacon);
	assert_eq!(sent[0].url, "https://shop.example.com/api/report");

	let data = &sent[0].data;
	assert_eq!(data["t"], json!("lifeCycle"));
	assert_eq!(data["dat"], json!({"st": "load"}));
	assert_eq!(data["sid"], json!("session-1"));
	assert_eq!(data["p"], json!("browser"));
	assert_eq!(data["url"], json!("https://shop.example.com/checkout"));
	assert_eq!(data["ttl"], json!("Checkout"));
	assert_eq!(data["ws"], json!("1280x720"));
	assert_eq!(data["ds"], json!("1280x2400"));
	assert_eq!(data["uid"], json!(client.storage().get_cookie(USER_ID_KEY)));
}

#[tokio::test]
async fn unload_event_has_no_snapshot() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Unload))
		.await;

	let data = &transport.sent()[0].data;
	assert_eq!(data["dat"]["st"], json!("unload"));
	assert!(data.get("ttl").is_none());
	assert!(data.get("ua").is_none());
}

#[tokio::test]
async fn js_error_carries_location_and_trail() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);
	client.add_breadcrumb(
		Breadcrumb::new("navigation", BreadcrumbLevel::Info).with_message("Opened checkout"),
	);

	client
		.dispatch(&HostEvent::Error(
			ErrorEvent::new("TypeError: x is undefined")
				.at("app.js", 10, 4)
				.with_stack("at render (app.js:10:4)"),
		))
		.await;

	let data = &transport.sent()[0].data;
	assert_eq!(data["t"], json!("jsError"));
	assert_eq!(data["dat"]["st"], json!("error"));
	assert_eq!(data["dat"]["msg"], json!("TypeError: x is undefined"));
	assert_eq!(data["dat"]["file"], json!("app.js"));
	assert_eq!(data["dat"]["line"], json!(10));
	assert_eq!(data["dat"]["col"], json!(4));
	assert_eq!(data["dat"]["stack"], json!("at render (app.js:10:4)"));
	assert_eq!(data["dat"]["bc"].as_array().map(Vec::len), Some(1));
	assert_eq!(data["dat"]["bc"][0]["category"], json!("navigation"));

	let breadcrumbs = client.breadcrumbs();
	assert_eq!(breadcrumbs.len(), 2);
	assert_eq!(breadcrumbs[1].category, "error");
	assert_eq!(breadcrumbs[1].level, BreadcrumbLevel::Error);
}

#[tokio::test]
async fn unhandled_rejection_is_reported() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::UnhandledRejection {
			reason: "timeout".to_string(),
		})
		.await;

	let sent = transport.sent();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].data["t"], json!("promiseError"));
	assert_eq!(sent[0].data["dat"]["st"], json!("unhandledrejection"));
	assert_eq!(sent[0].data["dat"]["msg"], json!("timeout"));
}

#[tokio::test]
async fn no_session_means_nothing_is_sent() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;
	client
		.dispatch(&HostEvent::UnhandledRejection {
			reason: "x".to_string(),
		})
		.await;

	assert!(transport.sent().is_empty());
	assert_eq!(client.storage().get_cookie(USER_ID_KEY), "");
}

#[tokio::test]
async fn no_report_url_means_nothing_is_sent() {
	let transport = RecordingTransport::new(true);
	let client = BrowserClient::builder()
		.init_url("/api/init")
		.page(page("https://shop.example.com/"))
		.transport(transport.clone())
		.build()
		.unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;

	assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn inert_outside_a_page() {
	let transport = RecordingTransport::new(true);
	let client = BrowserClient::builder()
		.init_url("/api/init")
		.report_url("/api/report")
		.transport(transport.clone())
		.build()
		.unwrap();
	with_session(&client);

	assert!(!client.is_right_env());
	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;

	assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn without_beacon_reports_fall_back_to_image() {
	let transport = RecordingTransport::new(false);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;

	assert_eq!(transport.sent()[0].kind, TransportKind::Image);
}

#[tokio::test]
async fn builtins_can_be_disabled() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone())
		.builtin_plugins(false)
		.build()
		.unwrap();
	with_session(&client);

	assert!(client.plugin_names().is_empty());
	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;
	assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn error_trail_includes_lifecycle_stages() {
	let transport = RecordingTransport::new(true);
	let client = builder(transport.clone()).build().unwrap();
	with_session(&client);

	client
		.dispatch(&HostEvent::Lifecycle(PageLifeType::Load))
		.await;
	client
		.dispatch(&HostEvent::Error(ErrorEvent::new("boom")))
		.await;

	let sent = transport.sent();
	assert_eq!(sent.len(), 2);
	let trail = &sent[1].data["dat"]["bc"];
	assert_eq!(trail[0]["category"], json!("lifecycle"));
	assert_eq!(trail[0]["message"], json!("load"));
	assert_eq!(trail.as_array().map(Vec::len), Some(1));
}
