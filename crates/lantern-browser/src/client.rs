// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The browser reporting client.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use lantern_browser_core::{
	AppDescriptor, Breadcrumb, EnrichedPayload, RawEvent, ReportType, RequestId,
	USER_ID_TTL_DAYS,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, ClockSync, SystemClock};
use crate::error::{BrowserSdkError, Result};
use crate::identity::IdentityResolver;
use crate::page::Page;
use crate::plugin::{HostEvent, Plugin, SharedPlugin};
use crate::plugins::{JsErrorPlugin, LifeCyclePlugin, PromiseErrorPlugin};
use crate::storage::{CookieStore, MemoryCookieStore, MemoryStorage, Storage, StorageArea};
use crate::tick::TickQueue;
use crate::transform::PayloadTransformer;
use crate::transport::{select_transport, HttpTransport, ReportResponse, Transport, TransportKind};

/// SDK version for identification.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for identification.
pub const SDK_NAME: &str = "lantern-browser";

/// Maximum number of breadcrumbs to keep.
const MAX_BREADCRUMBS: usize = 100;

/// Tunables for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for HTTP requests made by the default transport.
	pub request_timeout: Duration,
	/// Maximum breadcrumbs to keep.
	pub max_breadcrumbs: usize,
	/// Lifetime of a newly generated user id cookie.
	pub user_id_ttl_days: u32,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(30),
			max_breadcrumbs: MAX_BREADCRUMBS,
			user_id_ttl_days: USER_ID_TTL_DAYS,
		}
	}
}

/// Options supplied by the host page, fixed for the client's lifetime.
///
/// Deserializes from the camelCase JSON a page would embed:
///
/// ```
/// use lantern_browser::BrowserOptions;
///
/// let options = BrowserOptions::from_json(
///     r#"{"initUrl": "/api/init", "reportUrl": "/api/report", "app": {"name": "demo"}}"#,
/// ).unwrap();
/// assert_eq!(options.app.name, "demo");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserOptions {
	/// Registration endpoint.
	pub init_url: String,
	/// Where built-in plugins send their reports.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub report_url: Option<String>,
	#[serde(default)]
	pub app: AppDescriptor,
}

impl BrowserOptions {
	pub fn new(init_url: impl Into<String>, app: AppDescriptor) -> Self {
		Self {
			init_url: init_url.into(),
			report_url: None,
			app,
		}
	}

	pub fn with_report_url(mut self, url: impl Into<String>) -> Self {
		self.report_url = Some(url.into());
		self
	}

	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Builder for constructing a [`BrowserClient`].
pub struct BrowserClientBuilder {
	options: BrowserOptions,
	config: ClientConfig,
	page: Option<Arc<dyn Page>>,
	local: Option<Arc<dyn StorageArea>>,
	session: Option<Arc<dyn StorageArea>>,
	cookies: Option<Arc<dyn CookieStore>>,
	transport: Option<Arc<dyn Transport>>,
	clock: Option<Arc<dyn Clock>>,
	plugins: Vec<SharedPlugin>,
	builtin_plugins: bool,
}

impl BrowserClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			options: BrowserOptions::default(),
			config: ClientConfig::default(),
			page: None,
			local: None,
			session: None,
			cookies: None,
			transport: None,
			clock: None,
			plugins: Vec::new(),
			builtin_plugins: true,
		}
	}

	/// Replaces all host options at once.
	pub fn options(mut self, options: BrowserOptions) -> Self {
		self.options = options;
		self
	}

	/// Sets the registration endpoint. Relative URLs resolve against the page.
	pub fn init_url(mut self, url: impl Into<String>) -> Self {
		self.options.init_url = url.into();
		self
	}

	/// Sets the endpoint built-in plugins report to.
	pub fn report_url(mut self, url: impl Into<String>) -> Self {
		self.options.report_url = Some(url.into());
		self
	}

	pub fn app(mut self, app: AppDescriptor) -> Self {
		self.options.app = app;
		self
	}

	/// Attaches the hosting page. Without one the client is inert.
	pub fn page(mut self, page: impl Page + 'static) -> Self {
		self.page = Some(Arc::new(page));
		self
	}

	pub fn shared_page(mut self, page: Arc<dyn Page>) -> Self {
		self.page = Some(page);
		self
	}

	pub fn local_storage(mut self, area: Arc<dyn StorageArea>) -> Self {
		self.local = Some(area);
		self
	}

	pub fn session_storage(mut self, area: Arc<dyn StorageArea>) -> Self {
		self.session = Some(area);
		self
	}

	pub fn cookie_store(mut self, cookies: Arc<dyn CookieStore>) -> Self {
		self.cookies = Some(cookies);
		self
	}

	/// Overrides the network primitives. Defaults to [`HttpTransport`].
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Sets the HTTP request timeout for the default transport.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the maximum number of breadcrumbs to keep.
	pub fn max_breadcrumbs(mut self, max: usize) -> Self {
		self.config.max_breadcrumbs = max;
		self
	}

	pub fn user_id_ttl_days(mut self, days: u32) -> Self {
		self.config.user_id_ttl_days = days;
		self
	}

	/// Adds a plugin after the built-ins.
	pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
		self.plugins.push(Arc::new(plugin));
		self
	}

	pub fn plugins(mut self, plugins: impl IntoIterator<Item = SharedPlugin>) -> Self {
		self.plugins.extend(plugins);
		self
	}

	/// Enables or disables the error, rejection and lifecycle plugins.
	///
	/// Enabled by default.
	pub fn builtin_plugins(mut self, enabled: bool) -> Self {
		self.builtin_plugins = enabled;
		self
	}

	/// Builds the client and binds its plugins.
	pub fn build(self) -> Result<BrowserClient> {
		if self.options.init_url.trim().is_empty() {
			return Err(BrowserSdkError::MissingInitUrl);
		}
		if let Some(page) = self.page.as_deref() {
			resolve_url(Some(page), &self.options.init_url)?;
		}

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(self.config.request_timeout)?),
		};
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
		let storage = Storage::new(
			self.local.unwrap_or_else(|| Arc::new(MemoryStorage::new())),
			self.session.unwrap_or_else(|| Arc::new(MemoryStorage::new())),
			self.cookies
				.unwrap_or_else(|| Arc::new(MemoryCookieStore::with_clock(clock.clone()))),
			clock.clone(),
		);
		let identity =
			IdentityResolver::new(storage.clone()).with_ttl_days(self.config.user_id_ttl_days);

		let inner = Arc::new(BrowserClientInner {
			transformer: PayloadTransformer::new(identity, self.page.clone()),
			clock_sync: ClockSync::new(clock),
			options: self.options,
			config: self.config,
			storage,
			transport,
			page: self.page,
			ticks: TickQueue::new(),
			breadcrumbs: Mutex::new(VecDeque::new()),
			plugins: RwLock::new(Vec::new()),
		});
		let client = BrowserClient { inner };

		let mut plugins: Vec<SharedPlugin> = Vec::new();
		if self.builtin_plugins {
			plugins.push(Arc::new(JsErrorPlugin));
			plugins.push(Arc::new(PromiseErrorPlugin));
			plugins.push(Arc::new(LifeCyclePlugin));
		}
		plugins.extend(self.plugins);
		client.use_plugins(plugins);

		info!(
			init_url = %client.inner.options.init_url,
			app = %client.inner.options.app.name,
			browser = client.is_right_env(),
			"Browser client initialized"
		);

		Ok(client)
	}
}

impl Default for BrowserClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal client state.
struct BrowserClientInner {
	options: BrowserOptions,
	config: ClientConfig,
	storage: Storage,
	transformer: PayloadTransformer,
	clock_sync: ClockSync,
	transport: Arc<dyn Transport>,
	page: Option<Arc<dyn Page>>,
	ticks: TickQueue,
	breadcrumbs: Mutex<VecDeque<Breadcrumb>>,
	plugins: RwLock<Vec<SharedPlugin>>,
}

/// Client that enriches page events and reports them to a collector.
///
/// # Example
///
/// ```ignore
/// use lantern_browser::{AppDescriptor, BrowserClient, HostEvent, StaticPage};
///
/// let client = BrowserClient::builder()
///     .init_url("/api/init")
///     .report_url("/api/report")
///     .app(AppDescriptor::new("storefront"))
///     .page(StaticPage::new("https://shop.example.com/"))
///     .build()?;
///
/// // Registration handshake, also synchronizes the clock.
/// let server_id = client.init_app().await?;
///
/// // Feed page events to the plugins.
/// client.dispatch(&HostEvent::Lifecycle(PageLifeType::Load)).await;
/// ```
#[derive(Clone)]
pub struct BrowserClient {
	inner: Arc<BrowserClientInner>,
}

impl BrowserClient {
	/// Creates a new builder for constructing a BrowserClient.
	pub fn builder() -> BrowserClientBuilder {
		BrowserClientBuilder::new()
	}

	/// Registers the app with the collector and synchronizes the clock.
	///
	/// Sends `{id, ...app}` to the init URL over GET, feeds the response
	/// `date` header to the clock, and returns `data.id` from the body (or
	/// `""`). Failures are returned as-is; there is no retry. Calling again
	/// only re-synchronizes the clock.
	pub async fn init_app(&self) -> Result<String> {
		let url = self.resolve_url(&self.inner.options.init_url)?;
		let request_id = RequestId::new();
		let query = Value::Object(self.inner.options.app.registration_query(request_id));

		debug!(url = %url, request_id = %request_id, "Registering app");
		let response = self.inner.transport.get(&url, &query).await?;

		match response.date() {
			Some(date) => {
				if let Err(e) = self.inner.clock_sync.observe(date) {
					warn!(error = %e, "Ignoring unparsable server date");
				}
			}
			None => debug!("Registration response has no date header"),
		}

		let id = response
			.data
			.pointer("/data/id")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string();

		info!(
			server_id = %id,
			clock_offset = self.inner.clock_sync.offset(),
			"App registered"
		);
		Ok(id)
	}

	/// Sends `data` to `url` over the transport chosen for `hint`.
	///
	/// Beacon, image and POST sends are fire and forget and yield `Ok(None)`.
	/// Only the GET path returns the response (or its error).
	pub async fn report(
		&self,
		url: &str,
		data: impl Into<Value>,
		hint: ReportType,
	) -> Result<Option<ReportResponse>> {
		let data = data.into();
		let kind = select_transport(hint, self.inner.transport.supports_beacon());

		let url = match self.resolve_url(url) {
			Ok(url) => url,
			Err(e) if kind == TransportKind::Get => return Err(e),
			Err(e) => {
				warn!(%kind, error = %e, "Dropping report to unresolvable URL");
				return Ok(None);
			}
		};

		debug!(%hint, %kind, url = %url, "Sending report");
		match kind {
			TransportKind::Beacon => self.inner.transport.beacon(&url, &data),
			TransportKind::Image => self.inner.transport.image(&url, &data),
			TransportKind::Post => self.inner.transport.post(&url, &data),
			TransportKind::Get => return self.inner.transport.get(&url, &data).await.map(Some),
		}
		Ok(None)
	}

	/// Enriches a raw event. `None` means do not send.
	pub fn transform(&self, raw: RawEvent) -> Option<EnrichedPayload> {
		self.inner.transformer.transform(raw)
	}

	/// True when the client runs inside a page.
	pub fn is_right_env(&self) -> bool {
		self.inner.page.is_some()
	}

	/// Current time in epoch milliseconds, corrected for server skew.
	pub fn get_time(&self) -> i64 {
		self.inner.clock_sync.corrected_now()
	}

	/// Defers `callback(ctx, args)` until the current synchronous work is done.
	///
	/// Inside a tokio runtime the queue drains itself once the caller yields.
	/// Hosts without a runtime call [`flush_ticks`].
	///
	/// [`flush_ticks`]: BrowserClient::flush_ticks
	pub fn next_tick<C, A, F>(&self, callback: F, ctx: C, args: A)
	where
		C: Send + 'static,
		A: Send + 'static,
		F: FnOnce(C, A) + Send + 'static,
	{
		self.inner.ticks.next_tick(callback, ctx, args);
	}

	/// Runs deferred callbacks in FIFO order. Returns how many ran.
	pub fn flush_ticks(&self) -> usize {
		self.inner.ticks.drain()
	}

	/// Binds plugins in order, calling each one's `setup` once.
	pub fn use_plugins(&self, plugins: impl IntoIterator<Item = SharedPlugin>) {
		for plugin in plugins {
			self.inner
				.plugins
				.write()
				.unwrap_or_else(PoisonError::into_inner)
				.push(plugin.clone());
			plugin.setup(self, &self.inner.options);
			debug!(plugin = plugin.name(), "Plugin attached");
		}
	}

	/// Names of the attached plugins in registration order.
	pub fn plugin_names(&self) -> Vec<&'static str> {
		self.attached_plugins().iter().map(|p| p.name()).collect()
	}

	/// Delivers a host event to every plugin in registration order.
	pub async fn dispatch(&self, event: &HostEvent) {
		for plugin in self.attached_plugins() {
			plugin.on_event(self, event).await;
		}
	}

	fn attached_plugins(&self) -> Vec<SharedPlugin> {
		self.inner
			.plugins
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Adds a breadcrumb, dropping the oldest beyond the configured limit.
	pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		let mut breadcrumbs = self
			.inner
			.breadcrumbs
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		breadcrumbs.push_back(breadcrumb);
		while breadcrumbs.len() > self.inner.config.max_breadcrumbs {
			breadcrumbs.pop_front();
		}
	}

	/// Snapshot of the breadcrumb trail, oldest first.
	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		self.inner
			.breadcrumbs
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.cloned()
			.collect()
	}

	pub fn clear_breadcrumbs(&self) {
		self.inner
			.breadcrumbs
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}

	pub fn storage(&self) -> &Storage {
		&self.inner.storage
	}

	pub fn options(&self) -> &BrowserOptions {
		&self.inner.options
	}

	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// The session id cached by the transformer, if one has been seen.
	pub fn session_id(&self) -> Option<String> {
		self.inner.transformer.session_id().map(str::to_string)
	}

	pub fn clock_offset(&self) -> Option<i64> {
		self.inner.clock_sync.offset()
	}

	fn resolve_url(&self, url: &str) -> Result<String> {
		resolve_url(self.inner.page.as_deref(), url)
	}
}

/// Resolves `url` against the page location when it is relative.
fn resolve_url(page: Option<&dyn Page>, url: &str) -> Result<String> {
	if let Ok(absolute) = Url::parse(url) {
		return Ok(absolute.into());
	}
	let page = page.ok_or_else(|| BrowserSdkError::InvalidUrl(url.to_string()))?;
	Url::parse(&page.href())
		.and_then(|base| base.join(url))
		.map(Into::into)
		.map_err(|_| BrowserSdkError::InvalidUrl(url.to_string()))
}
