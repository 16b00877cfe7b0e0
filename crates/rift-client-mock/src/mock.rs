//! The mock session: rules, debugger and no-match policy in one place.

use crate::config::{MockConfig, NoMatchPolicy};
use crate::debugger::{DebugSink, Debugger, TracingSink};
use crate::error::MockError;
use crate::registry::Registry;
use crate::request::{RequestView, RequestViewBuilder, UrlParts};
use crate::response::MockResponse;
use crate::rule::RuleBuilder;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Method;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fake HTTP transport for tests.
///
/// Rules are declared with `on_get`/`on_post`/... and matched first-to-last
/// against each executed request. Relative URLs, in rules and requests
/// alike, resolve against the base URL.
#[derive(Debug)]
pub struct ClientMock {
    registry: Registry,
    debugger: Debugger,
    base: UrlParts,
    no_match: NoMatchPolicy,
}

impl ClientMock {
    /// Session logging debugger output through `tracing`.
    pub fn new(base_url: &str) -> Result<Self, MockError> {
        Self::with_sink(base_url, Arc::new(TracingSink))
    }

    pub fn with_sink(base_url: &str, sink: Arc<dyn DebugSink>) -> Result<Self, MockError> {
        let config = MockConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        Self::from_config(&config, sink)
    }

    pub fn from_config(config: &MockConfig, sink: Arc<dyn DebugSink>) -> Result<Self, MockError> {
        let mock = Self {
            registry: Registry::new(),
            debugger: Debugger::new(sink),
            base: config.base()?,
            no_match: config.no_match.clone(),
        };
        if config.debug {
            mock.debugger.on();
        }
        Ok(mock)
    }

    pub fn with_no_match(mut self, policy: NoMatchPolicy) -> Self {
        self.no_match = policy;
        self
    }

    pub fn on(&self, method: Method, url: &str) -> RuleBuilder<'_> {
        RuleBuilder::new(&self.registry, Some(method), url, Some(&self.base))
    }

    pub fn on_get(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::GET, url)
    }

    pub fn on_post(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::POST, url)
    }

    pub fn on_put(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::PUT, url)
    }

    pub fn on_patch(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::PATCH, url)
    }

    pub fn on_delete(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::DELETE, url)
    }

    pub fn on_head(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::HEAD, url)
    }

    pub fn on_options(&self, url: &str) -> RuleBuilder<'_> {
        self.on(Method::OPTIONS, url)
    }

    /// Rule with no URL or method conditions; only what the builder adds.
    pub fn on_any(&self) -> RuleBuilder<'_> {
        RuleBuilder::new(&self.registry, None, "", None)
    }

    pub fn debug_on(&self) {
        self.debugger.on();
    }

    pub fn debug_off(&self) {
        self.debugger.off();
    }

    pub fn debugger(&self) -> &Debugger {
        &self.debugger
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Start a request view; relative URLs resolve against the base URL.
    pub fn request(&self, method: Method, url: &str) -> RequestViewBuilder {
        let relative = UrlParts::parse(url).is_ok_and(|parts| !parts.is_absolute());
        if !relative {
            return RequestView::builder(method, url);
        }
        let mut absolute = format!(
            "{}://{}",
            self.base.scheme.as_deref().unwrap_or("http"),
            self.base.host.as_deref().unwrap_or("localhost")
        );
        if let Some(port) = self.base.port {
            absolute.push_str(&format!(":{port}"));
        }
        if !url.starts_with('/') {
            absolute.push('/');
        }
        absolute.push_str(url);
        RequestView::builder(method, absolute)
    }

    pub fn get(&self, url: &str) -> Result<MockResponse, MockError> {
        self.execute(&self.request(Method::GET, url).build()?)
    }

    pub fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<MockResponse, MockError> {
        self.execute(&self.request(Method::POST, url).body(body).build()?)
    }

    /// Run `request` through the rules.
    ///
    /// With the debugger enabled the request is explained before the matched
    /// rule runs. Action faults come back as `MockError::Action` unchanged.
    pub fn execute(&self, request: &RequestView) -> Result<MockResponse, MockError> {
        let matched = if self.debugger.is_enabled() {
            self.debugger.debug(&self.registry.snapshot(), request)
        } else {
            self.registry.find_match(request)
        };

        match matched {
            Some(rule) => {
                debug!("Executing rule for {}", request);
                Ok(rule.invoke(request)?)
            }
            None => {
                warn!("No rule matches request {}", request);
                match &self.no_match {
                    NoMatchPolicy::Fail => Err(MockError::NoMatchingRule {
                        method: request.method().to_string(),
                        uri: request.uri(),
                    }),
                    NoMatchPolicy::Respond(response) => Ok(response.clone()),
                }
            }
        }
    }

    /// Execute a `hyper` request and convert the result into a `hyper` response.
    pub fn execute_hyper<B: AsRef<[u8]>>(
        &self,
        request: &hyper::Request<B>,
    ) -> Result<hyper::Response<Full<Bytes>>, MockError> {
        let view = RequestView::from_hyper(request)?;
        self.execute(&view).map(MockResponse::into_hyper)
    }
}
