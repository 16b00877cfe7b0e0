//! Rift client mock: a fake HTTP transport for tests.
//!
//! Test code declares rules (expected requests plus canned responses) on a
//! [`ClientMock`]; application code executes requests against it and gets the
//! response of the first matching rule. When nothing matches, the rule
//! [`Debugger`] explains which conditions of the closest rule failed.
//!
//! # Example
//!
//! ```
//! use rift_client_mock::{ClientMock, MockResponse, RecordingSink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let mock = ClientMock::with_sink("http://localhost", sink.clone()).unwrap();
//! mock.on_get("/login")
//!     .with_parameter("foo", "bar")
//!     .respond_with(MockResponse::text("login"))
//!     .unwrap();
//!
//! mock.debug_on();
//! assert!(mock.get("/login?foo=bbb").is_err());
//! assert!(sink.not_matching().contains(&"parameter foo is \"bar\"".to_string()));
//! ```
//!
//! # Module Structure
//!
//! - `request` - Normalized request view and URL decomposition
//! - `condition` - Match conditions and value matchers
//! - `rule` - Rules, actions and the rule builder
//! - `registry` - Ordered rule registry and first-match lookup
//! - `debugger` - Condition-by-condition explanations and output sinks
//! - `mock` - The mock session
//! - `config` - Session configuration

pub mod condition;
pub mod config;
pub mod debugger;
pub mod error;
pub mod mock;
pub mod registry;
pub mod request;
pub mod response;
pub mod rule;

pub use condition::{Condition, FieldCondition, ValueMatch, ValueMatcher};
pub use config::{MockConfig, NoMatchPolicy};
pub use debugger::{DebugSink, Debugger, RecordingSink, TracingSink};
pub use error::{ActionFault, MockError};
pub use mock::ClientMock;
pub use registry::Registry;
pub use request::{FieldMap, RequestView, RequestViewBuilder, UrlParts};
pub use response::MockResponse;
pub use rule::{Action, Rule, RuleBuilder};

pub use hyper::Method;
