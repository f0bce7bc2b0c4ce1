//! Test kit for fbg clients.
//!
//! - [`MockTransport`]: an in-process [`GraphTransport`](fbg_core::GraphTransport)
//!   that answers from canned documents and counts requests
//! - [`MockGraphServer`]: a wiremock server for exercising the HTTP transport
//! - [`fixtures`]: credentials and representative API documents
//! - assertion helpers for engine results
//! - tracing configuration for test output
//!
//! ```rust,ignore
//! use fbg_testkit::{MockTransport, fixtures};
//!
//! #[tokio::test]
//! async fn loads_friends() {
//!     fbg_testkit::init_test_tracing();
//!     let transport = MockTransport::new()
//!         .with_json("/123/friends", fixtures::json::page(vec![], None, None));
//!     let session = transport.session();
//!     // ...
//!     assert_eq!(transport.call_count(), 1);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod assertions;
pub mod fixtures;
mod mock_server;
mod mock_transport;
mod tracing_config;

pub use assertions::*;
pub use mock_server::*;
pub use mock_transport::*;
pub use tracing_config::*;
