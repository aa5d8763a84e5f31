//! # Monitor Testing Utils
//!
//! Test doubles for the monitoring backend the worker talks to.
//!
//! - [`MockBackend`]: in-memory [`MonitoringBackend`](monitor_worker::MonitoringBackend)
//!   with scripted failures and a switch to hold registration calls open
//! - [`MockBackendServer`]: a real HTTP backend on `127.0.0.1:0` for tests
//!   that go through reqwest and the wire format
//!
//! ```toml
//! [dev-dependencies]
//! monitor-testing-utils = { path = "../testing-utils" }
//! ```

pub mod helpers;
pub mod mocks;
pub mod server;

pub use helpers::*;
pub use mocks::*;
pub use server::*;
