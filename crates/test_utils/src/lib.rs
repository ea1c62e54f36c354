//! Shared test support for Pagewright crates.
//!
//! - [`FakeBrowser`]: an in-memory [`pagewright_core::Browser`] with a small
//!   node tree, scripted ready states and history
//! - [`DocumentTree`]: a temporary `conf/` directory of settings and page
//!   documents
//! - [`samples`]: documents used across integration tests

pub mod fake_browser;
pub mod fixtures;
pub mod samples;

pub use fake_browser::{FakeBrowser, FakeNode};
pub use fixtures::DocumentTree;
