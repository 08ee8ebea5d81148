//! Helix E2E Test Support
//!
//! Shared harness and fixtures for the journey and extreme test suites:
//! - `harness`: temporary snapshot stores and invariant checks
//! - `mocks`: snapshot and content builders


pub use harness::{assert_tube_invariants, TestStoreManager};
pub use mocks::TestDataFactory;
