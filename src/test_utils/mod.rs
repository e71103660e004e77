//! Test utilities for use-case and HTTP-level testing.
//!
//! This module provides:
//! - An in-memory `UserRepo` plus failing stubs for error paths
//! - Test data factories for creating valid users
//! - `TestAppStateBuilder` for constructing an `AppState` without infrastructure

mod app_state_builder;
mod auth_mocks;
mod factories;

pub use app_state_builder::*;
pub use auth_mocks::*;
pub use factories::*;
