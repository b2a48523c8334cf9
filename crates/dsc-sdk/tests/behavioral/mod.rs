//! Behavioral tests for the SDK.
//!
//! These tests verify that the SDK behaves correctly in various scenarios
//! without requiring a live network.

mod broadcaster;
mod contracts;
mod support;
mod transactions;
